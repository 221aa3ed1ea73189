//! Static genre catalogue: transition graphs, classic patterns, popular progressions

use serde::Serialize;

use crate::error::{ChordmapError, Result};
use crate::theory::ChordQuality;

// ============================================================================
// Graph types
// ============================================================================

/// Harmonic role of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicFunction {
    Tonic,
    Subdominant,
    Dominant,
    Minor,
    Seventh,
    #[default]
    Default,
}

impl HarmonicFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tonic => "tonic",
            Self::Subdominant => "subdominant",
            Self::Dominant => "dominant",
            Self::Minor => "minor",
            Self::Seventh => "seventh",
            Self::Default => "default",
        }
    }

    /// Short guidance on where a chord with this role tends to go next
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Tonic => "The tonic is home. Moving to the dominant (V) or subdominant (IV) sounds natural.",
            Self::Dominant => "The dominant pulls strongly back to the tonic (I). That is the most satisfying resolution.",
            Self::Subdominant => "The subdominant can move to the dominant to build tension, or straight back to the tonic.",
            Self::Minor => "Minor chords add emotional color. They usually move within the same function or on to the dominant.",
            Self::Seventh => "Seventh chords add color and usually act as a bridge toward a resolution.",
            Self::Default => "Pick whichever chord fits the musical context.",
        }
    }
}

/// One node of a genre transition graph
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphNode {
    pub numeral: &'static str,
    pub targets: &'static [&'static str],
    /// Parallel to `targets` when present
    pub weights: Option<&'static [f64]>,
    pub function: HarmonicFunction,
}

impl GraphNode {
    /// Weights used for weighted choice; uniform `100 / n` when none are declared
    pub fn effective_weights(&self) -> Vec<f64> {
        match self.weights {
            Some(weights) => weights.to_vec(),
            None => {
                let uniform = 100.0 / self.targets.len().max(1) as f64;
                vec![uniform; self.targets.len()]
            }
        }
    }
}

/// Directed graph over numeral tokens, nodes in declaration order
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct TransitionGraph {
    nodes: &'static [GraphNode],
}

impl TransitionGraph {
    pub const fn new(nodes: &'static [GraphNode]) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &'static [GraphNode] {
        self.nodes
    }

    /// First declared node; walks start (and restart) here
    pub fn start(&self) -> Option<&'static GraphNode> {
        self.nodes.first()
    }

    pub fn node(&self, numeral: &str) -> Option<&'static GraphNode> {
        self.nodes.iter().find(|n| n.numeral == numeral)
    }

    pub fn numerals(&self) -> impl Iterator<Item = &'static str> {
        self.nodes.iter().map(|n| n.numeral)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Everything the catalogue knows about one genre
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub characteristics: &'static [&'static str],
    pub graph: TransitionGraph,
    pub classic_progressions: &'static [&'static [&'static str]],
    /// What a progression from this genre suits
    pub usage: &'static str,
}

/// A well-known progression with example songs
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PopularProgression {
    pub name: &'static str,
    pub numerals: &'static [&'static str],
    pub description: &'static str,
    pub songs: &'static [&'static str],
    pub genre: &'static str,
}

// ============================================================================
// Lookups
// ============================================================================

/// All genres in catalogue order
pub fn genres() -> &'static [GenreRecord] {
    &GENRES
}

/// Look up a genre by id ("pop", "jazz", ...)
pub fn genre(id: &str) -> Result<&'static GenreRecord> {
    GENRES
        .iter()
        .find(|g| g.id == id)
        .ok_or_else(|| ChordmapError::UnknownGenre(id.to_string()))
}

pub fn popular_progressions() -> &'static [PopularProgression] {
    &POPULAR_PROGRESSIONS
}

/// Chord formula table: quality suffix to semitone offsets
pub fn chord_formulas() -> impl Iterator<Item = (&'static str, &'static [u8])> {
    ChordQuality::ALL.into_iter().map(|q| (q.suffix(), q.intervals()))
}

pub fn chord_formula(suffix: &str) -> Option<&'static [u8]> {
    ChordQuality::from_suffix(suffix).map(|q| q.intervals())
}

// ============================================================================
// Data
// ============================================================================

const fn node(
    numeral: &'static str,
    targets: &'static [&'static str],
    weights: &'static [f64],
    function: HarmonicFunction,
) -> GraphNode {
    GraphNode { numeral, targets, weights: Some(weights), function }
}

use HarmonicFunction::{Dominant, Minor, Seventh, Subdominant, Tonic};

static GENRES: [GenreRecord; 8] = [
    GenreRecord {
        id: "pop",
        name: "Pop",
        description: "Pop graphs are a simple repeating cycle. I-V-vi-IV is the 'magic formula' behind hundreds of hit songs.",
        characteristics: &[
            "Repeating four-chord cycle (I-V-vi-IV)",
            "Easy to remember and sing along to",
            "Emotional yet upbeat",
            "Suits simple melodies",
        ],
        graph: TransitionGraph { nodes: &[
            node("I", &["V", "vi", "IV", "ii"], &[35.0, 30.0, 25.0, 10.0], Tonic),
            node("V", &["vi", "I", "IV"], &[40.0, 35.0, 25.0], Dominant),
            node("vi", &["IV", "V", "I"], &[45.0, 30.0, 25.0], Minor),
            node("IV", &["I", "V", "vi", "ii"], &[35.0, 30.0, 25.0, 10.0], Subdominant),
            node("ii", &["V", "IV"], &[60.0, 40.0], Minor),
            node("iii", &["vi", "IV"], &[50.0, 50.0], Minor),
        ] },
        classic_progressions: &[
            &["I", "V", "vi", "IV"],
            &["I", "IV", "V", "I"],
            &["vi", "IV", "I", "V"],
            &["I", "vi", "IV", "V"],
        ],
        usage: "Pop verses and choruses, jingles, background music",
    },
    GenreRecord {
        id: "rock",
        name: "Rock",
        description: "Rock uses strong progressions built on power chords and decisive root movement.",
        characteristics: &[
            "Heavy use of I, IV and V",
            "Frequent flat seven (bVII)",
            "Power chords (root + fifth)",
            "Chromatic movement for transitions",
        ],
        graph: TransitionGraph { nodes: &[
            node("I", &["IV", "V", "bVII", "vi"], &[30.0, 30.0, 25.0, 15.0], Tonic),
            node("IV", &["I", "V", "bVII"], &[40.0, 35.0, 25.0], Subdominant),
            node("V", &["I", "IV", "bVII"], &[50.0, 30.0, 20.0], Dominant),
            node("bVII", &["IV", "I", "V"], &[40.0, 35.0, 25.0], Seventh),
            node("vi", &["IV", "V", "I"], &[40.0, 35.0, 25.0], Minor),
            node("ii", &["V", "IV"], &[55.0, 45.0], Minor),
        ] },
        classic_progressions: &[
            &["I", "IV", "V", "IV"],
            &["I", "bVII", "IV", "I"],
            &["I", "V", "bVII", "IV"],
            &["vi", "IV", "I", "V"],
        ],
        usage: "Guitar intros, energetic bridges, crowd sing-along anthems",
    },
    GenreRecord {
        id: "jazz",
        name: "Jazz",
        description: "Jazz uses complex progressions with seventh chords, extensions and tritone substitutions. The graph winds through many alternative paths.",
        characteristics: &[
            "Core ii-V-I pattern (Dm7-G7-Cmaj7)",
            "Tritone substitution (G7 -> Db7 -> C)",
            "Extended chords (9th, 11th, 13th)",
            "Secondary dominants and modal interchange",
        ],
        graph: TransitionGraph { nodes: &[
            node("Imaj7", &["ii7", "IV7", "vi7", "#IVdim7"], &[35.0, 25.0, 25.0, 15.0], Tonic),
            node("ii7", &["V7", "bII7"], &[70.0, 30.0], Minor),
            node("V7", &["Imaj7", "vi7", "bII7"], &[50.0, 30.0, 20.0], Dominant),
            node("vi7", &["ii7", "IV7", "V7"], &[45.0, 30.0, 25.0], Minor),
            node("IV7", &["iii7", "V7", "bVII7"], &[35.0, 40.0, 25.0], Subdominant),
            node("iii7", &["vi7", "bIII7"], &[60.0, 40.0], Minor),
            node("bII7", &["Imaj7"], &[100.0], Seventh),
            node("#IVdim7", &["V7", "Imaj7"], &[60.0, 40.0], Seventh),
            node("bVII7", &["Imaj7", "IV7"], &[55.0, 45.0], Seventh),
            node("bIII7", &["bVII7", "ii7"], &[50.0, 50.0], Seventh),
        ] },
        classic_progressions: &[
            &["ii7", "V7", "Imaj7"],
            &["Imaj7", "vi7", "ii7", "V7"],
            &["iii7", "vi7", "ii7", "V7"],
            &["Imaj7", "#IVdim7", "V7", "Imaj7"],
        ],
        usage: "Improvisation, cocktail sets, sophisticated background music",
    },
    GenreRecord {
        id: "blues",
        name: "Blues",
        description: "Blues follows the iconic 12-bar structure with dominant seventh chords. A simple but very expressive graph.",
        characteristics: &[
            "Classic 12-bar structure",
            "Dominant sevenths throughout",
            "Turnaround at the end of the form",
            "Blue notes and the pentatonic scale",
        ],
        graph: TransitionGraph { nodes: &[
            node("I7", &["IV7", "V7"], &[60.0, 40.0], Tonic),
            node("IV7", &["I7", "V7", "#IVdim7"], &[50.0, 35.0, 15.0], Subdominant),
            node("V7", &["IV7", "I7"], &[40.0, 60.0], Dominant),
            node("#IVdim7", &["V7", "I7"], &[70.0, 30.0], Seventh),
            node("ii7", &["V7"], &[100.0], Minor),
            node("vi7", &["ii7", "V7"], &[50.0, 50.0], Minor),
        ] },
        classic_progressions: &[
            &["I7", "I7", "I7", "I7", "IV7", "IV7", "I7", "I7", "V7", "IV7", "I7", "V7"],
            &["I7", "IV7", "I7", "V7"],
            &["I7", "#IVdim7", "V7", "I7"],
        ],
        usage: "Guitar solos, jam sessions, emotional ballads",
    },
    GenreRecord {
        id: "country",
        name: "Country",
        description: "Country favors honest, straightforward progressions that leave room for storytelling.",
        characteristics: &[
            "Plain I-IV-V progressions",
            "Frequent sus chords",
            "Pedal-steel friendly progressions",
            "Walking bass lines",
        ],
        graph: TransitionGraph { nodes: &[
            node("I", &["IV", "V", "vi", "ii"], &[35.0, 30.0, 20.0, 15.0], Tonic),
            node("IV", &["I", "V", "ii"], &[45.0, 40.0, 15.0], Subdominant),
            node("V", &["I", "IV", "vi"], &[55.0, 30.0, 15.0], Dominant),
            node("vi", &["IV", "ii", "V"], &[40.0, 35.0, 25.0], Minor),
            node("ii", &["V", "IV"], &[65.0, 35.0], Minor),
            node("iii", &["vi", "IV"], &[55.0, 45.0], Minor),
        ] },
        classic_progressions: &[
            &["I", "IV", "V", "I"],
            &["I", "V", "vi", "IV"],
            &["I", "IV", "I", "V"],
            &["vi", "IV", "I", "V"],
        ],
        usage: "Storytelling verses, simple sing-alongs, acoustic sets",
    },
    GenreRecord {
        id: "rnb",
        name: "R&B/Soul",
        description: "R&B moves smoothly through extended chords and chromatic motion to build a sensual groove.",
        characteristics: &[
            "Extended chords (7th, 9th, 11th)",
            "Chromatic bass movement",
            "Gospel-influenced progressions",
            "Complex neo-soul harmony",
        ],
        graph: TransitionGraph { nodes: &[
            node("Imaj7", &["IV7", "ii7", "vi7", "V7"], &[30.0, 30.0, 25.0, 15.0], Tonic),
            node("ii7", &["V7", "Imaj7", "bVII7"], &[45.0, 35.0, 20.0], Minor),
            node("IV7", &["iii7", "V7", "Imaj7"], &[35.0, 35.0, 30.0], Subdominant),
            node("V7", &["Imaj7", "vi7", "IV7"], &[45.0, 35.0, 20.0], Dominant),
            node("vi7", &["ii7", "IV7", "V7"], &[40.0, 35.0, 25.0], Minor),
            node("iii7", &["vi7", "ii7"], &[55.0, 45.0], Minor),
            node("bVII7", &["IV7", "Imaj7"], &[55.0, 45.0], Seventh),
        ] },
        classic_progressions: &[
            &["Imaj7", "vi7", "ii7", "V7"],
            &["ii7", "V7", "Imaj7", "IV7"],
            &["Imaj7", "iii7", "vi7", "IV7"],
            &["vi7", "ii7", "V7", "Imaj7"],
        ],
        usage: "Slow jams, romantic ballads, neo-soul grooves",
    },
    GenreRecord {
        id: "edm",
        name: "EDM",
        description: "EDM progressions build energy toward powerful drops and are often reshaped for maximum impact.",
        characteristics: &[
            "Build-up and drop structure",
            "Minor keys for emotional impact",
            "Simple but powerful progressions",
            "Supersaw chords and plucks",
        ],
        graph: TransitionGraph { nodes: &[
            node("i", &["VI", "III", "VII", "iv"], &[30.0, 30.0, 25.0, 15.0], Tonic),
            node("VI", &["VII", "III", "i"], &[40.0, 35.0, 25.0], Subdominant),
            node("VII", &["i", "III", "VI"], &[45.0, 30.0, 25.0], Seventh),
            node("III", &["VI", "VII", "iv"], &[40.0, 35.0, 25.0], Tonic),
            node("iv", &["i", "VI", "VII"], &[40.0, 35.0, 25.0], Minor),
            node("v", &["i", "VI"], &[60.0, 40.0], Minor),
        ] },
        classic_progressions: &[
            &["i", "VI", "III", "VII"],
            &["i", "VII", "VI", "VII"],
            &["i", "iv", "VI", "VII"],
            &["VI", "VII", "i", "III"],
        ],
        usage: "Drops, build-ups, festival anthems",
    },
    GenreRecord {
        id: "classical",
        name: "Classical",
        description: "Classical harmony follows traditional rules with strict voice leading and proper cadences.",
        characteristics: &[
            "Authentic cadence (V-I)",
            "Plagal cadence (IV-I)",
            "Deceptive cadence (V-vi)",
            "Strict voice leading",
        ],
        graph: TransitionGraph { nodes: &[
            node("I", &["IV", "V", "vi", "ii"], &[30.0, 35.0, 20.0, 15.0], Tonic),
            node("ii", &["V", "viio"], &[70.0, 30.0], Minor),
            node("iii", &["vi", "IV"], &[55.0, 45.0], Minor),
            node("IV", &["V", "I", "ii"], &[45.0, 35.0, 20.0], Subdominant),
            node("V", &["I", "vi"], &[75.0, 25.0], Dominant),
            node("vi", &["ii", "IV", "V"], &[40.0, 35.0, 25.0], Minor),
            node("viio", &["I", "iii"], &[80.0, 20.0], Seventh),
        ] },
        classic_progressions: &[
            &["I", "IV", "V", "I"],
            &["I", "vi", "IV", "V"],
            &["I", "ii", "V", "I"],
            &["I", "IV", "viio", "I"],
        ],
        usage: "Composition exercises, orchestral arrangements, film scores",
    },
];

static POPULAR_PROGRESSIONS: [PopularProgression; 12] = [
    PopularProgression {
        name: "The Pop Canon",
        numerals: &["I", "V", "vi", "IV"],
        description: "Used in hundreds of pop songs",
        songs: &["Let It Be - Beatles", "No Woman No Cry - Bob Marley", "With or Without You - U2"],
        genre: "Pop",
    },
    PopularProgression {
        name: "50s Progression",
        numerals: &["I", "vi", "IV", "V"],
        description: "Doo-wop classic from the fifties",
        songs: &["Stand By Me - Ben E. King", "Every Breath You Take - Police"],
        genre: "Pop/Rock",
    },
    PopularProgression {
        name: "Sad Progression",
        numerals: &["vi", "IV", "I", "V"],
        description: "Minor rotation of the pop canon",
        songs: &["Numb - Linkin Park", "Zombie - Cranberries"],
        genre: "Rock/Pop",
    },
    PopularProgression {
        name: "12-Bar Blues",
        numerals: &["I7", "I7", "I7", "I7", "IV7", "IV7", "I7", "I7", "V7", "IV7", "I7", "V7"],
        description: "The classic blues form",
        songs: &["Johnny B. Goode - Chuck Berry", "Sweet Home Chicago - Robert Johnson"],
        genre: "Blues",
    },
    PopularProgression {
        name: "Jazz ii-V-I",
        numerals: &["ii7", "V7", "Imaj7"],
        description: "Foundation of jazz harmony",
        songs: &["Autumn Leaves", "All The Things You Are"],
        genre: "Jazz",
    },
    PopularProgression {
        name: "Rhythm Changes",
        numerals: &["Imaj7", "vi7", "ii7", "V7"],
        description: "Based on 'I Got Rhythm'",
        songs: &["I Got Rhythm - Gershwin", "Oleo - Sonny Rollins"],
        genre: "Jazz",
    },
    PopularProgression {
        name: "Andalusian Cadence",
        numerals: &["i", "VII", "VI", "V"],
        description: "Flamenco/Spanish progression",
        songs: &["Hit The Road Jack - Ray Charles", "Smooth - Santana"],
        genre: "Latin/Pop",
    },
    PopularProgression {
        name: "Pachelbel's Canon",
        numerals: &["I", "V", "vi", "iii", "IV", "I", "IV", "V"],
        description: "Timeless baroque progression",
        songs: &["Canon in D - Pachelbel", "Basket Case - Green Day"],
        genre: "Classical/Rock",
    },
    PopularProgression {
        name: "EDM Anthem",
        numerals: &["i", "VI", "III", "VII"],
        description: "Festival anthem progression",
        songs: &["Wake Me Up - Avicii", "Titanium - David Guetta"],
        genre: "EDM",
    },
    PopularProgression {
        name: "Neo-Soul",
        numerals: &["Imaj7", "iii7", "vi7", "IV7"],
        description: "Smooth neo-soul progression",
        songs: &["Untitled (How Does It Feel) - D'Angelo"],
        genre: "R&B/Soul",
    },
    PopularProgression {
        name: "Rock Anthem",
        numerals: &["I", "bVII", "IV", "I"],
        description: "Power rock progression",
        songs: &["Sweet Child O' Mine - Guns N' Roses", "Livin' On A Prayer - Bon Jovi"],
        genre: "Rock",
    },
    PopularProgression {
        name: "Country Classic",
        numerals: &["I", "IV", "V", "I"],
        description: "Simple country progression",
        songs: &["Wagon Wheel - Old Crow Medicine Show", "Ring of Fire - Johnny Cash"],
        genre: "Country",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Key;
    use crate::translator::translate;

    #[test]
    fn test_genre_lookup() {
        assert_eq!(genre("jazz").unwrap().name, "Jazz");
        assert!(matches!(genre("polka"), Err(ChordmapError::UnknownGenre(_))));
        let ids: Vec<&str> = genres().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["pop", "rock", "jazz", "blues", "country", "rnb", "edm", "classical"]);
    }

    #[test]
    fn test_graph_invariants() {
        for g in genres() {
            assert!(!g.graph.is_empty(), "{}", g.id);
            assert!(!g.classic_progressions.is_empty(), "{}", g.id);
            for n in g.graph.nodes() {
                if let Some(weights) = n.weights {
                    assert_eq!(weights.len(), n.targets.len(), "{} {}", g.id, n.numeral);
                    assert!(weights.iter().all(|&w| w >= 0.0));
                }
                for target in n.targets {
                    assert!(g.graph.node(target).is_some(), "{}: {} -> {}", g.id, n.numeral, target);
                }
            }
        }
    }

    #[test]
    fn test_start_node_is_first_declared() {
        assert_eq!(genre("jazz").unwrap().graph.start().unwrap().numeral, "Imaj7");
        assert_eq!(genre("edm").unwrap().graph.start().unwrap().numeral, "i");
    }

    #[test]
    fn test_every_node_translates_in_every_key() {
        for id in ["C", "G", "Eb", "F#", "Am", "Dm", "Bbm"] {
            let key = Key::parse(id).unwrap();
            for g in genres() {
                for numeral in g.graph.numerals() {
                    let chords = translate(&[numeral], &key);
                    assert_eq!(chords.len(), 1);
                    assert!(!chords[0].is_empty(), "{} {} in {}", g.id, numeral, id);
                }
            }
        }
    }

    #[test]
    fn test_uniform_weights_when_absent() {
        let n = GraphNode {
            numeral: "I",
            targets: &["IV", "V", "vi", "ii"],
            weights: None,
            function: HarmonicFunction::Tonic,
        };
        assert_eq!(n.effective_weights(), vec![25.0; 4]);
    }

    #[test]
    fn test_chord_formula_table() {
        assert_eq!(chord_formula(""), Some(&[0u8, 4, 7][..]));
        assert_eq!(chord_formula("dim7"), Some(&[0u8, 3, 6, 9][..]));
        assert_eq!(chord_formula("7b9"), None);
        assert_eq!(chord_formulas().count(), 16);
    }

    #[test]
    fn test_popular_progressions_translate() {
        let key = Key::parse("C").unwrap();
        let canon = &popular_progressions()[0];
        assert_eq!(translate(canon.numerals, &key), vec!["C", "G", "Am", "F"]);
    }
}

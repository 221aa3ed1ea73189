//! Numeral-to-chord translation for a concrete key

use tracing::trace;

use crate::numeral::{Accidental, NumeralSuffix, NumeralToken};
use crate::theory::{Chord, ChordQuality, Key, Note, ScaleMode};

const MAJOR_KEY_NUMERALS: [(&str, ChordQuality); 7] = [
    ("I", ChordQuality::Major),
    ("ii", ChordQuality::Minor),
    ("iii", ChordQuality::Minor),
    ("IV", ChordQuality::Major),
    ("V", ChordQuality::Major),
    ("vi", ChordQuality::Minor),
    ("vii°", ChordQuality::Diminished),
];

const MINOR_KEY_NUMERALS: [(&str, ChordQuality); 7] = [
    ("i", ChordQuality::Minor),
    ("ii°", ChordQuality::Diminished),
    ("III", ChordQuality::Major),
    ("iv", ChordQuality::Minor),
    ("v", ChordQuality::Minor),
    ("VI", ChordQuality::Major),
    ("VII", ChordQuality::Major),
];

/// The seven diatonic triads of a key, keyed by numeral, in degree order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiatonicChords {
    entries: [(&'static str, Chord); 7],
}

impl DiatonicChords {
    pub fn for_key(key: &Key) -> Self {
        let scale = key.scale();
        let numerals = match key.mode {
            ScaleMode::Major => &MAJOR_KEY_NUMERALS,
            ScaleMode::Minor => &MINOR_KEY_NUMERALS,
        };
        let mut degree = 0;
        let entries = (*numerals).map(|(numeral, quality)| {
            let entry = (numeral, Chord::new(scale[degree], quality));
            degree += 1;
            entry
        });
        Self { entries }
    }

    /// Exact numeral lookup (`vii°` must be spelled with its marker)
    pub fn get(&self, numeral: &str) -> Option<Chord> {
        self.entries
            .iter()
            .find(|(n, _)| *n == numeral)
            .map(|&(_, chord)| chord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Chord)> + '_ {
        self.entries.iter().copied()
    }

    pub fn numerals(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Diatonic chord map for a key
pub fn get_diatonic_chords(key: &Key) -> DiatonicChords {
    DiatonicChords::for_key(key)
}

/// Translate numeral tokens into chord names for a key. Never fails.
pub fn translate<S: AsRef<str>>(tokens: &[S], key: &Key) -> Vec<String> {
    KeyTranslator::new(*key).translate(tokens)
}

/// Translates numeral tokens for one key
#[derive(Debug, Clone)]
pub struct KeyTranslator {
    key: Key,
    scale: [Note; 7],
    diatonic: DiatonicChords,
}

impl KeyTranslator {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            scale: key.scale(),
            diatonic: DiatonicChords::for_key(&key),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn diatonic_chords(&self) -> &DiatonicChords {
        &self.diatonic
    }

    pub fn translate<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens.iter().map(|t| self.translate_token(t.as_ref())).collect()
    }

    /// Translate a single token. Unparseable tokens are echoed unchanged.
    pub fn translate_token(&self, raw: &str) -> String {
        if let Some(chord) = self.diatonic.get(raw) {
            trace!(token = raw, %chord, "diatonic");
            return chord.to_string();
        }

        let Some(token) = NumeralToken::parse(raw) else {
            trace!(token = raw, "unparseable numeral, echoing");
            return raw.to_string();
        };

        let chord = if let Some(accidental) = token.accidental {
            self.altered(&token, accidental)
        } else if token.suffix.is_seventh_family() {
            self.seventh(&token)
        } else if token.suffix == NumeralSuffix::Diminished {
            self.diminished(&token)
        } else {
            self.by_degree(&token)
        };

        trace!(token = raw, %chord, "derived");
        chord.to_string()
    }

    /// Scale note at the degree, minor when the numeral says so
    fn by_degree(&self, token: &NumeralToken) -> Chord {
        let quality = if token.is_minor() {
            ChordQuality::Minor
        } else {
            ChordQuality::Major
        };
        Chord::new(self.scale[token.degree], quality)
    }

    /// Alterations are measured from the parallel major scale, in either mode
    fn altered(&self, token: &NumeralToken, accidental: Accidental) -> Chord {
        let root = self.key.parallel_major_scale()[token.degree].transpose(accidental.semitones());
        let quality = match token.suffix {
            NumeralSuffix::Diminished7 => ChordQuality::Diminished7,
            NumeralSuffix::Diminished => ChordQuality::Diminished,
            NumeralSuffix::Major7 => ChordQuality::Major7,
            NumeralSuffix::Seventh | NumeralSuffix::Minor7 if token.is_minor() => ChordQuality::Minor7,
            NumeralSuffix::Seventh | NumeralSuffix::Minor7 => ChordQuality::Dominant7,
            _ if token.is_minor() => ChordQuality::Minor,
            _ => ChordQuality::Major,
        };
        Chord::new(root, quality)
    }

    /// Diatonic triad for the bare degree, trying the token's case and both
    /// case variants before falling back to degree arithmetic
    fn base_chord(&self, token: &NumeralToken) -> Chord {
        [token.degree_numeral(), token.upper_numeral(), token.lower_numeral()]
            .into_iter()
            .find_map(|numeral| self.diatonic.get(numeral))
            .unwrap_or_else(|| self.by_degree(token))
    }

    fn seventh(&self, token: &NumeralToken) -> Chord {
        let base = self.base_chord(token);
        let quality = match token.suffix {
            NumeralSuffix::Major7 => ChordQuality::Major7,
            NumeralSuffix::Diminished7 => ChordQuality::Diminished7,
            NumeralSuffix::Minor7 => ChordQuality::Minor7,
            _ => match base.quality {
                ChordQuality::Minor => ChordQuality::Minor7,
                ChordQuality::Diminished => ChordQuality::Diminished7,
                _ => ChordQuality::Dominant7,
            },
        };
        Chord::new(base.root, quality)
    }

    fn diminished(&self, token: &NumeralToken) -> Chord {
        let marked = format!("{}°", token.degree_numeral());
        let base = self
            .diatonic
            .get(&marked)
            .unwrap_or_else(|| self.by_degree(token));
        Chord::new(base.root, ChordQuality::Diminished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> Key {
        Key::parse(id).unwrap()
    }

    #[test]
    fn test_pop_canon_in_c() {
        assert_eq!(translate(&["I", "V", "vi", "IV"], &key("C")), vec!["C", "G", "Am", "F"]);
    }

    #[test]
    fn test_andalusian_cadence_in_a_minor() {
        assert_eq!(translate(&["i", "VII", "VI", "V"], &key("Am")), vec!["Am", "G", "F", "E"]);
    }

    #[test]
    fn test_diatonic_map_shape() {
        let chords = get_diatonic_chords(&key("C"));
        let names: Vec<String> = chords.iter().map(|(_, c)| c.to_string()).collect();
        assert_eq!(names, vec!["C", "Dm", "Em", "F", "G", "Am", "Bdim"]);

        let chords = get_diatonic_chords(&key("Am"));
        let names: Vec<String> = chords.iter().map(|(_, c)| c.to_string()).collect();
        assert_eq!(names, vec!["Am", "Bdim", "C", "Dm", "Em", "F", "G"]);
    }

    #[test]
    fn test_diatonic_fixed_point() {
        for id in ["C", "G", "F#", "Bb", "Am", "C#m", "Ebm"] {
            let k = key(id);
            let chords = get_diatonic_chords(&k);
            assert_eq!(chords.len(), 7);
            for (numeral, chord) in chords.iter() {
                assert_eq!(translate(&[numeral], &k), vec![chord.to_string()], "{numeral} in {id}");
            }
        }
    }

    #[test]
    fn test_seventh_chords() {
        let tokens = ["Imaj7", "ii7", "iii7", "IV7", "V7", "vi7", "I7"];
        assert_eq!(
            translate(&tokens, &key("C")),
            vec!["Cmaj7", "Dm7", "Em7", "F7", "G7", "Am7", "C7"]
        );
    }

    #[test]
    fn test_accidentals() {
        let k = key("C");
        assert_eq!(translate(&["bVII"], &k), vec!["A#"]);
        assert_eq!(translate(&["bII7"], &k), vec!["C#7"]);
        assert_eq!(translate(&["bIII7"], &k), vec!["D#7"]);
        assert_eq!(translate(&["#IVdim7"], &k), vec!["F#dim7"]);
        assert_eq!(translate(&["bvi"], &k), vec!["G#m"]);
        assert_eq!(translate(&["bVIImaj7"], &k), vec!["A#maj7"]);

        // measured from the parallel major even in a minor key
        assert_eq!(translate(&["bVII"], &key("Am")), vec!["G"]);
    }

    #[test]
    fn test_diminished_markers() {
        let k = key("C");
        assert_eq!(translate(&["viio"], &k), vec!["Bdim"]);
        assert_eq!(translate(&["vii°"], &k), vec!["Bdim"]);
        assert_eq!(translate(&["ii°"], &key("Am")), vec!["Bdim"]);
        assert_eq!(translate(&["iio"], &key("Am")), vec!["Bdim"]);
        assert_eq!(translate(&["IVo"], &k), vec!["Fdim"]);
    }

    #[test]
    fn test_fallback_arithmetic_and_echo() {
        let k = key("C");
        assert_eq!(translate(&["i"], &k), vec!["Cm"]);
        assert_eq!(translate(&["III"], &k), vec!["E"]);
        assert_eq!(translate(&["Isus4"], &k), vec!["C"]);
        assert_eq!(translate(&["N.C."], &k), vec!["N.C."]);
        assert_eq!(translate(&[""], &k), vec![""]);
    }

    #[test]
    fn test_output_is_sharp_spelled() {
        assert_eq!(translate(&["I", "IV"], &key("Bb")), vec!["A#", "D#"]);
    }
}

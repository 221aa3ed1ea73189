//! Pitch classes, scales, keys and chord qualities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChordmapError, Result};

// ============================================================================
// Notes
// ============================================================================

/// Chromatic note names, sharp spelling (canonical)
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Chromatic note names, flat spelling (display only)
pub const FLAT_NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Octave-4 reference frequencies (A4 = 440Hz)
pub const NOTE_FREQUENCIES: [f64; 12] = [
    261.63, 277.18, 293.66, 311.13, 329.63, 349.23,
    369.99, 392.00, 415.30, 440.00, 466.16, 493.88,
];

/// One of the 12 pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Note(u8);

impl Note {
    /// Build from any semitone index; wraps into 0..12
    pub fn from_pitch_class(pitch_class: i32) -> Self {
        Self(pitch_class.rem_euclid(12) as u8)
    }

    /// Parse a note name in sharp or flat spelling ("C#", "Db", "A")
    pub fn parse(name: &str) -> Result<Self> {
        NOTE_NAMES
            .iter()
            .position(|&n| n == name)
            .or_else(|| FLAT_NOTE_NAMES.iter().position(|&n| n == name))
            .map(|idx| Self(idx as u8))
            .ok_or_else(|| ChordmapError::UnknownNote(name.to_string()))
    }

    pub fn pitch_class(self) -> u8 {
        self.0
    }

    /// Canonical (sharp) spelling
    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    /// Flat spelling for display
    pub fn flat_name(self) -> &'static str {
        FLAT_NOTE_NAMES[self.0 as usize]
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_pitch_class(self.0 as i32 + semitones)
    }

    /// Frequency of this note in the given octave (octave 4 holds A = 440Hz)
    pub fn frequency(self, octave: i32) -> f64 {
        NOTE_FREQUENCIES[self.0 as usize] * 2f64.powi(octave - 4)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = ChordmapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Scales and keys
// ============================================================================

/// Scale/mode types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScaleMode {
    #[default]
    Major,
    Minor,
}

impl ScaleMode {
    /// Get scale intervals (semitones from root)
    pub fn intervals(&self) -> &'static [u8; 7] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
        }
    }
}

/// Build the 7-note scale for a root and mode. `scale[0]` is always the root.
pub fn scale(root: Note, mode: ScaleMode) -> [Note; 7] {
    (*mode.intervals()).map(|interval| root.transpose(interval as i32))
}

/// Build the 7-note scale from a root name in either spelling
pub fn get_scale(root: &str, mode: ScaleMode) -> Result<[Note; 7]> {
    Ok(scale(Note::parse(root)?, mode))
}

/// A musical key: root plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub root: Note,
    pub mode: ScaleMode,
}

impl Key {
    pub fn new(root: Note, mode: ScaleMode) -> Self {
        Self { root, mode }
    }

    pub fn major(root: Note) -> Self {
        Self::new(root, ScaleMode::Major)
    }

    pub fn minor(root: Note) -> Self {
        Self::new(root, ScaleMode::Minor)
    }

    /// Parse a key identifier: a root name with an optional trailing `m` for minor
    /// ("C", "F#", "Bb", "Am", "Ebm")
    pub fn parse(id: &str) -> Result<Self> {
        let id = id.trim();
        match id.strip_suffix('m') {
            Some(root) => Ok(Self::minor(Note::parse(root)?)),
            None => Ok(Self::major(Note::parse(id)?)),
        }
    }

    pub fn is_minor(&self) -> bool {
        self.mode == ScaleMode::Minor
    }

    pub fn scale(&self) -> [Note; 7] {
        scale(self.root, self.mode)
    }

    /// Major scale on the same root, used for chromatic alterations
    pub fn parallel_major_scale(&self) -> [Note; 7] {
        scale(self.root, ScaleMode::Major)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ScaleMode::Major => write!(f, "{}", self.root),
            ScaleMode::Minor => write!(f, "{}m", self.root),
        }
    }
}

impl FromStr for Key {
    type Err = ChordmapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Chord qualities
// ============================================================================

/// Chord quality, one per entry of the chord formula table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Diminished7,
    Augmented,
    Sus2,
    Sus4,
    Dominant9,
    Major9,
    Minor9,
    Add9,
    Major6,
    Minor6,
}

impl ChordQuality {
    /// Formula table order
    pub const ALL: [ChordQuality; 16] = [
        Self::Major,
        Self::Minor,
        Self::Dominant7,
        Self::Major7,
        Self::Minor7,
        Self::Diminished,
        Self::Diminished7,
        Self::Augmented,
        Self::Sus2,
        Self::Sus4,
        Self::Dominant9,
        Self::Major9,
        Self::Minor9,
        Self::Add9,
        Self::Major6,
        Self::Minor6,
    ];

    /// Get chord intervals from root; always starts with 0
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::Diminished => &[0, 3, 6],
            Self::Diminished7 => &[0, 3, 6, 9],
            Self::Augmented => &[0, 4, 8],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
            Self::Dominant9 => &[0, 4, 7, 10, 14],
            Self::Major9 => &[0, 4, 7, 11, 14],
            Self::Minor9 => &[0, 3, 7, 10, 14],
            Self::Add9 => &[0, 4, 7, 14],
            Self::Major6 => &[0, 4, 7, 9],
            Self::Minor6 => &[0, 3, 7, 9],
        }
    }

    /// Suffix appended to the root in a chord name
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Major => "",
            Self::Minor => "m",
            Self::Dominant7 => "7",
            Self::Major7 => "maj7",
            Self::Minor7 => "m7",
            Self::Diminished => "dim",
            Self::Diminished7 => "dim7",
            Self::Augmented => "aug",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
            Self::Dominant9 => "9",
            Self::Major9 => "maj9",
            Self::Minor9 => "m9",
            Self::Add9 => "add9",
            Self::Major6 => "6",
            Self::Minor6 => "m6",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Dominant7 => "Dominant 7th",
            Self::Major7 => "Major 7th",
            Self::Minor7 => "Minor 7th",
            Self::Diminished => "Diminished",
            Self::Diminished7 => "Diminished 7th",
            Self::Augmented => "Augmented",
            Self::Sus2 => "Suspended 2nd",
            Self::Sus4 => "Suspended 4th",
            Self::Dominant9 => "Dominant 9th",
            Self::Major9 => "Major 9th",
            Self::Minor9 => "Minor 9th",
            Self::Add9 => "Add 9",
            Self::Major6 => "Major 6th",
            Self::Minor6 => "Minor 6th",
        }
    }

    /// Exact suffix lookup in the formula table
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.suffix() == suffix)
    }

    /// Resolve a free-form suffix for playback.
    ///
    /// Ordered substring tests (maj7, m7, dim7, dim, aug, 7, m, sus2, sus4), first
    /// hit wins, then a major triad. The order is the whole rule: `dim7` contains
    /// `m7` and plays as a minor seventh, `maj9` contains `m` and plays as a minor
    /// triad. Use `from_suffix` for exact table lookups.
    pub fn resolve(suffix: &str) -> Self {
        let has = |pat: &str| suffix.contains(pat);
        if has("maj7") || has("Maj7") {
            Self::Major7
        } else if has("m7") || has("min7") {
            Self::Minor7
        } else if has("dim7") {
            Self::Diminished7
        } else if has("dim") || has("°") {
            Self::Diminished
        } else if has("aug") || has("+") {
            Self::Augmented
        } else if has("7") {
            Self::Dominant7
        } else if has("m") || has("min") {
            Self::Minor
        } else if has("sus2") {
            Self::Sus2
        } else if has("sus4") {
            Self::Sus4
        } else {
            if !suffix.is_empty() {
                tracing::warn!(suffix, "Unknown chord quality, using major triad");
            }
            Self::Major
        }
    }
}

/// A concrete chord: root note plus quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    pub root: Note,
    pub quality: ChordQuality,
}

impl Chord {
    pub fn new(root: Note, quality: ChordQuality) -> Self {
        Self { root, quality }
    }

    /// Semitone offsets above the root note
    pub fn intervals(&self) -> &'static [u8] {
        self.quality.intervals()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.suffix())
    }
}

/// Split a chord name into its root spelling and quality suffix.
///
/// The root is two characters when the second one is `#` or `b`.
pub fn split_chord_name(name: &str) -> (&str, &str) {
    let mut chars = name.char_indices();
    let Some((_, first)) = chars.next() else {
        return ("", "");
    };
    let root_end = match chars.next() {
        Some((idx, '#' | 'b')) => idx + 1,
        Some((idx, _)) => idx,
        None => first.len_utf8(),
    };
    name.split_at(root_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_parse_both_spellings() {
        assert_eq!(Note::parse("C#").unwrap(), Note::parse("Db").unwrap());
        assert_eq!(Note::parse("Bb").unwrap().name(), "A#");
        assert_eq!(Note::parse("A#").unwrap().flat_name(), "Bb");
        assert!(matches!(Note::parse("H"), Err(ChordmapError::UnknownNote(_))));
    }

    #[test]
    fn test_scale_starts_on_root() {
        let c_major: Vec<&str> = get_scale("C", ScaleMode::Major).unwrap().iter().map(|n| n.name()).collect();
        assert_eq!(c_major, vec!["C", "D", "E", "F", "G", "A", "B"]);

        let a_minor: Vec<&str> = get_scale("A", ScaleMode::Minor).unwrap().iter().map(|n| n.name()).collect();
        assert_eq!(a_minor, vec!["A", "B", "C", "D", "E", "F", "G"]);

        for name in NOTE_NAMES.iter().chain(FLAT_NOTE_NAMES.iter()) {
            let root = Note::parse(name).unwrap();
            assert_eq!(scale(root, ScaleMode::Minor)[0], root);
        }
    }

    #[test]
    fn test_unknown_scale_root() {
        assert!(matches!(get_scale("X", ScaleMode::Major), Err(ChordmapError::UnknownNote(_))));
    }

    #[test]
    fn test_key_parse() {
        let key = Key::parse("Am").unwrap();
        assert_eq!(key.root.name(), "A");
        assert!(key.is_minor());

        let key = Key::parse("Bb").unwrap();
        assert_eq!(key.mode, ScaleMode::Major);
        assert_eq!(key.to_string(), "A#");

        assert_eq!(Key::parse("Ebm").unwrap().to_string(), "D#m");
        assert!(Key::parse("m").is_err());
    }

    #[test]
    fn test_quality_resolution() {
        assert_eq!(ChordQuality::resolve(""), ChordQuality::Major);
        assert_eq!(ChordQuality::resolve("m"), ChordQuality::Minor);
        assert_eq!(ChordQuality::resolve("min7"), ChordQuality::Minor7);
        assert_eq!(ChordQuality::resolve("°"), ChordQuality::Diminished);
        assert_eq!(ChordQuality::resolve("7b9"), ChordQuality::Dominant7);
        assert_eq!(ChordQuality::resolve("sus4"), ChordQuality::Sus4);
        assert_eq!(ChordQuality::resolve("xyz"), ChordQuality::Major);
    }

    #[test]
    fn test_resolution_order_beats_exact_table_match() {
        assert_eq!(ChordQuality::resolve("dim7"), ChordQuality::Minor7);
        assert_eq!(ChordQuality::resolve("maj9"), ChordQuality::Minor);
        assert_eq!(ChordQuality::resolve("m9"), ChordQuality::Minor);
        assert_eq!(ChordQuality::resolve("m6"), ChordQuality::Minor);
        assert_eq!(ChordQuality::resolve("9"), ChordQuality::Major);
        assert_eq!(ChordQuality::resolve("add9"), ChordQuality::Major);
        assert_eq!(ChordQuality::resolve("6"), ChordQuality::Major);

        // exact lookups still see the full table
        assert_eq!(ChordQuality::from_suffix("dim7"), Some(ChordQuality::Diminished7));
        assert_eq!(ChordQuality::from_suffix("maj9"), Some(ChordQuality::Major9));
    }

    #[test]
    fn test_formulas_include_root() {
        for quality in ChordQuality::ALL {
            assert_eq!(quality.intervals()[0], 0, "{:?}", quality);
        }
    }

    #[test]
    fn test_split_chord_name() {
        assert_eq!(split_chord_name("C#m7"), ("C#", "m7"));
        assert_eq!(split_chord_name("Bbmaj7"), ("Bb", "maj7"));
        assert_eq!(split_chord_name("Am"), ("A", "m"));
        assert_eq!(split_chord_name("G"), ("G", ""));
        assert_eq!(split_chord_name(""), ("", ""));
    }

    #[test]
    fn test_frequency_octaves() {
        let a = Note::parse("A").unwrap();
        assert_eq!(a.frequency(4), 440.0);
        assert_eq!(a.frequency(5), 880.0);
        assert_eq!(a.frequency(3), 220.0);
    }
}

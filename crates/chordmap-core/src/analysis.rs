//! Progression statistics and chord-name helpers

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::GenreRecord;
use crate::theory::{ChordQuality, Key};
use crate::translator::DiatonicChords;

/// Summary of a generated progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressionAnalysis {
    /// Distinct chords after translation
    pub unique_chords: usize,
    /// Numerals containing `I` but not `V`
    pub tonic_count: usize,
    /// Numerals containing `V`
    pub dominant_count: usize,
}

pub fn analyze<N: AsRef<str>, C: AsRef<str>>(numerals: &[N], chords: &[C]) -> ProgressionAnalysis {
    let unique_chords = chords.iter().map(|c| c.as_ref()).collect::<HashSet<_>>().len();
    let tonic_count = numerals
        .iter()
        .filter(|n| n.as_ref().contains('I') && !n.as_ref().contains('V'))
        .count();
    let dominant_count = numerals.iter().filter(|n| n.as_ref().contains('V')).count();

    ProgressionAnalysis {
        unique_chords,
        tonic_count,
        dominant_count,
    }
}

/// Readable name for a chord suffix ("" is "Major", unknown suffixes echo)
pub fn chord_type_name(suffix: &str) -> &str {
    ChordQuality::from_suffix(suffix)
        .map(|q| q.name())
        .unwrap_or(suffix)
}

fn degree_letters(numeral: &str) -> String {
    numeral
        .chars()
        .filter(|c| matches!(c, 'I' | 'V' | 'i' | 'v'))
        .collect()
}

/// Find the graph node that a concrete chord most likely came from.
///
/// Matches the chord against the key's diatonic chords (exact or as a prefix,
/// so `G7` matches `G`), then picks the first graph node spelling the same
/// degree. Falls back to the graph's start node.
pub fn find_numeral_for_chord(genre: &GenreRecord, key: &Key, chord: &str) -> Option<&'static str> {
    let diatonic = DiatonicChords::for_key(key);

    for (numeral, diatonic_chord) in diatonic.iter() {
        let name = diatonic_chord.to_string();
        if !chord.starts_with(&name) {
            continue;
        }
        let letters = degree_letters(numeral);
        if let Some(found) = genre.graph.numerals().find(|n| degree_letters(n) == letters) {
            return Some(found);
        }
    }

    genre.graph.start().map(|n| n.numeral)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genre;

    #[test]
    fn test_analyze_counts() {
        let numerals = ["I", "V", "vi", "IV", "I", "V"];
        let chords = ["C", "G", "Am", "F", "C", "G"];
        let analysis = analyze(&numerals, &chords);
        assert_eq!(analysis.unique_chords, 4);
        assert_eq!(analysis.tonic_count, 2);
        // IV contains a V as well
        assert_eq!(analysis.dominant_count, 3);
    }

    #[test]
    fn test_chord_type_name() {
        assert_eq!(chord_type_name(""), "Major");
        assert_eq!(chord_type_name("m7"), "Minor 7th");
        assert_eq!(chord_type_name("7#11"), "7#11");
    }

    #[test]
    fn test_find_numeral_for_chord() {
        let key = Key::parse("C").unwrap();
        let pop = genre("pop").unwrap();
        assert_eq!(find_numeral_for_chord(pop, &key, "Am"), Some("vi"));
        assert_eq!(find_numeral_for_chord(pop, &key, "G"), Some("V"));

        let jazz = genre("jazz").unwrap();
        assert_eq!(find_numeral_for_chord(jazz, &key, "Dm7"), Some("ii7"));
        assert_eq!(find_numeral_for_chord(jazz, &key, "G7"), Some("V7"));
        assert_eq!(find_numeral_for_chord(jazz, &key, "Xyz"), Some("Imaj7"));
    }
}

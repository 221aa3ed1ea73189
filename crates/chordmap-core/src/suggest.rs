//! Next-chord suggestions for step-by-step progression building

use serde::Serialize;

use crate::catalog::{GenreRecord, HarmonicFunction};
use crate::theory::Key;
use crate::translator::KeyTranslator;

/// How strongly a suggestion is recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Neutral,
    Recommended,
    HighlyRecommended,
}

impl Recommendation {
    pub fn from_weight(weight: f64) -> Self {
        if weight >= 35.0 {
            Self::HighlyRecommended
        } else if weight >= 20.0 {
            Self::Recommended
        } else {
            Self::Neutral
        }
    }
}

/// A candidate chord, as numeral and as a chord in the current key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub numeral: &'static str,
    pub chord: String,
    pub weight: Option<f64>,
    pub recommendation: Recommendation,
}

/// Candidates for the next chord
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    /// Graph targets of the previous chord, in declared order
    pub primary: Vec<Suggestion>,
    /// Every other graph node
    pub others: Vec<Suggestion>,
    /// Harmonic function of the previous chord, when it is a graph node
    pub function: Option<HarmonicFunction>,
    /// Whether `primary` weights come from the graph rather than a uniform split
    pub weighted: bool,
}

impl Suggestions {
    pub fn explanation(&self) -> &'static str {
        self.function.unwrap_or_default().explanation()
    }
}

fn start_rank(numeral: &str) -> u8 {
    match numeral {
        "I" | "Imaj7" => 1,
        "i" => 2,
        "vi" | "vi7" => 3,
        "IV" | "IV7" => 4,
        "ii" | "ii7" => 5,
        "V" | "V7" => 6,
        "iii" | "iii7" => 7,
        _ => 10,
    }
}

/// Options for the first chord: every graph node, typical openers first
pub fn initial_options(genre: &GenreRecord, key: &Key) -> Vec<Suggestion> {
    let translator = KeyTranslator::new(*key);
    let mut numerals: Vec<&'static str> = genre.graph.numerals().collect();
    numerals.sort_by_key(|n| start_rank(n));

    numerals
        .into_iter()
        .map(|numeral| {
            let recommendation = match numeral {
                "I" | "Imaj7" | "i" => Recommendation::HighlyRecommended,
                "vi" | "vi7" => Recommendation::Recommended,
                _ => Recommendation::Neutral,
            };
            Suggestion {
                numeral,
                chord: translator.translate_token(numeral),
                weight: None,
                recommendation,
            }
        })
        .collect()
}

/// Options following `last`: its graph targets first, then everything else
pub fn suggest_next(genre: &GenreRecord, key: &Key, last: &str) -> Suggestions {
    let Some(node) = genre.graph.node(last) else {
        return Suggestions {
            primary: initial_options(genre, key),
            others: Vec::new(),
            function: None,
            weighted: false,
        };
    };

    let translator = KeyTranslator::new(*key);
    let primary = node
        .targets
        .iter()
        .enumerate()
        .map(|(idx, &numeral)| {
            let weight = match node.weights {
                Some(weights) => weights.get(idx).copied().unwrap_or(0.0),
                None => (100.0 / node.targets.len() as f64).round(),
            };
            Suggestion {
                numeral,
                chord: translator.translate_token(numeral),
                weight: Some(weight),
                recommendation: Recommendation::from_weight(weight),
            }
        })
        .collect();

    let others = genre
        .graph
        .numerals()
        .filter(|n| !node.targets.contains(n))
        .map(|numeral| Suggestion {
            numeral,
            chord: translator.translate_token(numeral),
            weight: None,
            recommendation: Recommendation::Neutral,
        })
        .collect();

    Suggestions {
        primary,
        others,
        function: Some(node.function),
        weighted: node.weights.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genre;

    #[test]
    fn test_initial_options_order() {
        let key = Key::parse("C").unwrap();
        let options = initial_options(genre("pop").unwrap(), &key);
        let numerals: Vec<&str> = options.iter().map(|s| s.numeral).collect();
        assert_eq!(numerals, vec!["I", "vi", "IV", "ii", "V", "iii"]);
        assert_eq!(options[0].recommendation, Recommendation::HighlyRecommended);
        assert_eq!(options[1].recommendation, Recommendation::Recommended);
        assert_eq!(options[0].chord, "C");
    }

    #[test]
    fn test_suggest_after_dominant() {
        let key = Key::parse("C").unwrap();
        let suggestions = suggest_next(genre("pop").unwrap(), &key, "V");
        let primary: Vec<(&str, &str)> = suggestions
            .primary
            .iter()
            .map(|s| (s.numeral, s.chord.as_str()))
            .collect();
        assert_eq!(primary, vec![("vi", "Am"), ("I", "C"), ("IV", "F")]);
        assert_eq!(suggestions.primary[0].recommendation, Recommendation::HighlyRecommended);
        assert_eq!(suggestions.primary[2].recommendation, Recommendation::Recommended);

        let others: Vec<&str> = suggestions.others.iter().map(|s| s.numeral).collect();
        assert_eq!(others, vec!["V", "ii", "iii"]);
        assert_eq!(suggestions.function, Some(HarmonicFunction::Dominant));
        assert!(suggestions.weighted);
    }

    #[test]
    fn test_suggest_after_unknown_numeral() {
        let key = Key::parse("C").unwrap();
        let suggestions = suggest_next(genre("rock").unwrap(), &key, "bVI");
        assert_eq!(suggestions.function, None);
        assert!(suggestions.others.is_empty());
        assert_eq!(suggestions.primary.len(), genre("rock").unwrap().graph.len());
        assert_eq!(suggestions.explanation(), HarmonicFunction::Default.explanation());
    }
}

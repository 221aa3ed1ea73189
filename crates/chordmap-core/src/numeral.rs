//! Roman numeral tokens (scale-degree references such as `ii7`, `bVII`, `vii°`)

use std::fmt;

use serde::{Deserialize, Serialize};

const UPPER_NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];
const LOWER_NUMERALS: [&str; 7] = ["i", "ii", "iii", "iv", "v", "vi", "vii"];

/// Chromatic alteration in front of a numeral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accidental {
    Flat,
    Sharp,
}

impl Accidental {
    pub fn semitones(&self) -> i32 {
        match self {
            Self::Flat => -1,
            Self::Sharp => 1,
        }
    }
}

/// Quality marker following the numeral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumeralSuffix {
    None,
    /// Explicit `m`
    Minor,
    /// Plain `7`
    Seventh,
    /// `m7`
    Minor7,
    /// `maj7`
    Major7,
    /// `°`, trailing `o`, or `dim`
    Diminished,
    /// `dim7`, `°7` or `o7`
    Diminished7,
    /// Anything else; ignored during translation
    Other(String),
}

impl NumeralSuffix {
    fn parse(suffix: &str) -> Self {
        match suffix {
            "" => Self::None,
            "m" => Self::Minor,
            "7" => Self::Seventh,
            "m7" | "min7" => Self::Minor7,
            "maj7" | "Maj7" | "M7" => Self::Major7,
            "°" | "o" | "dim" => Self::Diminished,
            "dim7" | "°7" | "o7" => Self::Diminished7,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_seventh_family(&self) -> bool {
        matches!(self, Self::Seventh | Self::Minor7 | Self::Major7 | Self::Diminished7)
    }
}

/// A parsed scale-degree reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumeralToken {
    pub accidental: Option<Accidental>,
    /// 0-based scale degree (I = 0 .. VII = 6)
    pub degree: usize,
    /// Lower-case numerals denote minor triads
    pub lowercase: bool,
    pub suffix: NumeralSuffix,
}

impl NumeralToken {
    /// Parse a token such as `bVII`, `ii7`, `#IVdim7` or `viio`.
    ///
    /// Returns `None` when no roman numeral can be read.
    pub fn parse(token: &str) -> Option<Self> {
        let (accidental, rest) = if let Some(rest) = token.strip_prefix('b').or_else(|| token.strip_prefix('♭')) {
            (Some(Accidental::Flat), rest)
        } else if let Some(rest) = token.strip_prefix('#').or_else(|| token.strip_prefix('♯')) {
            (Some(Accidental::Sharp), rest)
        } else {
            (None, token)
        };

        let roman_len = rest
            .char_indices()
            .find(|&(_, c)| !matches!(c, 'I' | 'V' | 'i' | 'v'))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (roman, suffix) = rest.split_at(roman_len);

        let (degree, lowercase) = if let Some(idx) = UPPER_NUMERALS.iter().position(|&n| n == roman) {
            (idx, false)
        } else if let Some(idx) = LOWER_NUMERALS.iter().position(|&n| n == roman) {
            (idx, true)
        } else {
            return None;
        };

        Some(Self {
            accidental,
            degree,
            lowercase,
            suffix: NumeralSuffix::parse(suffix),
        })
    }

    /// Degree numeral without accidental or suffix, in the token's own case
    pub fn degree_numeral(&self) -> &'static str {
        if self.lowercase {
            LOWER_NUMERALS[self.degree]
        } else {
            UPPER_NUMERALS[self.degree]
        }
    }

    pub fn upper_numeral(&self) -> &'static str {
        UPPER_NUMERALS[self.degree]
    }

    pub fn lower_numeral(&self) -> &'static str {
        LOWER_NUMERALS[self.degree]
    }

    /// Lower-case numeral or an explicit minor marker
    pub fn is_minor(&self) -> bool {
        self.lowercase || matches!(self.suffix, NumeralSuffix::Minor | NumeralSuffix::Minor7)
    }
}

impl fmt::Display for NumeralToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accidental {
            Some(Accidental::Flat) => f.write_str("b")?,
            Some(Accidental::Sharp) => f.write_str("#")?,
            None => {}
        }
        f.write_str(self.degree_numeral())?;
        match &self.suffix {
            NumeralSuffix::None => Ok(()),
            NumeralSuffix::Minor => f.write_str("m"),
            NumeralSuffix::Seventh => f.write_str("7"),
            NumeralSuffix::Minor7 => f.write_str("m7"),
            NumeralSuffix::Major7 => f.write_str("maj7"),
            NumeralSuffix::Diminished => f.write_str("°"),
            NumeralSuffix::Diminished7 => f.write_str("dim7"),
            NumeralSuffix::Other(other) => f.write_str(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numerals() {
        let token = NumeralToken::parse("vi").unwrap();
        assert_eq!(token.degree, 5);
        assert!(token.lowercase);
        assert_eq!(token.suffix, NumeralSuffix::None);

        let token = NumeralToken::parse("IV").unwrap();
        assert_eq!(token.degree, 3);
        assert!(!token.is_minor());
    }

    #[test]
    fn test_parse_accidentals_and_suffixes() {
        let token = NumeralToken::parse("bVII").unwrap();
        assert_eq!(token.accidental, Some(Accidental::Flat));
        assert_eq!(token.degree, 6);

        let token = NumeralToken::parse("#IVdim7").unwrap();
        assert_eq!(token.accidental, Some(Accidental::Sharp));
        assert_eq!(token.degree, 3);
        assert_eq!(token.suffix, NumeralSuffix::Diminished7);

        assert_eq!(NumeralToken::parse("Imaj7").unwrap().suffix, NumeralSuffix::Major7);
        assert_eq!(NumeralToken::parse("ii7").unwrap().suffix, NumeralSuffix::Seventh);
        assert_eq!(NumeralToken::parse("viio").unwrap().suffix, NumeralSuffix::Diminished);
        assert_eq!(NumeralToken::parse("vii°").unwrap().suffix, NumeralSuffix::Diminished);
    }

    #[test]
    fn test_parse_rejects_non_numerals() {
        assert!(NumeralToken::parse("").is_none());
        assert!(NumeralToken::parse("b").is_none());
        assert!(NumeralToken::parse("Xyz").is_none());
        assert!(NumeralToken::parse("Vi").is_none());
        assert!(NumeralToken::parse("VIII").is_none());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(NumeralToken::parse("bVII7").unwrap().to_string(), "bVII7");
        assert_eq!(NumeralToken::parse("viio").unwrap().to_string(), "vii°");
    }
}

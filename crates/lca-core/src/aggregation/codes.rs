use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

pub const UNKNOWN_CLASSIFICATION: &str = "Unknown";

/// Splits `<Letter A-J><1-2 digits>.<1-2 digits>` into its parts.
fn parse_leaf_code(code: &str) -> Option<(char, u8, u8)> {
    let mut chars = code.chars();
    let letter = chars.next().filter(|letter| ('A'..='J').contains(letter))?;
    let (major, minor) = chars.as_str().split_once('.')?;
    Some((letter, parse_digits(major)?, parse_digits(minor)?))
}

fn parse_digits(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Canonical grouping key: `C2.3` and `C02.03` both become `C02.03`.
///
/// Codes of any other shape are kept as given (outer whitespace removed);
/// a missing code groups under `Unknown`.
pub fn normalize_classification_code(code: Option<&str>) -> String {
    let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
        return UNKNOWN_CLASSIFICATION.to_string();
    };
    match parse_leaf_code(code) {
        Some((letter, major, minor)) => format!("{letter}{major:02}.{minor:02}"),
        None => code.to_string(),
    }
}

/// Top level of the classification hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MainGroup {
    Letter(char),
    /// Every code that is not a canonical `A`–`J` leaf code.
    Unclassified,
}

impl MainGroup {
    pub fn for_code(normalized_code: &str) -> Self {
        let canonical = normalized_code.len() == 6
            && parse_leaf_code(normalized_code).is_some();
        match normalized_code.chars().next() {
            Some(letter) if canonical => Self::Letter(letter),
            _ => Self::Unclassified,
        }
    }

    pub fn key(self) -> String {
        match self {
            Self::Letter(letter) => letter.to_string(),
            Self::Unclassified => "unclassified".to_string(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Letter('A') => "Grundstück",
            Self::Letter('B') => "Vorbereitung",
            Self::Letter('C') => "Konstruktion",
            Self::Letter('D') => "Technik",
            Self::Letter('E') => "Äussere Wandbekleidung",
            Self::Letter('F') => "Bedachung",
            Self::Letter('G') => "Ausbau",
            Self::Letter('H') => "Nutzungsspezifische Anlage",
            Self::Letter('I') => "Umgebung",
            Self::Letter('J') => "Ausstattung",
            Self::Letter(_) | Self::Unclassified => "Sonstige Klassifikationen",
        }
    }
}

impl Display for MainGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Letter(letter) => write!(f, "{letter} {}", self.display_name()),
            Self::Unclassified => f.write_str(self.display_name()),
        }
    }
}

impl Serialize for MainGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

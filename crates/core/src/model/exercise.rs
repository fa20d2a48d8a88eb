use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of exercises in every (language, difficulty) roster.
pub const ROSTER_SIZE: usize = 20;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("exercise index must be below {ROSTER_SIZE}, got {0}")]
    IndexOutOfRange(usize),
}

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// Languages offered by the exercise catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C++")]
    CPlusPlus,
    #[serde(rename = "Java")]
    Java,
    #[serde(rename = "JavaScript")]
    JavaScript,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "PHP")]
    Php,
    #[serde(rename = "Data Structure")]
    DataStructure,
    #[serde(rename = "ML")]
    Ml,
    #[serde(rename = "MySQL")]
    MySql,
    #[serde(rename = "Python")]
    Python,
    #[serde(rename = "CSS")]
    Css,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Language::C,
        Language::CPlus,
        Language::CPlusPlus,
        Language::Java,
        Language::JavaScript,
        Language::Html,
        Language::Php,
        Language::DataStructure,
        Language::Ml,
        Language::MySql,
        Language::Python,
        Language::Css,
    ];

    /// Display and persisted name of the language.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::CPlus => "C+",
            Language::CPlusPlus => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::Html => "HTML",
            Language::Php => "PHP",
            Language::DataStructure => "Data Structure",
            Language::Ml => "ML",
            Language::MySql => "MySQL",
            Language::Python => "Python",
            Language::Css => "CSS",
        }
    }

    /// Syntax family used to pick analyzer rules.
    #[must_use]
    pub fn class(self) -> LanguageClass {
        match self {
            Language::Python => LanguageClass::Indentation,
            Language::MySql => LanguageClass::Query,
            Language::Css => LanguageClass::StyleSheet,
            Language::JavaScript => LanguageClass::Script,
            Language::C | Language::CPlus | Language::CPlusPlus | Language::Java | Language::Php => {
                LanguageClass::BraceStatement
            }
            Language::Html | Language::DataStructure | Language::Ml => LanguageClass::Plain,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = ExerciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        if let Some(lang) = Language::ALL
            .into_iter()
            .find(|lang| lang.name().to_ascii_lowercase() == needle)
        {
            return Ok(lang);
        }

        match needle.as_str() {
            "cplus" => Ok(Language::CPlus),
            "cpp" => Ok(Language::CPlusPlus),
            "js" => Ok(Language::JavaScript),
            "data-structure" | "datastructure" => Ok(Language::DataStructure),
            "sql" => Ok(Language::MySql),
            "py" => Ok(Language::Python),
            _ => Err(ExerciseError::UnknownLanguage(s.to_string())),
        }
    }
}

//
// ─── LANGUAGE CLASS ────────────────────────────────────────────────────────────
//

/// Closed set of syntax families the analyzer knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageClass {
    /// Indentation-based languages with a `print` builtin.
    Indentation,
    /// Query languages whose statements end in `;`.
    Query,
    /// Style sheets made of `property: value;` declarations.
    StyleSheet,
    /// Brace-delimited languages with `;`-terminated statements.
    BraceStatement,
    /// Brace-statement scripting languages with declared variables.
    Script,
    /// Languages with no class-specific rules.
    Plain,
}

impl LanguageClass {
    /// Whether `;`-terminated statement rules apply.
    #[must_use]
    pub fn has_statements(self) -> bool {
        matches!(self, LanguageClass::BraceStatement | LanguageClass::Script)
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ExerciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|level| level.name() == needle)
            .ok_or_else(|| ExerciseError::UnknownDifficulty(s.to_string()))
    }
}

//
// ─── EXERCISE INDEX ────────────────────────────────────────────────────────────
//

/// Zero-based ordinal into a roster of [`ROSTER_SIZE`] exercises.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ExerciseIndex(u8);

impl ExerciseIndex {
    pub const FIRST: ExerciseIndex = ExerciseIndex(0);
    #[allow(clippy::cast_possible_truncation)]
    pub const LAST: ExerciseIndex = ExerciseIndex((ROSTER_SIZE - 1) as u8);

    /// Creates an index, rejecting values outside the roster.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::IndexOutOfRange` if `value >= ROSTER_SIZE`.
    pub fn new(value: usize) -> Result<Self, ExerciseError> {
        if value >= ROSTER_SIZE {
            return Err(ExerciseError::IndexOutOfRange(value));
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| ExerciseError::IndexOutOfRange(value))
    }

    #[must_use]
    pub fn value(self) -> usize {
        usize::from(self.0)
    }

    /// The following index, or `None` at the end of the roster.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.value() + 1).ok()
    }

    /// The preceding index, or `None` at the start of the roster.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.value().checked_sub(1).and_then(|v| Self::new(v).ok())
    }

    /// Iterates over every index of a roster in order.
    pub fn all() -> impl Iterator<Item = ExerciseIndex> {
        (0..ROSTER_SIZE).filter_map(|v| Self::new(v).ok())
    }
}

impl TryFrom<usize> for ExerciseIndex {
    type Error = ExerciseError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExerciseIndex> for usize {
    fn from(index: ExerciseIndex) -> Self {
        index.value()
    }
}

impl fmt::Debug for ExerciseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseIndex({})", self.0)
    }
}

impl fmt::Display for ExerciseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── EXERCISE REFERENCE ────────────────────────────────────────────────────────
//

/// Immutable reference to one exercise in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExerciseRef {
    pub language: Language,
    pub difficulty: Difficulty,
    pub index: ExerciseIndex,
}

impl ExerciseRef {
    #[must_use]
    pub fn new(language: Language, difficulty: Difficulty, index: ExerciseIndex) -> Self {
        Self {
            language,
            difficulty,
            index,
        }
    }

    /// Same language and difficulty, different ordinal.
    #[must_use]
    pub fn with_index(self, index: ExerciseIndex) -> Self {
        Self { index, ..self }
    }
}

impl fmt::Display for ExerciseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} #{}/{ROSTER_SIZE}",
            self.language,
            self.difficulty,
            self.index.value() + 1
        )
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.name().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn language_aliases_parse() {
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::CPlusPlus);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("data structure".parse::<Language>().unwrap(), Language::DataStructure);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn language_classes_cover_statement_languages() {
        for lang in [
            Language::C,
            Language::CPlus,
            Language::CPlusPlus,
            Language::Java,
            Language::JavaScript,
            Language::Php,
        ] {
            assert!(lang.class().has_statements(), "{lang}");
        }
        assert_eq!(Language::Python.class(), LanguageClass::Indentation);
        assert_eq!(Language::Html.class(), LanguageClass::Plain);
    }

    #[test]
    fn language_serializes_with_display_name() {
        let json = serde_json::to_string(&Language::DataStructure).unwrap();
        assert_eq!(json, "\"Data Structure\"");
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Extreme".parse::<Difficulty>().unwrap(), Difficulty::Extreme);
        assert!("insane".parse::<Difficulty>().is_err());
    }

    #[test]
    fn index_rejects_out_of_range() {
        assert!(ExerciseIndex::new(19).is_ok());
        assert_eq!(
            ExerciseIndex::new(20).unwrap_err(),
            ExerciseError::IndexOutOfRange(20)
        );
    }

    #[test]
    fn index_navigation_saturates_at_bounds() {
        assert_eq!(ExerciseIndex::FIRST.previous(), None);
        assert_eq!(ExerciseIndex::LAST.next(), None);
        assert_eq!(
            ExerciseIndex::new(3).unwrap().next(),
            Some(ExerciseIndex::new(4).unwrap())
        );
        assert_eq!(ExerciseIndex::all().count(), ROSTER_SIZE);
    }

    #[test]
    fn exercise_ref_display_is_one_based() {
        let ex = ExerciseRef::new(
            Language::Java,
            Difficulty::Hard,
            ExerciseIndex::new(0).unwrap(),
        );
        assert_eq!(ex.to_string(), "Java hard #1/20");
    }
}

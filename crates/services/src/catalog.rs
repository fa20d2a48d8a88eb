use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use practice_core::model::{Difficulty, ExerciseIndex, ExerciseRef, Language, ROSTER_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Sample input/output pair shown alongside an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

/// Read-only description of one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Lookup of exercise content by reference.
///
/// `None` means the roster does not cover that exercise.
pub trait ExerciseCatalog: Send + Sync {
    fn lookup(&self, exercise: ExerciseRef) -> Option<Exercise>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    exercises: HashMap<ExerciseRef, Exercise>,
}

type CatalogDocument = BTreeMap<String, BTreeMap<String, Vec<Exercise>>>;

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, exercise: ExerciseRef, content: Exercise) {
        self.exercises.insert(exercise, content);
    }

    #[must_use]
    pub fn with(mut self, exercise: ExerciseRef, content: Exercise) -> Self {
        self.insert(exercise, content);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Parse a catalog document of the form
    /// `{ "<language>": { "<difficulty>": [exercise, ...] } }`.
    ///
    /// Exercises past the end of a roster are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and
    /// `CatalogError::Exercise` for unknown languages or difficulties.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(text)?;
        let mut catalog = Self::new();

        for (language_name, levels) in document {
            let language: Language = language_name.parse()?;
            for (difficulty_name, exercises) in levels {
                let difficulty: Difficulty = difficulty_name.parse()?;
                if exercises.len() > ROSTER_SIZE {
                    tracing::warn!(
                        %language,
                        %difficulty,
                        count = exercises.len(),
                        "catalog roster is longer than {ROSTER_SIZE}; extra exercises ignored"
                    );
                }
                for (index, content) in ExerciseIndex::all().zip(exercises) {
                    catalog.insert(ExerciseRef::new(language, difficulty, index), content);
                }
            }
        }

        tracing::debug!(exercises = catalog.len(), "loaded exercise catalog");
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`InMemoryCatalog::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl ExerciseCatalog for InMemoryCatalog {
    fn lookup(&self, exercise: ExerciseRef) -> Option<Exercise> {
        self.exercises.get(&exercise).cloned()
    }
}

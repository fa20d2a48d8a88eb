use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::{Difficulty, ExerciseRef, Language, ROSTER_SIZE};

/// Completion flags for one (language, difficulty) roster, index-aligned.
pub type RosterProgress = [bool; ROSTER_SIZE];

const LANGUAGE_TOTAL: usize = ROSTER_SIZE * Difficulty::ALL.len();

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Persistent record of which exercises have been completed.
///
/// Entries are created lazily, on the first completion in a roster, so an
/// absent entry and an all-`false` entry are distinguishable. Completion is
/// monotonic: nothing ever clears a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLedger {
    entries: BTreeMap<(Language, Difficulty), RosterProgress>,
}

impl ProgressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The roster for `(language, difficulty)`, if anything was ever completed in it.
    #[must_use]
    pub fn entry(&self, language: Language, difficulty: Difficulty) -> Option<&RosterProgress> {
        self.entries.get(&(language, difficulty))
    }

    /// Iterates over present entries in `(language, difficulty)` order.
    pub fn entries(&self) -> impl Iterator<Item = ((Language, Difficulty), &RosterProgress)> {
        self.entries.iter().map(|(key, roster)| (*key, roster))
    }

    /// Marks `exercise` as completed.
    ///
    /// Returns `true` if this call changed the ledger.
    pub fn record_completion(&mut self, exercise: ExerciseRef) -> bool {
        let roster = self
            .entries
            .entry((exercise.language, exercise.difficulty))
            .or_insert([false; ROSTER_SIZE]);
        let slot = &mut roster[exercise.index.value()];
        let newly = !*slot;
        *slot = true;
        newly
    }

    #[must_use]
    pub fn is_completed(&self, exercise: ExerciseRef) -> bool {
        self.entry(exercise.language, exercise.difficulty)
            .is_some_and(|roster| roster[exercise.index.value()])
    }

    /// Completed exercises in one roster; a missing roster counts as zero.
    #[must_use]
    pub fn completed_in(&self, language: Language, difficulty: Difficulty) -> usize {
        self.entry(language, difficulty)
            .map_or(0, |roster| roster.iter().filter(|done| **done).count())
    }

    /// Completed exercises across all four difficulties of `language`.
    #[must_use]
    pub fn completed_count(&self, language: Language) -> usize {
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| self.completed_in(language, difficulty))
            .sum()
    }

    /// True iff all four rosters exist and every exercise in them is completed.
    #[must_use]
    pub fn is_language_complete(&self, language: Language) -> bool {
        Difficulty::ALL.into_iter().all(|difficulty| {
            self.entry(language, difficulty)
                .is_some_and(|roster| roster.iter().all(|done| *done))
        })
    }

    /// Share of the language's 80 exercises completed, rounded to a whole percent.
    #[must_use]
    pub fn percentage(&self, language: Language) -> u8 {
        rounded_percent(self.completed_count(language), LANGUAGE_TOTAL)
    }

    /// Share of one roster completed, rounded to a whole percent.
    #[must_use]
    pub fn percentage_for_difficulty(&self, language: Language, difficulty: Difficulty) -> u8 {
        rounded_percent(self.completed_in(language, difficulty), ROSTER_SIZE)
    }

    /// Languages eligible for a completion certificate.
    #[must_use]
    pub fn completed_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| self.is_language_complete(*language))
            .collect()
    }

    /// Encodes the ledger as its persisted record.
    #[must_use]
    pub fn to_record(&self) -> LedgerRecord {
        let mut root = Map::new();
        for ((language, difficulty), roster) in &self.entries {
            let levels = root
                .entry(language.name())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(levels) = levels {
                let flags: Vec<Value> = roster.iter().copied().map(Value::Bool).collect();
                levels.insert(difficulty.name().to_string(), Value::Array(flags));
            }
        }
        LedgerRecord(Value::Object(root))
    }

    /// Decodes a persisted record, dropping anything malformed.
    ///
    /// Unknown languages or difficulties, non-array values, rosters of the
    /// wrong length and non-boolean flags each discard only the affected entry.
    #[must_use]
    pub fn from_record(record: &LedgerRecord) -> Self {
        let mut ledger = Self::new();
        let Value::Object(languages) = &record.0 else {
            return ledger;
        };

        for (language_name, levels) in languages {
            let Ok(language) = language_name.parse::<Language>() else {
                continue;
            };
            if language.name() != language_name.as_str() {
                continue;
            }
            let Value::Object(levels) = levels else {
                continue;
            };
            for (difficulty_name, flags) in levels {
                let Ok(difficulty) = difficulty_name.parse::<Difficulty>() else {
                    continue;
                };
                if difficulty.name() != difficulty_name.as_str() {
                    continue;
                }
                if let Some(roster) = decode_roster(flags) {
                    ledger.entries.insert((language, difficulty), roster);
                }
            }
        }
        ledger
    }
}

fn decode_roster(value: &Value) -> Option<RosterProgress> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.len() != ROSTER_SIZE {
        return None;
    }
    let mut roster = [false; ROSTER_SIZE];
    for (slot, item) in roster.iter_mut().zip(items) {
        *slot = item.as_bool()?;
    }
    Some(roster)
}

#[allow(clippy::cast_possible_truncation)]
fn rounded_percent(done: usize, total: usize) -> u8 {
    // Half-up rounding of 100 * done / total; bounded by 100 since done <= total.
    ((200 * done.min(total) + total) / (2 * total)) as u8
}

//
// ─── PERSISTED RECORD ──────────────────────────────────────────────────────────
//

/// Self-contained persisted form of the ledger:
/// `{ "<language>": { "<difficulty>": [bool; 20] } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord(Value);

impl LedgerRecord {
    /// Parses a record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the text is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Serializes the record to compact JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for LedgerRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// Trivia answers keyed by challenge hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerData {
    pub schema_version: u32,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
}

impl Default for AnswerData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            answers: BTreeMap::new(),
            aliases: BTreeMap::new(),
            last_fetch: None,
        }
    }
}

impl AnswerData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryWords {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub failures: BTreeMap<String, u32>,
    /// Words that failed too often and may not be learned again.
    #[serde(default)]
    pub blocked: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnedWordsData {
    pub schema_version: u32,
    #[serde(default)]
    pub dictionaries: BTreeMap<String, DictionaryWords>,
}

impl Default for LearnedWordsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            dictionaries: BTreeMap::new(),
        }
    }
}

impl LearnedWordsData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub wordpilot_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub answers: AnswerData,
    pub learned_words: LearnedWordsData,
}

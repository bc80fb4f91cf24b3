use std::collections::BTreeMap;

use log::{debug, info};

use crate::store::schema::{DictionaryWords, LearnedWordsData};

pub const MIN_LEARNED_LENGTH: usize = 3;
/// Failures after which a learned word is dropped for good.
pub const MAX_FAILURES: u32 = 3;

/// Lowercase, trimmed, keeping only `[a-z0-9-]`.
pub fn normalize_word(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Words the game accepted that our lexicon did not know, per dictionary.
#[derive(Debug, Default)]
pub struct LearnedWords {
    data: LearnedWordsData,
    dictionary: Option<String>,
    dirty: bool,
}

impl LearnedWords {
    pub fn from_data(data: LearnedWordsData) -> Self {
        Self {
            data,
            dictionary: None,
            dirty: false,
        }
    }

    pub fn data(&self) -> &LearnedWordsData {
        &self.data
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn dictionary(&self) -> Option<&str> {
        self.dictionary.as_deref()
    }

    pub fn set_dictionary(&mut self, id: &str) {
        let id = id.trim();
        if id.is_empty() || self.dictionary.as_deref() == Some(id) {
            return;
        }
        let known = self.data.dictionaries.entry(id.to_string()).or_default();
        info!("dictionary set to {id}, {} learned words", known.words.len());
        self.dictionary = Some(id.to_string());
    }

    fn current_mut(&mut self) -> Option<&mut DictionaryWords> {
        let id = self.dictionary.as_ref()?;
        Some(self.data.dictionaries.entry(id.clone()).or_default())
    }

    /// Records `word` for the current dictionary. Returns whether it was new.
    pub fn add_word(&mut self, word: &str) -> bool {
        let word = normalize_word(word);
        if word.len() < MIN_LEARNED_LENGTH {
            return false;
        }
        let Some(dict) = self.current_mut() else {
            return false;
        };
        if dict.blocked.contains(&word) || dict.words.contains(&word) {
            return false;
        }
        debug!("learned '{word}'");
        dict.words.push(word);
        self.dirty = true;
        true
    }

    /// Counts a failure. At the limit the word is removed and blocked.
    pub fn mark_failed(&mut self, word: &str) {
        let word = normalize_word(word);
        if word.is_empty() {
            return;
        }
        let Some(dict) = self.current_mut() else {
            return;
        };
        let count = dict.failures.entry(word.clone()).or_insert(0);
        *count += 1;
        if *count >= MAX_FAILURES {
            if let Some(idx) = dict.words.iter().position(|w| *w == word) {
                dict.words.remove(idx);
                info!("dropped consistently failing word '{word}'");
            }
            dict.blocked.insert(word);
        }
        self.dirty = true;
    }

    pub fn words(&self) -> &[String] {
        self.dictionary
            .as_ref()
            .and_then(|id| self.data.dictionaries.get(id))
            .map(|d| d.words.as_slice())
            .unwrap_or_default()
    }

    /// Learned word count per dictionary.
    pub fn stats(&self) -> BTreeMap<String, usize> {
        self.data
            .dictionaries
            .iter()
            .map(|(id, d)| (id.clone(), d.words.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.data.dictionaries.values().map(|d| d.words.len()).sum()
    }

    /// Additive merge: union of words, failure counts take the larger value.
    pub fn import(&mut self, other: &LearnedWordsData) -> usize {
        let mut added = 0;
        for (id, incoming) in &other.dictionaries {
            let dict = self.data.dictionaries.entry(id.clone()).or_default();
            for (word, &count) in &incoming.failures {
                let entry = dict.failures.entry(word.clone()).or_insert(0);
                *entry = (*entry).max(count);
            }
            dict.blocked.extend(incoming.blocked.iter().cloned());
            for word in &incoming.words {
                if !dict.words.contains(word) && !dict.blocked.contains(word) {
                    dict.words.push(word.clone());
                    added += 1;
                }
            }
        }
        self.dirty = true;
        added
    }
}

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::store::schema::AnswerData;

/// Remote answers are pulled at most this often.
pub const SYNC_INTERVAL_HOURS: i64 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerStats {
    pub total_answers: usize,
    pub total_aliases: usize,
    pub last_fetch: Option<DateTime<Utc>>,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Known trivia answers keyed by challenge hash. Canonical answers are never
/// overwritten; alternate phrasings accumulate as aliases.
#[derive(Debug, Default)]
pub struct AnswerStore {
    data: AnswerData,
    dirty: bool,
}

impl AnswerStore {
    pub fn from_data(data: AnswerData) -> Self {
        Self { data, dirty: false }
    }

    pub fn data(&self) -> &AnswerData {
        &self.data
    }

    /// Returns and clears the unsaved-changes flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn get_answer(&self, hash: &str, prefer_shortest: bool) -> Option<&str> {
        let primary = self.data.answers.get(hash)?;
        let aliases = self.data.aliases.get(hash).filter(|a| !a.is_empty());
        match aliases {
            Some(aliases) if prefer_shortest => {
                let mut best = primary.as_str();
                for alias in aliases {
                    if alias.chars().count() < best.chars().count() {
                        best = alias;
                    }
                }
                Some(best)
            }
            _ => Some(primary),
        }
    }

    /// Canonical answer first, then aliases in the order they were learned.
    pub fn all_answers(&self, hash: &str) -> Vec<&str> {
        let Some(primary) = self.data.answers.get(hash) else {
            return Vec::new();
        };
        let mut out = vec![primary.as_str()];
        if let Some(aliases) = self.data.aliases.get(hash) {
            out.extend(aliases.iter().map(String::as_str));
        }
        out
    }

    pub fn add_answer(&mut self, hash: &str, answer: &str) -> bool {
        let answer = answer.trim();
        if hash.is_empty() || answer.is_empty() || self.data.answers.contains_key(hash) {
            return false;
        }
        info!("learned answer '{answer}'");
        self.data
            .answers
            .insert(hash.to_string(), answer.to_string());
        self.dirty = true;
        true
    }

    pub fn add_alias(&mut self, hash: &str, alias: &str) -> bool {
        let alias = alias.trim();
        if alias.is_empty() {
            return false;
        }
        let Some(primary) = self.data.answers.get(hash) else {
            return false;
        };
        let key = normalize(alias);
        if normalize(primary) == key {
            return false;
        }
        let aliases = self.data.aliases.entry(hash.to_string()).or_default();
        if aliases.iter().any(|a| normalize(a) == key) {
            return false;
        }
        debug!("learned alias '{alias}' for '{primary}'");
        aliases.push(alias.to_string());
        self.dirty = true;
        true
    }

    /// Merges `hash:answer` lines, keeping any answer already known. The answer
    /// part may itself contain colons. Returns how many were new.
    pub fn merge_remote(&mut self, text: &str) -> usize {
        let mut added = 0;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let Some((hash, answer)) = line.split_once(':') else {
                continue;
            };
            let hash = hash.trim();
            let answer = answer.trim();
            if hash.is_empty() || answer.is_empty() || self.data.answers.contains_key(hash) {
                continue;
            }
            self.data
                .answers
                .insert(hash.to_string(), answer.to_string());
            added += 1;
        }
        if added > 0 {
            info!("merged {added} new answers from remote");
            self.dirty = true;
        }
        added
    }

    pub fn sync_due(&self, now: DateTime<Utc>) -> bool {
        match self.data.last_fetch {
            Some(last) => now - last > Duration::hours(SYNC_INTERVAL_HOURS),
            None => true,
        }
    }

    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.data.last_fetch = Some(now);
        self.dirty = true;
    }

    pub fn stats(&self) -> AnswerStats {
        AnswerStats {
            total_answers: self.data.answers.len(),
            total_aliases: self.data.aliases.values().map(Vec::len).sum(),
            last_fetch: self.data.last_fetch,
        }
    }

    /// Additive merge of an imported bundle. Returns answers plus aliases added.
    pub fn import(&mut self, other: &AnswerData) -> usize {
        let mut added = 0;
        for (hash, answer) in &other.answers {
            if self.add_answer(hash, answer) {
                added += 1;
            }
        }
        for (hash, aliases) in &other.aliases {
            for alias in aliases {
                if self.add_alias(hash, alias) {
                    added += 1;
                }
            }
        }
        added
    }
}

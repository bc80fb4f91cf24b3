use std::collections::HashSet;

/// Words that may not be picked again: already played or refused by the game.
#[derive(Clone, Debug, Default)]
pub struct ExclusionSet {
    words: HashSet<String>,
}

impl ExclusionSet {
    /// Returns false for blank words and words already present.
    pub fn insert(&mut self, word: &str) -> bool {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        self.words.insert(normalized)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub syllable: String,
    pub min_length: usize,
    pub max_length: usize,
}

impl CacheKey {
    pub fn new(syllable: &str, min_length: usize, max_length: usize) -> Self {
        Self {
            syllable: syllable.to_lowercase(),
            min_length,
            max_length,
        }
    }
}

/// Ranked candidate lists keyed by constraint, evicting the oldest entry
/// once `capacity` is reached.
pub struct RankingCache {
    entries: HashMap<CacheKey, Vec<String>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl RankingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: CacheKey, words: Vec<String>) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = words;
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, words);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RankingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

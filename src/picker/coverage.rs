use std::collections::BTreeMap;

pub const ALPHABET_LEN: usize = 26;

pub fn letter_index(ch: char) -> Option<usize> {
    let lower = ch.to_ascii_lowercase();
    lower
        .is_ascii_lowercase()
        .then(|| (lower as u8 - b'a') as usize)
}

fn index_letter(idx: usize) -> char {
    (b'a' + idx as u8) as char
}

/// How many more times each letter still has to show up in played words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageState {
    remaining: [u32; ALPHABET_LEN],
    enabled: bool,
}

impl CoverageState {
    pub fn new(remaining: [u32; ALPHABET_LEN], enabled: bool) -> Self {
        Self { remaining, enabled }
    }

    /// Builds from a letter map. Keys are case-insensitive; non-letters are ignored
    /// and letters not mentioned count as zero.
    pub fn from_map(map: &BTreeMap<char, u32>, enabled: bool) -> Self {
        let mut remaining = [0; ALPHABET_LEN];
        for (&ch, &count) in map {
            if let Some(idx) = letter_index(ch) {
                remaining[idx] = count;
            }
        }
        Self { remaining, enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn remaining(&self) -> &[u32; ALPHABET_LEN] {
        &self.remaining
    }

    /// Letters with a positive remaining count. Empty when disabled.
    pub fn needed_letters(&self) -> Vec<char> {
        if !self.enabled {
            return Vec::new();
        }
        (0..ALPHABET_LEN)
            .filter(|&i| self.remaining[i] > 0)
            .map(index_letter)
            .collect()
    }

    pub fn has_needed_letters(&self) -> bool {
        self.enabled && self.remaining.iter().any(|&c| c > 0)
    }

    /// Number of distinct still-needed letters in `word`.
    pub fn score(&self, word: &str) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut seen = [false; ALPHABET_LEN];
        for idx in word.chars().filter_map(letter_index) {
            seen[idx] = true;
        }
        (0..ALPHABET_LEN)
            .filter(|&i| seen[i] && self.remaining[i] > 0)
            .count()
    }
}

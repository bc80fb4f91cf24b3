use std::collections::BTreeMap;

use log::{debug, info};

use crate::picker::coverage::{ALPHABET_LEN, CoverageState, letter_index};

const DEFAULT_REQUIREMENT: u32 = 1;

/// Tracks the bonus-alphabet quota: every letter must be used a number of
/// times across our own accepted words. Once all letters are cleared the quota
/// starts over.
#[derive(Clone, Debug)]
pub struct AlphabetTracker {
    requirements: [u32; ALPHABET_LEN],
    remaining: [u32; ALPHABET_LEN],
    enabled: bool,
}

impl AlphabetTracker {
    pub fn new(enabled: bool) -> Self {
        let requirements = [DEFAULT_REQUIREMENT; ALPHABET_LEN];
        Self {
            requirements,
            remaining: requirements,
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Replaces the quota from a game rule set. Letters absent from `bonus`
    /// fall back to one use each. Remaining counts restart from the new quota.
    pub fn apply_rules(&mut self, bonus: &BTreeMap<char, u32>) {
        let mut requirements = [DEFAULT_REQUIREMENT; ALPHABET_LEN];
        for (&ch, &count) in bonus {
            if let Some(idx) = letter_index(ch) {
                requirements[idx] = count;
            }
        }
        self.requirements = requirements;
        self.remaining = requirements;
        debug!("alphabet quota replaced from game rules");
    }

    /// Counts one of our accepted words against the quota. Returns whether
    /// anything changed.
    pub fn record_word(&mut self, word: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let mut seen = [false; ALPHABET_LEN];
        for idx in word.chars().filter_map(letter_index) {
            seen[idx] = true;
        }

        let mut changed = false;
        for (idx, _) in seen.iter().enumerate().filter(|(_, s)| **s) {
            if self.remaining[idx] > 0 {
                self.remaining[idx] -= 1;
                changed = true;
            }
        }

        if changed && self.remaining.iter().all(|&c| c == 0) {
            info!("alphabet cleared, restarting quota");
            self.remaining = self.requirements;
        }
        changed
    }

    pub fn reset(&mut self) {
        self.remaining = self.requirements;
    }

    pub fn remaining(&self) -> &[u32; ALPHABET_LEN] {
        &self.remaining
    }

    pub fn coverage(&self) -> CoverageState {
        CoverageState::new(self.remaining, self.enabled)
    }
}

impl Default for AlphabetTracker {
    fn default() -> Self {
        Self::new(false)
    }
}

//! Candidate ranking: filter the lexicon by a syllable and length window,
//! order by alphabet coverage and word frequency, then apply the exclusion
//! set and an optional length bias.

pub mod alphabet;
pub mod cache;
pub mod coverage;
pub mod exclusion;
pub mod frequency;

use std::cmp::Reverse;
use std::sync::Arc;

use log::debug;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::lexicon::LexiconStore;
use crate::picker::cache::{CacheKey, RankingCache};
use crate::picker::coverage::CoverageState;
use crate::picker::exclusion::ExclusionSet;
use crate::picker::frequency::word_frequency;

pub const MIN_WORD_LENGTH: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthBias {
    #[default]
    None,
    Shortest,
    Longest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub syllable: String,
    pub min_length: usize,
    pub max_length: usize,
    pub count: usize,
    pub exclude_used: bool,
    pub prefer_coverage: bool,
    pub length_bias: LengthBias,
}

impl Constraint {
    pub fn new(syllable: &str) -> Self {
        Self {
            syllable: syllable.to_string(),
            ..Self::default()
        }
    }

    pub fn lengths(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            syllable: String::new(),
            min_length: MIN_WORD_LENGTH,
            max_length: 30,
            count: 10,
            exclude_used: true,
            prefer_coverage: true,
            length_bias: LengthBias::None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Categories {
    pub short: Vec<String>,
    pub medium: Vec<String>,
    pub long: Vec<String>,
}

pub struct WordPicker {
    lexicon: Arc<LexiconStore>,
    exclusions: ExclusionSet,
    coverage: CoverageState,
    cache: RankingCache,
    frequency_sort: bool,
    lexicon_generation: u64,
    rng: SmallRng,
}

impl WordPicker {
    pub fn new(lexicon: Arc<LexiconStore>, frequency_sort: bool) -> Self {
        Self::with_rng(lexicon, frequency_sort, SmallRng::from_entropy())
    }

    pub fn with_rng(lexicon: Arc<LexiconStore>, frequency_sort: bool, rng: SmallRng) -> Self {
        Self {
            lexicon,
            exclusions: ExclusionSet::default(),
            coverage: CoverageState::default(),
            cache: RankingCache::default(),
            frequency_sort,
            lexicon_generation: 0,
            rng,
        }
    }

    pub fn lexicon(&self) -> &Arc<LexiconStore> {
        &self.lexicon
    }

    pub fn pick_words(&mut self, constraint: &Constraint) -> Vec<String> {
        let (generation, words) = self.lexicon.snapshot();
        if generation != self.lexicon_generation {
            self.cache.clear();
            self.lexicon_generation = generation;
        }

        if words.is_empty() || constraint.syllable.is_empty() {
            return Vec::new();
        }

        let min = constraint.min_length.max(MIN_WORD_LENGTH);
        let max = constraint.max_length.max(min);
        let key = CacheKey::new(&constraint.syllable, min, max);

        if self.cache.get(&key).is_none() {
            let ranked = self.rank(&words, &key, constraint.prefer_coverage);
            debug!(
                "ranked {} candidates for '{}' ({}-{})",
                ranked.len(),
                key.syllable,
                min,
                max
            );
            self.cache.insert(key.clone(), ranked);
        }
        let ranked = self.cache.get(&key).unwrap_or_default();

        let mut candidates: Vec<&String> = if constraint.exclude_used && !self.exclusions.is_empty() {
            ranked
                .iter()
                .filter(|w| !self.exclusions.contains(w))
                .collect()
        } else {
            ranked.iter().collect()
        };

        // Stable sorts, so equal lengths keep the ranked order.
        match constraint.length_bias {
            LengthBias::None => {}
            LengthBias::Shortest => candidates.sort_by_key(|w| w.chars().count()),
            LengthBias::Longest => candidates.sort_by_key(|w| Reverse(w.chars().count())),
        }

        candidates
            .into_iter()
            .take(constraint.count)
            .cloned()
            .collect()
    }

    pub fn pick_best(&mut self, constraint: &Constraint) -> Option<String> {
        let single = Constraint {
            count: 1,
            ..constraint.clone()
        };
        self.pick_words(&single).into_iter().next()
    }

    /// Short (3-5), medium (6-9) and long (10-30) suggestions, ten of each.
    pub fn pick_by_category(
        &mut self,
        syllable: &str,
        exclude_used: bool,
        prefer_coverage: bool,
    ) -> Categories {
        let mut pick = |min, max| {
            let constraint = Constraint {
                exclude_used,
                prefer_coverage,
                ..Constraint::new(syllable).lengths(min, max).count(10)
            };
            self.pick_words(&constraint)
        };
        Categories {
            short: pick(3, 5),
            medium: pick(6, 9),
            long: pick(10, 30),
        }
    }

    fn rank(&mut self, words: &[String], key: &CacheKey, prefer_coverage: bool) -> Vec<String> {
        let matching: Vec<&String> = words
            .iter()
            .filter(|w| {
                let len = w.chars().count();
                len >= key.min_length && len <= key.max_length && w.contains(&key.syllable)
            })
            .collect();

        if prefer_coverage && self.coverage.has_needed_letters() {
            let mut scored: Vec<(Reverse<usize>, Reverse<u32>, u32, &String)> = matching
                .into_iter()
                .map(|w| {
                    (
                        Reverse(self.coverage.score(w)),
                        Reverse(word_frequency(w)),
                        self.rng.next_u32(),
                        w,
                    )
                })
                .collect();
            scored.sort();
            scored.into_iter().map(|(_, _, _, w)| w.clone()).collect()
        } else if self.frequency_sort {
            let mut scored: Vec<(Reverse<u32>, u32, &String)> = matching
                .into_iter()
                .map(|w| (Reverse(word_frequency(w)), self.rng.next_u32(), w))
                .collect();
            scored.sort();
            scored.into_iter().map(|(_, _, w)| w.clone()).collect()
        } else {
            matching.into_iter().cloned().collect()
        }
    }

    pub fn exclude(&mut self, word: &str) {
        if self.exclusions.insert(word) {
            self.cache.clear();
        }
    }

    pub fn is_excluded(&self, word: &str) -> bool {
        self.exclusions.contains(word)
    }

    pub fn exclusion_count(&self) -> usize {
        self.exclusions.len()
    }

    pub fn reset_exclusions(&mut self) {
        self.exclusions.clear();
        self.cache.clear();
    }

    pub fn set_coverage(&mut self, coverage: CoverageState) {
        self.coverage = coverage;
        self.cache.clear();
    }

    pub fn coverage(&self) -> &CoverageState {
        &self.coverage
    }

    pub fn set_frequency_sort(&mut self, enabled: bool) {
        if self.frequency_sort != enabled {
            self.frequency_sort = enabled;
            self.cache.clear();
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const SCENARIO: [&str; 4] = ["cat", "catalog", "scatter", "dog"];

    fn picker(words: &[&str], frequency_sort: bool) -> WordPicker {
        let lexicon = Arc::new(LexiconStore::preloaded(words.iter().copied()));
        WordPicker::with_rng(lexicon, frequency_sort, SmallRng::seed_from_u64(7))
    }

    fn sorted(mut words: Vec<String>) -> Vec<String> {
        words.sort();
        words
    }

    #[test]
    fn test_scenario_two_of_three_cat_words() {
        let mut picker = picker(&SCENARIO, true);
        let constraint = Constraint {
            exclude_used: false,
            ..Constraint::new("cat").lengths(3, 10).count(2)
        };
        let result = picker.pick_words(&constraint);
        assert_eq!(result.len(), 2);
        for word in &result {
            assert!(["cat", "catalog", "scatter"].contains(&word.as_str()));
        }
        assert!(!result.contains(&"dog".to_string()));
    }

    #[test]
    fn test_scenario_excluded_word_is_dropped() {
        let mut picker = picker(&SCENARIO, true);
        picker.exclude("cat");
        let constraint = Constraint::new("cat").lengths(3, 10).count(3);
        let result = picker.pick_words(&constraint);
        assert_eq!(sorted(result), vec!["catalog", "scatter"]);
    }

    #[test]
    fn test_results_respect_length_window_and_substring() {
        let words = [
            "ca", "cab", "cable", "scab", "decade", "arcade", "vocabulary", "cat", "dog", "abc",
        ];
        let mut picker = picker(&words, false);
        let constraint = Constraint::new("ca").lengths(4, 6).count(100);
        let result = picker.pick_words(&constraint);
        assert!(!result.is_empty());
        for word in &result {
            assert!(word.len() >= 4 && word.len() <= 6, "{word} out of range");
            assert!(word.contains("ca"));
        }
    }

    #[test]
    fn test_min_length_is_floored_and_max_follows_min() {
        let mut picker = picker(&["ca", "cab", "cabin"], false);
        let result = picker.pick_words(&Constraint::new("ca").lengths(0, 1));
        assert_eq!(result, vec!["cab"]);
    }

    #[test]
    fn test_empty_syllable_or_lexicon_returns_nothing() {
        let mut picker = picker(&SCENARIO, false);
        assert!(picker.pick_words(&Constraint::new("")).is_empty());

        let mut empty = picker_with_lexicon(LexiconStore::http(None));
        assert!(empty.pick_words(&Constraint::new("cat")).is_empty());
        assert_eq!(empty.cached_entries(), 0);
    }

    fn picker_with_lexicon(lexicon: LexiconStore) -> WordPicker {
        WordPicker::with_rng(Arc::new(lexicon), false, SmallRng::seed_from_u64(1))
    }

    #[test]
    fn test_syllable_is_case_insensitive() {
        let mut picker = picker(&SCENARIO, false);
        let result = picker.pick_words(&Constraint::new("CAT"));
        assert_eq!(result, vec!["cat", "catalog", "scatter"]);
    }

    #[test]
    fn test_scan_order_without_frequency_sort() {
        let mut picker = picker(&["scatter", "catalog", "cat"], false);
        let result = picker.pick_words(&Constraint::new("cat"));
        assert_eq!(result, vec!["scatter", "catalog", "cat"]);
    }

    #[test]
    fn test_frequency_sort_puts_common_words_first() {
        let mut picker = picker(&["scatter", "catalog", "cat"], true);
        let result = picker.pick_words(&Constraint::new("cat"));
        assert_eq!(result[0], "cat");
    }

    #[test]
    fn test_exclusion_holds_until_reset() {
        let mut picker = picker(&SCENARIO, false);
        picker.exclude("CATALOG");
        for _ in 0..3 {
            let result = picker.pick_words(&Constraint::new("cat"));
            assert!(!result.contains(&"catalog".to_string()));
        }
        picker.reset_exclusions();
        let result = picker.pick_words(&Constraint::new("cat"));
        assert!(result.contains(&"catalog".to_string()));
    }

    #[test]
    fn test_exclusion_ignored_when_not_requested() {
        let mut picker = picker(&SCENARIO, false);
        picker.exclude("cat");
        let constraint = Constraint {
            exclude_used: false,
            ..Constraint::new("cat")
        };
        assert!(picker.pick_words(&constraint).contains(&"cat".to_string()));
    }

    #[test]
    fn test_repeat_pick_reuses_cached_order() {
        let words: Vec<String> = (0..200).map(|i| format!("ab{i:03}")).collect();
        let lexicon = Arc::new(LexiconStore::preloaded(&words));
        let mut picker = WordPicker::with_rng(lexicon, true, SmallRng::seed_from_u64(3));
        let constraint = Constraint::new("ab").count(50);

        let first = picker.pick_words(&constraint);
        let second = picker.pick_words(&constraint);
        assert_eq!(first, second);
        assert_eq!(picker.cached_entries(), 1);
    }

    #[test]
    fn test_mutations_invalidate_cache() {
        let mut picker = picker(&SCENARIO, false);
        let constraint = Constraint::new("cat");
        picker.pick_words(&constraint);
        assert_eq!(picker.cached_entries(), 1);

        picker.exclude("scatter");
        assert_eq!(picker.cached_entries(), 0);
        let result = picker.pick_words(&constraint);
        assert!(!result.contains(&"scatter".to_string()));

        picker.reset_exclusions();
        assert_eq!(picker.cached_entries(), 0);
        picker.pick_words(&constraint);

        picker.set_coverage(CoverageState::default());
        assert_eq!(picker.cached_entries(), 0);
    }

    #[test]
    fn test_coverage_prefers_words_with_needed_letters() {
        let mut picker = picker(&["cat", "catalog", "scatter", "catwalk"], true);
        let mut needed = BTreeMap::new();
        needed.insert('w', 1);
        needed.insert('k', 1);
        picker.set_coverage(CoverageState::from_map(&needed, true));

        let result = picker.pick_words(&Constraint::new("cat"));
        assert_eq!(result[0], "catwalk");
    }

    #[test]
    fn test_coverage_ignored_when_not_preferred() {
        let mut picker = picker(&["cat", "catwalk"], true);
        let mut needed = BTreeMap::new();
        needed.insert('w', 1);
        picker.set_coverage(CoverageState::from_map(&needed, true));

        let constraint = Constraint {
            prefer_coverage: false,
            ..Constraint::new("cat")
        };
        assert_eq!(picker.pick_words(&constraint)[0], "cat");
    }

    #[test]
    fn test_length_bias_overrides_coverage_order() {
        let mut picker = picker(&["catwalk", "scatter", "cat", "catalogue"], false);
        let mut needed = BTreeMap::new();
        needed.insert('w', 1);
        picker.set_coverage(CoverageState::from_map(&needed, true));

        let shortest = Constraint {
            length_bias: LengthBias::Shortest,
            ..Constraint::new("cat")
        };
        assert_eq!(picker.pick_words(&shortest), vec!["cat", "catwalk", "scatter", "catalogue"]);

        let longest = Constraint {
            length_bias: LengthBias::Longest,
            ..Constraint::new("cat")
        };
        assert_eq!(picker.pick_best(&longest).as_deref(), Some("catalogue"));
    }

    #[test]
    fn test_pick_best_returns_none_without_candidates() {
        let mut picker = picker(&SCENARIO, false);
        assert_eq!(picker.pick_best(&Constraint::new("zzz")), None);
        assert!(picker.pick_best(&Constraint::new("og")).is_some());
    }

    #[test]
    fn test_pick_by_category_buckets_lengths() {
        let words = ["tea", "steam", "teaching", "steamboats", "teaspoonful"];
        let mut picker = picker(&words, false);
        let categories = picker.pick_by_category("tea", true, true);
        assert_eq!(categories.short, vec!["tea", "steam"]);
        assert_eq!(categories.medium, vec!["teaching"]);
        assert_eq!(categories.long, vec!["steamboats", "teaspoonful"]);
    }

    #[test]
    fn test_new_lexicon_load_drops_stale_cache() {
        use crate::lexicon::fetch::StaticSource;

        let lexicon = Arc::new(LexiconStore::new(
            Box::new(StaticSource::new("cat\ncatalog")),
            None,
        ));
        lexicon.load_wordlist(Some("first"));
        let mut picker = WordPicker::with_rng(Arc::clone(&lexicon), false, SmallRng::seed_from_u64(9));
        assert_eq!(picker.pick_words(&Constraint::new("cat")).len(), 2);

        lexicon.load_wordlist(Some("second"));
        picker.pick_words(&Constraint::new("cat"));
        assert_eq!(picker.cached_entries(), 1);
    }
}

//! Word list loading.
//!
//! The list is fetched once per effective URL and shared as an
//! `Arc<Vec<String>>` snapshot. Concurrent callers asking for the same list
//! while a fetch is running wait for that fetch instead of starting another.

pub mod fetch;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::lexicon::fetch::{HttpSource, StaticSource, TextSource};

pub const DEFAULT_WORDLIST_URL: &str =
    "https://raw.githubusercontent.com/OMetaVR/Bomb-party-word-list/refs/heads/main/wordlist.txt";

const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);
const PRELOADED_URL: &str = "memory:preloaded";

#[derive(Default)]
struct LoadState {
    words: Arc<Vec<String>>,
    url: Option<String>,
    loading: bool,
    generation: u64,
}

pub struct LexiconStore {
    source: Box<dyn TextSource>,
    preferred_url: Option<String>,
    state: Mutex<LoadState>,
}

impl LexiconStore {
    pub fn new(source: Box<dyn TextSource>, preferred_url: Option<String>) -> Self {
        Self {
            source,
            preferred_url,
            state: Mutex::new(LoadState::default()),
        }
    }

    pub fn http(preferred_url: Option<String>) -> Self {
        Self::new(Box::new(HttpSource), preferred_url)
    }

    /// A store that already holds `words` and never touches the network.
    pub fn preloaded<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let store = Self::new(
            Box::new(StaticSource::new(text)),
            Some(PRELOADED_URL.to_string()),
        );
        store.load_wordlist(None);
        store
    }

    /// Explicit argument, then the configured preference, then the default list.
    pub fn resolve_url(&self, url: Option<&str>) -> String {
        url.filter(|u| !u.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.preferred_url.clone().filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_WORDLIST_URL.to_string())
    }

    pub fn load_wordlist(&self, url: Option<&str>) -> Arc<Vec<String>> {
        let target = self.resolve_url(url);

        {
            let mut state = self.lock();
            if state.url.as_deref() == Some(target.as_str()) {
                return Arc::clone(&state.words);
            }
            if state.loading {
                drop(state);
                debug!("wordlist load already in flight, waiting");
                return self.wait_for_load();
            }
            state.loading = true;
        }

        let result = self.source.fetch(&target);

        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(text) => {
                let words = parse_wordlist(&text);
                info!("loaded {} words from {}", words.len(), target);
                state.words = Arc::new(words);
                state.url = Some(target);
                state.generation += 1;
            }
            Err(err) => {
                error!("failed to load wordlist from {target}: {err}");
            }
        }
        Arc::clone(&state.words)
    }

    fn wait_for_load(&self) -> Arc<Vec<String>> {
        loop {
            thread::sleep(LOAD_POLL_INTERVAL);
            let state = self.lock();
            if !state.loading {
                return Arc::clone(&state.words);
            }
        }
    }

    pub fn words(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.lock().words)
    }

    /// Current list together with a counter bumped on every successful load.
    pub fn snapshot(&self) -> (u64, Arc<Vec<String>>) {
        let state = self.lock();
        (state.generation, Arc::clone(&state.words))
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().url.is_some()
    }

    pub fn contains(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.words().iter().any(|w| *w == lower)
    }

    fn lock(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One word per line; trimmed, lowercased, blank lines dropped.
pub fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::fetch::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        text: String,
        calls: Arc<AtomicUsize>,
        delay: Duration,
        fail: bool,
    }

    impl TextSource for CountingSource {
        fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if self.fail {
                Err(FetchError::Status(503))
            } else {
                Ok(self.text.clone())
            }
        }
    }

    fn counting(text: &str, delay_ms: u64, fail: bool) -> (LexiconStore, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            text: text.to_string(),
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(delay_ms),
            fail,
        };
        (LexiconStore::new(Box::new(source), None), calls)
    }

    #[test]
    fn test_parse_trims_lowercases_and_drops_blanks() {
        let words = parse_wordlist("Cat\r\n  DOG \n\n\nbird\n   \n");
        assert_eq!(words, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        assert_eq!(parse_wordlist("a\na\n"), vec!["a", "a"]);
    }

    #[test]
    fn test_resolve_url_precedence() {
        let store = LexiconStore::http(Some("https://pref.example/list.txt".into()));
        assert_eq!(
            store.resolve_url(Some("https://arg.example/x.txt")),
            "https://arg.example/x.txt"
        );
        assert_eq!(store.resolve_url(None), "https://pref.example/list.txt");

        let store = LexiconStore::http(None);
        assert_eq!(store.resolve_url(None), DEFAULT_WORDLIST_URL);
        assert_eq!(store.resolve_url(Some("  ")), DEFAULT_WORDLIST_URL);
    }

    #[test]
    fn test_same_url_is_fetched_once() {
        let (store, calls) = counting("cat\ndog", 0, false);
        let first = store.load_wordlist(Some("u1"));
        let second = store.load_wordlist(Some("u1"));
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_new_url_refetches_and_bumps_generation() {
        let (store, calls) = counting("cat", 0, false);
        store.load_wordlist(Some("u1"));
        let (gen1, _) = store.snapshot();
        store.load_wordlist(Some("u2"));
        let (gen2, _) = store.snapshot();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(gen2 > gen1);
    }

    #[test]
    fn test_concurrent_load_waits_for_in_flight_fetch() {
        let (store, calls) = counting("cat\ndog\nbird", 300, false);
        let store = Arc::new(store);

        let background = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.load_wordlist(Some("u1")))
        };
        thread::sleep(Duration::from_millis(80));
        let waited = store.load_wordlist(Some("u1"));
        let loaded = background.join().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(waited.len(), 3);
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_state() {
        let (store, _) = counting("", 0, true);
        let words = store.load_wordlist(Some("u1"));
        assert!(words.is_empty());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_preloaded_store_is_ready() {
        let store = LexiconStore::preloaded(["Cat", "dog"]);
        assert!(store.is_loaded());
        assert_eq!(*store.words(), vec!["cat".to_string(), "dog".to_string()]);
        assert!(store.contains("CAT"));
        assert!(!store.contains("bird"));
        // Reloading with no argument resolves to the preloaded list.
        assert_eq!(store.load_wordlist(None).len(), 2);
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{AnswerData, EXPORT_VERSION, ExportData, LearnedWordsData};

const ANSWERS_FILE: &str = "answers.json";
const LEARNED_WORDS_FILE: &str = "learned_words.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpilot");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing, unreadable or malformed files all load as the default value.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("discarding malformed {name}: {err}");
                T::default()
            }),
            Err(err) => {
                warn!("could not read {name}: {err}");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        write_atomic(&self.file_path(name), &serde_json::to_string_pretty(data)?)
    }

    pub fn load_answers(&self) -> AnswerData {
        let data: AnswerData = self.load(ANSWERS_FILE);
        if data.needs_reset() {
            warn!("answers schema {} is stale, starting fresh", data.schema_version);
            return AnswerData::default();
        }
        data
    }

    pub fn save_answers(&self, data: &AnswerData) -> Result<()> {
        self.save(ANSWERS_FILE, data)
    }

    pub fn load_learned_words(&self) -> LearnedWordsData {
        let data: LearnedWordsData = self.load(LEARNED_WORDS_FILE);
        if data.needs_reset() {
            warn!(
                "learned words schema {} is stale, starting fresh",
                data.schema_version
            );
            return LearnedWordsData::default();
        }
        data
    }

    pub fn save_learned_words(&self, data: &LearnedWordsData) -> Result<()> {
        self.save(LEARNED_WORDS_FILE, data)
    }

    /// Bundle everything persisted into one export record.
    pub fn export_all(&self) -> ExportData {
        ExportData {
            wordpilot_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            answers: self.load_answers(),
            learned_words: self.load_learned_words(),
        }
    }
}

/// Writes via a sibling `.tmp` file, fsyncs it, then renames over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn write_export(path: &Path, data: &ExportData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_atomic(path, &serde_json::to_string_pretty(data)?)
}

pub fn read_export(path: &Path) -> Result<ExportData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading export {}", path.display()))?;
    let data: ExportData = serde_json::from_str(&content)
        .with_context(|| format!("parsing export {}", path.display()))?;
    if data.wordpilot_export_version != EXPORT_VERSION {
        bail!(
            "Unsupported export version: {} (expected {})",
            data.wordpilot_export_version,
            EXPORT_VERSION
        );
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::DictionaryWords;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn sample_answers() -> AnswerData {
        let mut data = AnswerData::default();
        data.answers.insert("h1".to_string(), "Paris".to_string());
        data.aliases
            .insert("h1".to_string(), vec!["Paname".to_string()]);
        data
    }

    #[test]
    fn test_missing_files_load_as_defaults() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_answers(), AnswerData::default());
        assert_eq!(store.load_learned_words(), LearnedWordsData::default());
    }

    #[test]
    fn test_save_and_reload_answers() {
        let (_dir, store) = make_test_store();
        let data = sample_answers();
        store.save_answers(&data).unwrap();
        assert_eq!(store.load_answers(), data);
        assert!(!store.file_path("answers.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(ANSWERS_FILE), "{ not json").unwrap();
        assert_eq!(store.load_answers(), AnswerData::default());
    }

    #[test]
    fn test_stale_schema_is_reset() {
        let (_dir, store) = make_test_store();
        let mut data = sample_answers();
        data.schema_version = 99;
        store.save_answers(&data).unwrap();
        assert!(store.load_answers().answers.is_empty());
    }

    #[test]
    fn test_export_then_read_back() {
        let (dir, store) = make_test_store();
        store.save_answers(&sample_answers()).unwrap();
        let mut learned = LearnedWordsData::default();
        learned.dictionaries.insert(
            "en".to_string(),
            DictionaryWords {
                words: vec!["zyzzyva".to_string()],
                ..DictionaryWords::default()
            },
        );
        store.save_learned_words(&learned).unwrap();

        let path = dir.path().join("out").join("export.json");
        write_export(&path, &store.export_all()).unwrap();
        let read = read_export(&path).unwrap();
        assert_eq!(read.answers, sample_answers());
        assert_eq!(read.learned_words, learned);
    }

    #[test]
    fn test_version_rejection() {
        let (dir, store) = make_test_store();
        let mut export = store.export_all();
        export.wordpilot_export_version = 99;
        let path = dir.path().join("export.json");
        fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();

        let err_msg = read_export(&path).unwrap_err().to_string();
        assert!(err_msg.contains("Unsupported export version"));
        assert!(err_msg.contains("99"));
    }
}

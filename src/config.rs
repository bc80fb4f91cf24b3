use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::picker::LengthBias;
use crate::session::timing::TimingProfile;

pub const DEFAULT_ANSWERS_URL: &str =
    "https://cdn.jsdelivr.net/gh/joseph-gerald/jklm-py-client@main/answers/popsauce_pairs.txt";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wordlist_url: Option<String>,
    #[serde(default = "default_word_frequency_enabled")]
    pub word_frequency_enabled: bool,
    #[serde(default = "default_alphabet_enabled")]
    pub alphabet_enabled: bool,
    #[serde(default = "default_answers_url")]
    pub answers_url: String,
    /// Exclude our own accepted words.
    #[serde(default = "default_track_words")]
    pub track_my_words: bool,
    /// Exclude words other players got accepted.
    #[serde(default = "default_track_words")]
    pub track_enemy_words: bool,
    #[serde(default)]
    pub auto_typer: AutoTyperSettings,
    #[serde(default)]
    pub answer_typer: AnswerTyperSettings,
    #[serde(default)]
    pub silent_typer: SilentTyperSettings,
}

fn default_word_frequency_enabled() -> bool {
    false
}
fn default_alphabet_enabled() -> bool {
    false
}
fn default_answers_url() -> String {
    DEFAULT_ANSWERS_URL.to_string()
}
fn default_track_words() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTyperSettings {
    pub enabled: bool,
    pub reaction_time_min: u64,
    pub reaction_time_max: u64,
    pub word_length_min: usize,
    pub word_length_max: usize,
    pub wpm_min: u32,
    pub wpm_max: u32,
    pub typo_chance: u32,
    pub typo_fix_delay: u64,
    pub length_bias: LengthBias,
}

impl Default for AutoTyperSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            reaction_time_min: 200,
            reaction_time_max: 500,
            word_length_min: 4,
            word_length_max: 12,
            wpm_min: 60,
            wpm_max: 90,
            typo_chance: 5,
            typo_fix_delay: 300,
            length_bias: LengthBias::None,
        }
    }
}

impl AutoTyperSettings {
    pub fn timing(&self) -> TimingProfile {
        TimingProfile {
            reaction_min_ms: self.reaction_time_min,
            reaction_max_ms: self.reaction_time_max,
            wpm_min: self.wpm_min,
            wpm_max: self.wpm_max,
            typo_chance: self.typo_chance,
            typo_fix_delay_ms: self.typo_fix_delay,
        }
    }

    fn validate(&mut self) {
        self.reaction_time_max = self.reaction_time_max.max(self.reaction_time_min);
        self.word_length_min = self.word_length_min.max(3);
        self.word_length_max = self.word_length_max.max(self.word_length_min);
        self.wpm_min = self.wpm_min.max(1);
        self.wpm_max = self.wpm_max.max(self.wpm_min);
        self.typo_chance = self.typo_chance.min(100);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerTyperSettings {
    pub enabled: bool,
    pub reaction_time_min: u64,
    pub reaction_time_max: u64,
    pub wpm_min: u32,
    pub wpm_max: u32,
    pub typo_chance: u32,
    pub typo_fix_delay: u64,
    pub prefer_shortest: bool,
}

impl Default for AnswerTyperSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            reaction_time_min: 200,
            reaction_time_max: 500,
            wpm_min: 60,
            wpm_max: 90,
            typo_chance: 5,
            typo_fix_delay: 300,
            prefer_shortest: false,
        }
    }
}

impl AnswerTyperSettings {
    pub fn timing(&self) -> TimingProfile {
        TimingProfile {
            reaction_min_ms: self.reaction_time_min,
            reaction_max_ms: self.reaction_time_max,
            wpm_min: self.wpm_min,
            wpm_max: self.wpm_max,
            typo_chance: self.typo_chance,
            typo_fix_delay_ms: self.typo_fix_delay,
        }
    }

    fn validate(&mut self) {
        self.reaction_time_max = self.reaction_time_max.max(self.reaction_time_min);
        self.wpm_min = self.wpm_min.max(1);
        self.wpm_max = self.wpm_max.max(self.wpm_min);
        self.typo_chance = self.typo_chance.min(100);
    }
}

/// The host types the handed-over word, so only selection is configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilentTyperSettings {
    pub enabled: bool,
    pub word_length_min: usize,
    pub word_length_max: usize,
    pub prefer_shortest: bool,
}

impl Default for SilentTyperSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            word_length_min: 4,
            word_length_max: 12,
            prefer_shortest: false,
        }
    }
}

impl SilentTyperSettings {
    fn validate(&mut self) {
        self.word_length_min = self.word_length_min.max(3);
        self.word_length_max = self.word_length_max.max(self.word_length_min);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wordlist_url: None,
            word_frequency_enabled: default_word_frequency_enabled(),
            alphabet_enabled: default_alphabet_enabled(),
            answers_url: default_answers_url(),
            track_my_words: default_track_words(),
            track_enemy_words: default_track_words(),
            auto_typer: AutoTyperSettings::default(),
            answer_typer: AnswerTyperSettings::default(),
            silent_typer: SilentTyperSettings::default(),
        }
    }
}

impl Config {
    /// Loads from the default location. A missing file gives defaults; an
    /// unreadable or malformed one is logged and also gives defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match Self::try_load(path) {
            Ok(mut config) => {
                config.validate();
                config
            }
            Err(err) => {
                warn!("ignoring config at {}: {err}", path.display());
                Config::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpilot")
            .join("config.toml")
    }

    /// Clamp ranges so every min is at most its max.
    pub fn validate(&mut self) {
        if self
            .wordlist_url
            .as_deref()
            .is_some_and(|u| u.trim().is_empty())
        {
            self.wordlist_url = None;
        }
        if self.answers_url.trim().is_empty() {
            self.answers_url = default_answers_url();
        }
        self.auto_typer.validate();
        self.answer_typer.validate();
        self.silent_typer.validate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.wordlist_url, None);
        assert!(!config.word_frequency_enabled);
        assert_eq!(config.auto_typer, AutoTyperSettings::default());
        assert_eq!(config.answer_typer, AnswerTyperSettings::default());
        assert_eq!(config.answers_url, DEFAULT_ANSWERS_URL);
        assert_eq!(config.silent_typer, SilentTyperSettings::default());
        assert!(config.track_my_words && config.track_enemy_words);
    }

    #[test]
    fn test_partial_feature_settings_merge_over_defaults() {
        let toml_str = r#"
word_frequency_enabled = true

[auto_typer]
enabled = true
wpm_min = 100
length_bias = "shortest"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.word_frequency_enabled);
        assert!(config.auto_typer.enabled);
        assert_eq!(config.auto_typer.wpm_min, 100);
        assert_eq!(config.auto_typer.wpm_max, 90);
        assert_eq!(config.auto_typer.length_bias, LengthBias::Shortest);
        assert_eq!(config.auto_typer.reaction_time_min, 200);
    }

    #[test]
    fn test_validate_clamps_ranges() {
        let mut config = Config::default();
        config.auto_typer.wpm_min = 100;
        config.auto_typer.wpm_max = 20;
        config.auto_typer.word_length_min = 1;
        config.auto_typer.word_length_max = 2;
        config.auto_typer.typo_chance = 250;
        config.answer_typer.reaction_time_min = 900;
        config.answer_typer.reaction_time_max = 100;
        config.wordlist_url = Some("  ".to_string());
        config.validate();

        assert_eq!(config.auto_typer.wpm_max, 100);
        assert_eq!(config.auto_typer.word_length_min, 3);
        assert_eq!(config.auto_typer.word_length_max, 3);
        assert_eq!(config.auto_typer.typo_chance, 100);
        assert_eq!(config.answer_typer.reaction_time_max, 900);
        assert_eq!(config.wordlist_url, None);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "auto_typer = [not valid").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.auto_typer, AutoTyperSettings::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert!(!config.auto_typer.enabled);
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let toml_str = r#"
wordlist_url = "https://example.com/words.txt"
track_enemy_words = false

[answer_typer]
prefer_shortest = true

[silent_typer]
enabled = true
word_length_min = 9
word_length_max = 5
"#;
        fs::write(&path, toml_str).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(
            loaded.wordlist_url.as_deref(),
            Some("https://example.com/words.txt")
        );
        assert!(loaded.answer_typer.prefer_shortest);
        assert!(loaded.track_my_words);
        assert!(!loaded.track_enemy_words);
        assert!(loaded.silent_typer.enabled);
        assert_eq!(loaded.silent_typer.word_length_max, 9);
    }

    #[test]
    fn test_timing_profile_from_settings() {
        let settings = AutoTyperSettings::default();
        let timing = settings.timing();
        assert_eq!(timing.reaction_min_ms, 200);
        assert_eq!(timing.wpm_max, 90);
        assert_eq!(timing.typo_fix_delay_ms, 300);
    }
}

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::event::{AppEvent, Feature, GameEvent, GameType};
use crate::lexicon::LexiconStore;
use crate::picker::WordPicker;
use crate::picker::alphabet::AlphabetTracker;
use crate::session::challenge::AnswerTyper;
use crate::session::silent::SilentTyper;
use crate::session::turn::AutoTyper;
use crate::session::typing::InputSink;
use crate::store::answers::AnswerStore;
use crate::store::json_store::JsonStore;
use crate::store::learned::{LearnedWords, normalize_word};
use crate::store::schema::{EXPORT_VERSION, ExportData};

/// Owns every service and routes game events to them. Everything here runs on
/// the single event-loop thread.
pub struct App {
    pub config: Config,
    pub game: Option<GameType>,
    pub picker: WordPicker,
    pub alphabet: AlphabetTracker,
    pub learned: LearnedWords,
    pub answers: AnswerStore,
    pub auto_typer: AutoTyper,
    pub answer_typer: AnswerTyper,
    pub silent_typer: SilentTyper,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, lexicon: Arc<LexiconStore>, store: Option<JsonStore>) -> Self {
        Self::with_rng(config, lexicon, store, SmallRng::from_entropy())
    }

    pub fn with_rng(
        config: Config,
        lexicon: Arc<LexiconStore>,
        store: Option<JsonStore>,
        mut rng: SmallRng,
    ) -> Self {
        let (answers, learned) = match &store {
            Some(s) => (
                AnswerStore::from_data(s.load_answers()),
                LearnedWords::from_data(s.load_learned_words()),
            ),
            None => (AnswerStore::default(), LearnedWords::default()),
        };
        let stats = answers.stats();
        info!(
            "{} answers, {} aliases, {} learned words",
            stats.total_answers,
            stats.total_aliases,
            learned.total()
        );

        let mut picker = WordPicker::with_rng(
            lexicon,
            config.word_frequency_enabled,
            SmallRng::seed_from_u64(rng.next_u64()),
        );
        let alphabet = AlphabetTracker::new(config.alphabet_enabled);
        picker.set_coverage(alphabet.coverage());

        let auto_typer = AutoTyper::new(
            config.auto_typer.clone(),
            SmallRng::seed_from_u64(rng.next_u64()),
        );
        let answer_typer = AnswerTyper::new(
            config.answer_typer.clone(),
            SmallRng::seed_from_u64(rng.next_u64()),
        );
        let silent_typer = SilentTyper::new(config.silent_typer.clone());

        Self {
            config,
            game: None,
            picker,
            alphabet,
            learned,
            answers,
            auto_typer,
            answer_typer,
            silent_typer,
            store,
            should_quit: false,
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Game(event) => self.handle_event(event, now),
            AppEvent::AnswersFetched(text) => {
                self.merge_remote_answers(&text);
            }
            AppEvent::Closed => {
                info!("event stream closed");
                self.should_quit = true;
            }
        }
    }

    pub fn handle_event(&mut self, event: GameEvent, now: Instant) {
        if let Some(game) = event.implied_game() {
            self.set_game(game);
        }

        match event {
            GameEvent::TurnChanged { my_turn } => {
                self.auto_typer
                    .on_turn_changed(my_turn, &mut self.picker, now);
                self.silent_typer
                    .on_turn_changed(my_turn, &mut self.picker, now);
            }
            GameEvent::SyllableChanged { syllable } => {
                self.auto_typer
                    .on_syllable_changed(&syllable, &mut self.picker, now);
                self.silent_typer
                    .on_syllable_changed(&syllable, &mut self.picker);
            }
            GameEvent::WordAccepted { word, is_self } => self.on_word_accepted(&word, is_self),
            GameEvent::WordRejected { word } => {
                self.auto_typer
                    .on_word_rejected(&word, &mut self.picker, now);
                self.silent_typer.on_word_rejected(&word, &mut self.picker);
                if self.in_game(GameType::BombParty) {
                    self.learned.mark_failed(&word);
                }
            }
            GameEvent::GameEnded => {
                info!("game ended, {} words used", self.picker.exclusion_count());
                self.auto_typer.on_game_ended();
                self.answer_typer.on_challenge_ended();
                self.silent_typer.on_game_ended();
                self.clear_exclusions();
            }
            GameEvent::ExclusionsCleared => {
                info!("clearing {} used words", self.picker.exclusion_count());
                self.clear_exclusions();
            }
            GameEvent::RulesChanged {
                dictionary_id,
                bonus_alphabet,
            } => {
                if let Some(id) = dictionary_id {
                    self.learned.set_dictionary(&id);
                }
                if let Some(bonus) = bonus_alphabet {
                    self.alphabet.apply_rules(&bonus);
                    self.picker.set_coverage(self.alphabet.coverage());
                }
            }
            GameEvent::FeatureToggled { feature, enabled } => {
                self.set_feature(feature, enabled, now)
            }
            GameEvent::GameTypeChanged { game } => self.set_game(game),
            GameEvent::ChallengeStarted { hash } => {
                let mode_ok = self.in_game(GameType::Popsauce);
                self.answer_typer
                    .on_challenge_started(&hash, &self.answers, mode_ok, now);
                self.silent_typer.on_challenge_started(&hash, &self.answers);
            }
            GameEvent::ChallengeEnded => {
                self.answer_typer.on_challenge_ended();
                self.silent_typer.on_challenge_ended();
            }
            GameEvent::AnswerRevealed {
                hash,
                answer,
                alias,
            } => {
                self.answers.add_answer(&hash, &answer);
                if let Some(alias) = alias {
                    self.answers.add_alias(&hash, &alias);
                }
            }
        }
        self.save_data();
    }

    fn clear_exclusions(&mut self) {
        self.picker.reset_exclusions();
        self.alphabet.reset();
        self.picker.set_coverage(self.alphabet.coverage());
    }

    fn on_word_accepted(&mut self, word: &str, is_self: bool) {
        let tracked = if is_self {
            self.config.track_my_words
        } else {
            self.config.track_enemy_words
        };
        if tracked {
            self.picker.exclude(word);
        }

        if is_self && self.alphabet.record_word(word) {
            self.picker.set_coverage(self.alphabet.coverage());
        }

        // Only learn against a loaded list; otherwise every word looks new.
        let lexicon = self.picker.lexicon();
        if self.in_game(GameType::BombParty)
            && self.learned.dictionary().is_some()
            && lexicon.is_loaded()
        {
            let normalized = normalize_word(word);
            if !lexicon.contains(&normalized) {
                self.learned.add_word(&normalized);
            }
        }
    }

    fn set_feature(&mut self, feature: Feature, enabled: bool, now: Instant) {
        debug!("{feature:?} -> {enabled}");
        match feature {
            Feature::AutoTyper => {
                self.config.auto_typer.enabled = enabled;
                self.auto_typer.set_enabled(enabled, now);
            }
            Feature::AnswerTyper => {
                self.config.answer_typer.enabled = enabled;
                self.answer_typer.set_enabled(enabled);
            }
            Feature::SilentTyper => {
                self.config.silent_typer.enabled = enabled;
                self.silent_typer.set_enabled(enabled, now);
            }
            Feature::Alphabet => {
                self.config.alphabet_enabled = enabled;
                self.alphabet.set_enabled(enabled);
                self.picker.set_coverage(self.alphabet.coverage());
            }
            Feature::WordFrequency => {
                self.config.word_frequency_enabled = enabled;
                self.picker.set_frequency_sort(enabled);
            }
        }
    }

    fn set_game(&mut self, game: GameType) {
        if self.game != Some(game) {
            info!("game type: {game:?}");
            self.game = Some(game);
        }
    }

    fn in_game(&self, game: GameType) -> bool {
        self.game == Some(game)
    }

    /// Runs every coordinator step that is due at `now`.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn InputSink) {
        let bomb_party = self.in_game(GameType::BombParty);
        let popsauce = self.in_game(GameType::Popsauce);
        self.auto_typer
            .tick(now, &mut self.picker, sink, bomb_party);
        self.answer_typer.tick(now, sink, popsauce);
        self.silent_typer
            .tick(now, &mut self.picker, sink, self.game);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.auto_typer.next_deadline(),
            self.answer_typer.next_deadline(),
            self.silent_typer.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn answer_sync_due(&self) -> bool {
        self.answers.sync_due(Utc::now())
    }

    pub fn merge_remote_answers(&mut self, text: &str) -> usize {
        let added = self.answers.merge_remote(text);
        self.answers.mark_synced(Utc::now());
        self.save_data();
        added
    }

    /// Persists whatever changed since the last save. Failures are logged.
    pub fn save_data(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if self.answers.take_dirty() {
            if let Err(err) = store.save_answers(self.answers.data()) {
                warn!("failed to save answers: {err:#}");
            }
        }
        if self.learned.take_dirty() {
            if let Err(err) = store.save_learned_words(self.learned.data()) {
                warn!("failed to save learned words: {err:#}");
            }
        }
    }

    pub fn export_data(&self) -> ExportData {
        ExportData {
            wordpilot_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            answers: self.answers.data().clone(),
            learned_words: self.learned.data().clone(),
        }
    }

    /// Merges an export into the live stores. Returns entries added.
    pub fn import_data(&mut self, data: &ExportData) -> usize {
        let added = self.answers.import(&data.answers) + self.learned.import(&data.learned_words);
        info!("imported {added} entries");
        self.save_data();
        added
    }
}

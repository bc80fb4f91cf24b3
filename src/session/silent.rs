//! Silent typing: the host swaps the player's own keystrokes for a word we
//! hand over, so nothing here schedules keystrokes. The coordinator only keeps
//! the hand-off current as turns, syllables, and challenges change.

use std::time::Instant;

use log::{debug, info};

use crate::config::SilentTyperSettings;
use crate::event::GameType;
use crate::picker::{Constraint, WordPicker};
use crate::session::turn::RETRY_INTERVAL;
use crate::session::typing::InputSink;
use crate::store::answers::AnswerStore;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Target {
    text: String,
    game: GameType,
}

pub struct SilentTyper {
    settings: SilentTyperSettings,
    my_turn: bool,
    syllable: Option<String>,
    /// Syllable when the current turn began.
    turn_syllable: Option<String>,
    target: Option<Target>,
    /// What the host was last told to type.
    handed_over: Option<String>,
    next_retry: Option<Instant>,
}

impl SilentTyper {
    pub fn new(settings: SilentTyperSettings) -> Self {
        Self {
            settings,
            my_turn: false,
            syllable: None,
            turn_syllable: None,
            target: None,
            handed_over: None,
            next_retry: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.text.as_str())
    }

    pub fn handed_over(&self) -> Option<&str> {
        self.handed_over.as_deref()
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if self.settings.enabled == enabled {
            return;
        }
        self.settings.enabled = enabled;
        if enabled {
            info!("silent typer enabled");
            if self.my_turn {
                self.next_retry = Some(now);
            }
        } else {
            info!("silent typer disabled");
            self.target = None;
            self.next_retry = None;
        }
    }

    pub fn on_turn_changed(&mut self, my_turn: bool, picker: &mut WordPicker, now: Instant) {
        if my_turn == self.my_turn {
            return;
        }
        self.my_turn = my_turn;

        if my_turn {
            self.turn_syllable = self.syllable.clone();
            if self.settings.enabled {
                self.next_retry = Some(now + RETRY_INTERVAL);
                self.pick_word(picker);
            }
            return;
        }

        // Losing the turn on an unchanged syllable means the word never landed.
        if let Some(word) = self.word_target() {
            if self.syllable == self.turn_syllable {
                debug!("'{word}' did not land, excluding");
                picker.exclude(&word);
            }
        }
        self.drop_word_target();
        self.next_retry = None;
    }

    pub fn on_syllable_changed(&mut self, syllable: &str, picker: &mut WordPicker) {
        let syllable = syllable.trim().to_lowercase();
        let syllable = (!syllable.is_empty()).then_some(syllable);
        if syllable == self.syllable {
            return;
        }
        self.syllable = syllable;
        self.drop_word_target();
        if self.my_turn && self.settings.enabled {
            self.pick_word(picker);
        }
    }

    pub fn on_word_rejected(&mut self, word: &str, picker: &mut WordPicker) {
        if !self.settings.enabled {
            return;
        }
        picker.exclude(word);
        self.drop_word_target();
        if self.my_turn {
            self.pick_word(picker);
        }
    }

    /// A new challenge replaces any earlier answer.
    pub fn on_challenge_started(&mut self, hash: &str, answers: &AnswerStore) {
        self.drop_answer_target();
        if !self.settings.enabled {
            return;
        }
        match answers.get_answer(hash, self.settings.prefer_shortest) {
            Some(answer) => {
                debug!("silent answer '{answer}' for {hash}");
                self.target = Some(Target {
                    text: answer.to_string(),
                    game: GameType::Popsauce,
                });
            }
            None => debug!("no known answer for {hash}"),
        }
    }

    pub fn on_challenge_ended(&mut self) {
        self.drop_answer_target();
    }

    pub fn on_game_ended(&mut self) {
        self.my_turn = false;
        self.syllable = None;
        self.turn_syllable = None;
        self.target = None;
        self.next_retry = None;
    }

    /// Runs the retry poll, then tells the host about any change of target.
    /// A target only counts while `game` matches the mode it was chosen for.
    pub fn tick(
        &mut self,
        now: Instant,
        picker: &mut WordPicker,
        sink: &mut dyn InputSink,
        game: Option<GameType>,
    ) {
        let live = self.my_turn && self.settings.enabled;
        if self.next_retry.is_some_and(|at| now >= at) {
            self.next_retry = live.then(|| now + RETRY_INTERVAL);
            if live && game == Some(GameType::BombParty) && self.word_target().is_none() {
                self.pick_word(picker);
            }
        }

        let enabled = self.settings.enabled;
        let wanted = self
            .target
            .as_ref()
            .filter(|t| enabled && game == Some(t.game))
            .map(|t| t.text.as_str());
        if wanted == self.handed_over.as_deref() {
            return;
        }
        match wanted {
            Some(word) => {
                debug!("intercepting with '{word}'");
                sink.intercept(word);
            }
            None => sink.clear_intercept(),
        }
        self.handed_over = wanted.map(str::to_string);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_retry
    }

    fn pick_word(&mut self, picker: &mut WordPicker) {
        let Some(syllable) = self.syllable.as_deref() else {
            return;
        };
        let constraint = Constraint::new(syllable)
            .lengths(self.settings.word_length_min, self.settings.word_length_max)
            .count(1);
        match picker.pick_best(&constraint) {
            Some(word) => {
                debug!("silent target '{word}'");
                self.target = Some(Target {
                    text: word,
                    game: GameType::BombParty,
                });
            }
            None => debug!("no silent candidate for '{syllable}' yet"),
        }
    }

    fn word_target(&self) -> Option<String> {
        self.target
            .as_ref()
            .filter(|t| t.game == GameType::BombParty)
            .map(|t| t.text.clone())
    }

    fn drop_word_target(&mut self) {
        if self.target.as_ref().is_some_and(|t| t.game == GameType::BombParty) {
            self.target = None;
        }
    }

    fn drop_answer_target(&mut self) {
        if self.target.as_ref().is_some_and(|t| t.game == GameType::Popsauce) {
            self.target = None;
        }
    }
}

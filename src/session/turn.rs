use std::time::{Duration, Instant};

use log::{debug, info};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::AutoTyperSettings;
use crate::picker::{Constraint, WordPicker};
use crate::session::timing::{RECOVERY_REACTION_MS, uniform_ms};
use crate::session::typing::{InputSink, TypingSimulator, TypingStatus};

pub const RETRY_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    /// Our turn, but no word is committed or in flight.
    Awaiting,
    Committed { word: String, fire_at: Instant },
    Typing,
}

/// Drives the auto-typer through a turn: pick a word, wait out a reaction
/// delay, type it, and recover when the game rejects it.
pub struct AutoTyper {
    settings: AutoTyperSettings,
    my_turn: bool,
    syllable: Option<String>,
    /// The word committed, being typed, or submitted and awaiting a verdict.
    current_word: Option<String>,
    phase: TurnPhase,
    next_retry: Option<Instant>,
    simulator: TypingSimulator,
    rng: SmallRng,
}

impl AutoTyper {
    pub fn new(settings: AutoTyperSettings, mut rng: SmallRng) -> Self {
        let simulator = TypingSimulator::new(SmallRng::seed_from_u64(rng.next_u64()));
        Self {
            settings,
            my_turn: false,
            syllable: None,
            current_word: None,
            phase: TurnPhase::Idle,
            next_retry: None,
            simulator,
            rng,
        }
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn is_typing(&self) -> bool {
        self.simulator.is_typing()
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn settings(&self) -> &AutoTyperSettings {
        &self.settings
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if self.settings.enabled == enabled {
            return;
        }
        self.settings.enabled = enabled;
        if enabled {
            info!("auto-typer enabled");
            if self.my_turn {
                self.phase = TurnPhase::Awaiting;
                self.next_retry = Some(now);
            }
        } else {
            info!("auto-typer disabled");
            self.stand_down();
        }
    }

    /// Only the edges matter; a repeated turn start leaves the committed or
    /// in-flight word alone.
    pub fn on_turn_changed(&mut self, my_turn: bool, picker: &mut WordPicker, now: Instant) {
        if my_turn && self.my_turn {
            return;
        }
        self.my_turn = my_turn;
        if !my_turn {
            self.stand_down();
            self.phase = TurnPhase::Idle;
            return;
        }
        if !self.settings.enabled {
            return;
        }
        self.phase = TurnPhase::Awaiting;
        self.next_retry = Some(now + RETRY_INTERVAL);
        if self.syllable.is_some() {
            self.try_commit(picker, now, false);
        }
    }

    pub fn on_syllable_changed(&mut self, syllable: &str, picker: &mut WordPicker, now: Instant) {
        let syllable = syllable.trim().to_lowercase();
        self.syllable = (!syllable.is_empty()).then_some(syllable);
        if self.simulator.is_typing() {
            // The running session finishes or aborts on its own.
            return;
        }
        self.current_word = None;
        if self.my_turn && self.settings.enabled {
            self.phase = TurnPhase::Awaiting;
            if self.syllable.is_some() {
                self.try_commit(picker, now, false);
            }
        }
    }

    /// Excludes the word first, then re-picks on the short recovery window.
    /// Any rejection during our turn drops the active word, since the game
    /// may report it in a different form than it was typed.
    pub fn on_word_rejected(&mut self, word: &str, picker: &mut WordPicker, now: Instant) {
        picker.exclude(word);
        if !self.my_turn && self.current_word.is_none() {
            return;
        }
        debug!("'{word}' rejected, recovering");
        self.current_word = None;
        self.simulator.cancel();
        if self.my_turn && self.settings.enabled {
            self.phase = TurnPhase::Awaiting;
            self.try_commit(picker, now, true);
        } else {
            self.phase = TurnPhase::Idle;
        }
    }

    pub fn on_game_ended(&mut self) {
        self.my_turn = false;
        self.syllable = None;
        self.stand_down();
        self.phase = TurnPhase::Idle;
    }

    /// Runs whatever is due at `now`. `mode_ok` is false when the current game
    /// is not one the auto-typer plays.
    pub fn tick(
        &mut self,
        now: Instant,
        picker: &mut WordPicker,
        sink: &mut dyn InputSink,
        mode_ok: bool,
    ) {
        let live = self.my_turn && self.settings.enabled && mode_ok;

        let mut retry_due = false;
        if self.next_retry.is_some_and(|at| now >= at) {
            self.next_retry = self.my_turn.then(|| now + RETRY_INTERVAL);
            retry_due = true;
        }

        if self.simulator.is_typing() {
            match self.simulator.poll(now, live, sink) {
                TypingStatus::Waiting(_) => {}
                TypingStatus::Submitted => {
                    debug!("submitted {:?}", self.current_word);
                    self.phase = TurnPhase::Awaiting;
                }
                TypingStatus::Aborted | TypingStatus::Idle => {
                    self.current_word = None;
                    self.phase = self.resting_phase();
                }
            }
        }

        if let TurnPhase::Committed { word, fire_at } = &self.phase {
            if now >= *fire_at {
                let word = word.clone();
                let profile = self.settings.timing();
                if live && self.simulator.start(&word, profile, live, sink, now) {
                    self.phase = TurnPhase::Typing;
                } else {
                    debug!("dropping committed '{word}'");
                    self.current_word = None;
                    self.phase = self.resting_phase();
                }
            }
        }

        if retry_due
            && live
            && self.syllable.is_some()
            && self.current_word.is_none()
            && !self.simulator.is_typing()
        {
            self.try_commit(picker, now, false);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let fire = match &self.phase {
            TurnPhase::Committed { fire_at, .. } => Some(*fire_at),
            _ => None,
        };
        [fire, self.simulator.next_deadline(), self.next_retry]
            .into_iter()
            .flatten()
            .min()
    }

    fn try_commit(&mut self, picker: &mut WordPicker, now: Instant, recovering: bool) {
        let Some(syllable) = self.syllable.as_deref() else {
            return;
        };
        let constraint = Constraint {
            length_bias: self.settings.length_bias,
            ..Constraint::new(syllable)
                .lengths(self.settings.word_length_min, self.settings.word_length_max)
                .count(1)
        };
        let Some(word) = picker.pick_best(&constraint) else {
            debug!("no candidate for '{syllable}' yet");
            return;
        };
        let delay = if recovering {
            uniform_ms(&mut self.rng, RECOVERY_REACTION_MS.0, RECOVERY_REACTION_MS.1)
        } else {
            self.settings.timing().reaction_delay(&mut self.rng)
        };
        debug!("committed '{word}' in {}ms", delay.as_millis());
        self.current_word = Some(word.clone());
        self.phase = TurnPhase::Committed {
            word,
            fire_at: now + delay,
        };
    }

    fn resting_phase(&self) -> TurnPhase {
        if self.my_turn {
            TurnPhase::Awaiting
        } else {
            TurnPhase::Idle
        }
    }

    fn stand_down(&mut self) {
        self.simulator.cancel();
        self.current_word = None;
        self.next_retry = None;
        if self.phase != TurnPhase::Idle {
            self.phase = if self.my_turn && self.settings.enabled {
                TurnPhase::Awaiting
            } else {
                TurnPhase::Idle
            };
        }
    }
}

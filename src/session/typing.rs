//! Human-like typing as a deadline-driven state machine.
//!
//! A session never sleeps. Each step returns the instant it next wants to run
//! at, and the owner calls [`TypingSimulator::poll`] once that instant has
//! passed. Liveness is re-checked every time a session resumes after a wait,
//! so a turn ending mid-word aborts before the next keystroke.

use std::time::Instant;

use log::{debug, trace};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::session::timing::{SETTLE_DELAY, TimingProfile};

/// Where synthetic keystrokes go. `push_input` always receives the whole
/// field contents, not a delta.
pub trait InputSink {
    fn is_available(&self) -> bool {
        true
    }
    fn push_input(&mut self, text: &str);
    fn submit(&mut self);
    /// Hands `word` to the host, which types it in place of whatever the
    /// player presses.
    fn intercept(&mut self, word: &str);
    fn clear_intercept(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingStatus {
    Idle,
    Waiting(Instant),
    Submitted,
    Aborted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// Start the character at `index`, possibly with a typo first.
    NextChar,
    /// Remove the injected typo.
    Backspace,
    /// Type the correct character after a corrected typo.
    CorrectChar,
    /// Submit once the settle delay has passed.
    Settle,
}

struct TypingSession {
    target: Vec<char>,
    buffer: String,
    index: usize,
    profile: TimingProfile,
    step: Step,
    wake_at: Instant,
}

enum Progress {
    Continue,
    Submitted,
    Mismatch,
}

impl TypingSession {
    fn is_last(&self) -> bool {
        self.index + 1 >= self.target.len()
    }

    fn advance<R: Rng>(&mut self, rng: &mut R, sink: &mut dyn InputSink, now: Instant) -> Progress {
        match self.step {
            Step::NextChar => {
                if !self.is_last() && self.profile.roll_typo(rng) {
                    let wrong = wrong_letter(rng, self.target[self.index]);
                    self.buffer.push(wrong);
                    sink.push_input(&self.buffer);
                    trace!("typo '{wrong}' at {}", self.index);
                    self.step = Step::Backspace;
                    self.wake_at = now + self.profile.typo_fix_delay();
                } else {
                    self.type_correct(rng, sink, now);
                }
                Progress::Continue
            }
            Step::Backspace => {
                self.buffer.pop();
                sink.push_input(&self.buffer);
                self.step = Step::CorrectChar;
                self.wake_at = now + self.profile.char_delay(rng) / 2;
                Progress::Continue
            }
            Step::CorrectChar => {
                self.type_correct(rng, sink, now);
                Progress::Continue
            }
            Step::Settle => {
                let target: String = self.target.iter().collect();
                if self.buffer == target {
                    sink.submit();
                    Progress::Submitted
                } else {
                    Progress::Mismatch
                }
            }
        }
    }

    fn type_correct<R: Rng>(&mut self, rng: &mut R, sink: &mut dyn InputSink, now: Instant) {
        self.buffer.push(self.target[self.index]);
        sink.push_input(&self.buffer);
        self.index += 1;
        if self.index < self.target.len() {
            self.step = Step::NextChar;
            self.wake_at = now + self.profile.jittered_char_delay(rng);
        } else {
            self.step = Step::Settle;
            self.wake_at = now + SETTLE_DELAY;
        }
    }
}

/// A random lowercase letter different from `correct`.
fn wrong_letter<R: Rng>(rng: &mut R, correct: char) -> char {
    loop {
        let ch = (b'a' + rng.gen_range(0..26u8)) as char;
        if ch != correct.to_ascii_lowercase() {
            return ch;
        }
    }
}

pub struct TypingSimulator {
    session: Option<TypingSession>,
    rng: SmallRng,
}

impl TypingSimulator {
    pub fn new(rng: SmallRng) -> Self {
        Self { session: None, rng }
    }

    pub fn is_typing(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.target.iter().collect())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().map(|s| s.wake_at)
    }

    /// Starts typing `word`. Refuses, returning false, while another session
    /// runs, when `active` is false, or when the sink cannot take input.
    /// The first keystroke happens immediately.
    pub fn start(
        &mut self,
        word: &str,
        profile: TimingProfile,
        active: bool,
        sink: &mut dyn InputSink,
        now: Instant,
    ) -> bool {
        if self.session.is_some() {
            debug!("already typing, ignoring '{word}'");
            return false;
        }
        if !active || !sink.is_available() || word.is_empty() {
            return false;
        }
        debug!("typing '{word}'");
        self.session = Some(TypingSession {
            target: word.chars().collect(),
            buffer: String::new(),
            index: 0,
            profile,
            step: Step::NextChar,
            wake_at: now,
        });
        self.poll(now, active, sink);
        true
    }

    /// Runs every step that is due at `now`.
    pub fn poll(&mut self, now: Instant, active: bool, sink: &mut dyn InputSink) -> TypingStatus {
        loop {
            let Some(session) = self.session.as_mut() else {
                return TypingStatus::Idle;
            };
            if now < session.wake_at {
                return TypingStatus::Waiting(session.wake_at);
            }
            if !active {
                debug!("typing aborted after {} chars", session.buffer.chars().count());
                self.session = None;
                return TypingStatus::Aborted;
            }
            match session.advance(&mut self.rng, sink, now) {
                Progress::Continue => {}
                Progress::Submitted => {
                    self.session = None;
                    return TypingStatus::Submitted;
                }
                Progress::Mismatch => {
                    self.session = None;
                    return TypingStatus::Aborted;
                }
            }
        }
    }

    /// Drops the running session without submitting. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }
}

impl Default for TypingSimulator {
    fn default() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

use std::time::Instant;

use log::{debug, info};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::AnswerTyperSettings;
use crate::session::typing::{InputSink, TypingSimulator, TypingStatus};
use crate::store::answers::AnswerStore;

struct PendingAnswer {
    answer: String,
    fire_at: Instant,
}

/// Types known answers into trivia challenges.
pub struct AnswerTyper {
    settings: AnswerTyperSettings,
    challenge: Option<String>,
    pending: Option<PendingAnswer>,
    simulator: TypingSimulator,
    rng: SmallRng,
}

impl AnswerTyper {
    pub fn new(settings: AnswerTyperSettings, mut rng: SmallRng) -> Self {
        let simulator = TypingSimulator::new(SmallRng::seed_from_u64(rng.next_u64()));
        Self {
            settings,
            challenge: None,
            pending: None,
            simulator,
            rng,
        }
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.enabled != enabled {
            info!(
                "answer typer {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.settings.enabled = enabled;
        if !enabled {
            self.pending = None;
            self.simulator.cancel();
        }
    }

    pub fn challenge(&self) -> Option<&str> {
        self.challenge.as_deref()
    }

    pub fn pending_answer(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.answer.as_str())
    }

    pub fn is_typing(&self) -> bool {
        self.simulator.is_typing()
    }

    /// A new challenge replaces whatever was pending or in flight.
    pub fn on_challenge_started(
        &mut self,
        hash: &str,
        answers: &AnswerStore,
        mode_ok: bool,
        now: Instant,
    ) {
        self.pending = None;
        self.simulator.cancel();
        self.challenge = Some(hash.to_string());

        if !self.settings.enabled || !mode_ok {
            return;
        }
        let Some(answer) = answers.get_answer(hash, self.settings.prefer_shortest) else {
            debug!("no known answer for {hash}");
            return;
        };
        let delay = self.settings.timing().reaction_delay(&mut self.rng);
        debug!("answering '{answer}' in {}ms", delay.as_millis());
        self.pending = Some(PendingAnswer {
            answer: answer.to_string(),
            fire_at: now + delay,
        });
    }

    pub fn on_challenge_ended(&mut self) {
        self.challenge = None;
        self.pending = None;
        self.simulator.cancel();
    }

    pub fn tick(&mut self, now: Instant, sink: &mut dyn InputSink, mode_ok: bool) {
        let live = self.challenge.is_some() && self.settings.enabled && mode_ok;

        if self.simulator.is_typing() {
            if let TypingStatus::Submitted = self.simulator.poll(now, live, sink) {
                debug!("answer submitted");
            }
            return;
        }

        if self.pending.as_ref().is_some_and(|p| now >= p.fire_at) {
            if let Some(pending) = self.pending.take() {
                let profile = self.settings.timing();
                if !self.simulator.start(&pending.answer, profile, live, sink, now) {
                    debug!("skipped answer '{}'", pending.answer);
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.simulator
            .next_deadline()
            .or_else(|| self.pending.as_ref().map(|p| p.fire_at))
    }
}

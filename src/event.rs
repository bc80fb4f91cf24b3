use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    BombParty,
    Popsauce,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    AutoTyper,
    AnswerTyper,
    SilentTyper,
    Alphabet,
    WordFrequency,
}

/// Notifications from the game host, one JSON object per line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    TurnChanged {
        my_turn: bool,
    },
    SyllableChanged {
        syllable: String,
    },
    WordAccepted {
        word: String,
        #[serde(default)]
        is_self: bool,
    },
    WordRejected {
        word: String,
    },
    GameEnded,
    /// Used words and the alphabet quota start over without the game ending.
    ExclusionsCleared,
    RulesChanged {
        #[serde(default)]
        dictionary_id: Option<String>,
        /// Absent leaves the quota alone; an empty map resets it.
        #[serde(default)]
        bonus_alphabet: Option<BTreeMap<char, u32>>,
    },
    FeatureToggled {
        feature: Feature,
        enabled: bool,
    },
    GameTypeChanged {
        game: GameType,
    },
    ChallengeStarted {
        hash: String,
    },
    ChallengeEnded,
    AnswerRevealed {
        hash: String,
        answer: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl GameEvent {
    /// The game mode an event implies, if any.
    pub fn implied_game(&self) -> Option<GameType> {
        match self {
            GameEvent::SyllableChanged { .. } => Some(GameType::BombParty),
            GameEvent::ChallengeStarted { .. } | GameEvent::AnswerRevealed { .. } => {
                Some(GameType::Popsauce)
            }
            _ => None,
        }
    }
}

pub enum AppEvent {
    Game(GameEvent),
    /// Body of the remote answer list.
    AnswersFetched(String),
    /// The event stream hit end of input.
    Closed,
}

pub fn parse_line(line: &str) -> Option<GameEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!("skipping malformed event: {err}");
            None
        }
    }
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    /// Reads events from `reader` on a background thread.
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("event stream read failed: {err}");
                        break;
                    }
                };
                if let Some(event) = parse_line(&line) {
                    debug!("event {event:?}");
                    if reader_tx.send(AppEvent::Game(event)).is_err() {
                        return;
                    }
                }
            }
            let _ = reader_tx.send(AppEvent::Closed);
        });

        Self { rx, tx }
    }

    /// Handle for background workers to post results.
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    /// Waits at most `timeout` for the next event; `None` waits indefinitely.
    pub fn next(&self, timeout: Option<Duration>) -> anyhow::Result<Option<AppEvent>> {
        match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(event) => Ok(Some(event)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(anyhow::anyhow!("event channel closed")),
            },
            None => Ok(Some(self.rx.recv()?)),
        }
    }
}

use std::io::Write;

use log::error;
use serde::Serialize;

use crate::session::typing::InputSink;

/// One instruction for the game host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    Input { text: String },
    Submit,
    Intercept { word: String },
    ClearIntercept,
}

/// Writes actions as JSON lines. A failed write marks the sink unavailable so
/// no new typing session starts against a dead pipe.
pub struct JsonLineSink<W: Write> {
    out: W,
    broken: bool,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, broken: false }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, action: &Action) {
        if self.broken {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, action)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            error!("action output failed: {err}");
            self.broken = true;
        }
    }
}

impl<W: Write> InputSink for JsonLineSink<W> {
    fn is_available(&self) -> bool {
        !self.broken
    }

    fn push_input(&mut self, text: &str) {
        self.emit(&Action::Input {
            text: text.to_string(),
        });
    }

    fn submit(&mut self) {
        self.emit(&Action::Submit);
    }

    fn intercept(&mut self, word: &str) {
        self.emit(&Action::Intercept {
            word: word.to_string(),
        });
    }

    fn clear_intercept(&mut self) {
        self.emit(&Action::ClearIntercept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_are_json_lines() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.push_input("ca");
        sink.submit();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"action\":\"input\",\"text\":\"ca\"}\n{\"action\":\"submit\"}\n"
        );
    }

    #[test]
    fn test_intercept_actions() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.intercept("catalog");
        sink.clear_intercept();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"action\":\"intercept\",\"word\":\"catalog\"}\n{\"action\":\"clear-intercept\"}\n"
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_marks_unavailable() {
        let mut sink = JsonLineSink::new(FailingWriter);
        assert!(sink.is_available());
        sink.push_input("c");
        assert!(!sink.is_available());
    }
}

//! Word picking and human-like typing for syllable word games.
//!
//! The binary in `main.rs` wires these modules to stdin/stdout; the library
//! target also serves the integration tests and benchmarks.

pub mod app;
pub mod config;
pub mod event;
pub mod lexicon;
pub mod picker;
pub mod session;
pub mod sink;
pub mod store;

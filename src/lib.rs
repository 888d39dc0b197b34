// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod language;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod typing;
pub mod ui;
pub mod word_generator;

pub use app::{Action, App, AppState};

/// Length of one timed test in seconds
pub const TEST_DURATION_SECS: u32 = 60;
/// Words drawn for each test
pub const SEQUENCE_LENGTH: usize = 200;
/// Words rendered at once around the current word
pub const VISIBLE_WINDOW: usize = 15;
/// Event loop poll interval; the countdown is checked at this cadence
pub const POLL_INTERVAL_MS: u64 = 100;

use crate::{SEQUENCE_LENGTH, TEST_DURATION_SECS, VISIBLE_WINDOW};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub duration_secs: u32,
    pub sequence_len: usize,
    /// Rendering hint only; the session never enforces it
    pub visible_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: TEST_DURATION_SECS,
            sequence_len: SEQUENCE_LENGTH,
            visible_window: VISIBLE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Ordered words drawn for one test; replaced wholesale on every start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSequence(Vec<String>);

impl TestSequence {
    pub fn new(words: Vec<String>) -> Self {
        Self(words)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Word at `idx`, or the empty string past the end
    pub fn word(&self, idx: usize) -> &str {
        self.0.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    /// Index range of at most `size` words that keeps `current` in view.
    ///
    /// The window starts at `current` and slides back only when the end of
    /// the sequence would otherwise leave it short.
    pub fn window(&self, current: usize, size: usize) -> Range<usize> {
        window_range(self.0.len(), current, size)
    }
}

/// Visible index range over a sequence of `len` words
pub fn window_range(len: usize, current: usize, size: usize) -> Range<usize> {
    let end = current.saturating_add(size).min(len);
    let start = end.saturating_sub(size).min(current.min(len));
    start..end
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub sequence: TestSequence,
    pub current_index: usize,
    pub time_left: u32,
    pub cumulative_errors: usize,
    pub committed_words: usize,
    pub committed_chars: usize,
    pub live_buffer: String,
    pub phase: Phase,
    pub timer_armed: bool,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sequence: TestSequence::default(),
            current_index: 0,
            time_left: config.duration_secs,
            cumulative_errors: 0,
            committed_words: 0,
            committed_chars: 0,
            live_buffer: String::new(),
            phase: Phase::Idle,
            timer_armed: false,
        }
    }

    pub fn current_word(&self) -> &str {
        self.sequence.word(self.current_index)
    }

    /// Seconds elapsed since the countdown was armed
    pub fn elapsed_secs(&self, config: &SessionConfig) -> u32 {
        config.duration_secs.saturating_sub(self.time_left)
    }
}

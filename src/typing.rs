use crate::{
    metrics::{self, Metrics},
    scoring::{self, CharMark, WordScore},
    session::{Phase, SessionConfig, SessionState},
    word_generator::WordSource,
};
use tracing::{debug, info};

/// Key that commits the current word
pub const DELIMITER: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Delimiter,
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        if c == DELIMITER {
            KeyInput::Delimiter
        } else {
            KeyInput::Char(c)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FinalResults {
    pub metrics: Metrics,
    pub elapsed_secs: u32,
    pub committed_words: usize,
    pub committed_chars: usize,
    pub cumulative_errors: usize,
}

/// What a single event did to the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    Started,
    /// Live buffer changed; `armed_now` is set on the keystroke that armed the countdown
    Edited { armed_now: bool },
    Committed {
        score: WordScore,
        live: Metrics,
        armed_now: bool,
    },
    Ticked { time_left: u32 },
    Finished(FinalResults),
}

impl Transition {
    pub fn armed_now(&self) -> bool {
        matches!(
            self,
            Transition::Edited { armed_now: true } | Transition::Committed { armed_now: true, .. }
        )
    }
}

/// Read-only view handed to the renderer after every mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub words: &'a [String],
    pub current_index: usize,
    pub live_buffer: &'a str,
    pub mask: Vec<CharMark>,
    pub time_left: u32,
    pub live_wpm: u32,
    pub errors: usize,
    pub phase: Phase,
}

impl Snapshot<'_> {
    /// Current target word, empty once the sequence is exhausted
    pub fn current_word(&self) -> &str {
        self.words
            .get(self.current_index)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The typing-session state machine: Idle -> Running -> Finished
#[derive(Debug)]
pub struct TypingTest {
    config: SessionConfig,
    source: WordSource,
    state: SessionState,
    live: Metrics,
    results: Option<FinalResults>,
}

impl TypingTest {
    pub fn new(config: SessionConfig, source: WordSource) -> Self {
        Self {
            state: SessionState::new(&config),
            config,
            source,
            live: Metrics::default(),
            results: None,
        }
    }

    /// Reset every counter and draw a fresh sequence
    pub fn start(&mut self) -> Transition {
        let mut state = SessionState::new(&self.config);
        state.sequence = self.source.next_sequence();
        state.phase = Phase::Running;
        self.state = state;
        self.live = Metrics::default();
        self.results = None;

        info!(
            words = self.state.sequence.len(),
            duration_secs = self.config.duration_secs,
            "test started"
        );
        Transition::Started
    }

    /// Restart mid-test or after finishing; nothing carries over
    pub fn refresh(&mut self) -> Transition {
        debug!(time_left = self.state.time_left, phase = %self.state.phase, "refresh");
        self.start()
    }

    pub fn on_key(&mut self, key: KeyInput) -> Transition {
        if self.state.phase != Phase::Running {
            return Transition::Ignored;
        }

        let armed_now = !self.state.timer_armed;
        self.state.timer_armed = true;

        match key {
            KeyInput::Char(DELIMITER) | KeyInput::Delimiter => self.commit(armed_now),
            KeyInput::Char(c) => {
                self.state.live_buffer.push(c);
                Transition::Edited { armed_now }
            }
            KeyInput::Backspace => {
                self.state.live_buffer.pop();
                Transition::Edited { armed_now }
            }
        }
    }

    fn commit(&mut self, armed_now: bool) -> Transition {
        let score = scoring::score_word(&self.state.live_buffer, self.state.current_word());

        let state = &mut self.state;
        state.cumulative_errors += score.errors;
        state.committed_words += 1;
        state.committed_chars += score.typed_chars;
        // past the last word every commit scores against an empty target
        state.current_index = (state.current_index + 1).min(state.sequence.len());
        state.live_buffer.clear();

        self.live = metrics::compute(
            state.committed_chars,
            state.cumulative_errors,
            state.elapsed_secs(&self.config),
        );

        debug!(
            index = state.current_index,
            word_errors = score.errors,
            errors = state.cumulative_errors,
            wpm = self.live.net_wpm,
            "word committed"
        );

        Transition::Committed {
            score,
            live: self.live,
            armed_now,
        }
    }

    /// One-second countdown step; a no-op unless running and armed
    pub fn tick(&mut self) -> Transition {
        if self.state.phase != Phase::Running || !self.state.timer_armed {
            return Transition::Ignored;
        }

        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            return Transition::Finished(self.finish());
        }

        Transition::Ticked {
            time_left: self.state.time_left,
        }
    }

    fn finish(&mut self) -> FinalResults {
        self.state.phase = Phase::Finished;

        let elapsed_secs = self.state.elapsed_secs(&self.config);
        let results = FinalResults {
            metrics: metrics::compute(
                self.state.committed_chars,
                self.state.cumulative_errors,
                elapsed_secs,
            ),
            elapsed_secs,
            committed_words: self.state.committed_words,
            committed_chars: self.state.committed_chars,
            cumulative_errors: self.state.cumulative_errors,
        };
        self.results = Some(results);

        info!(
            wpm = results.metrics.net_wpm,
            accuracy = results.metrics.accuracy,
            errors = results.cumulative_errors,
            words = results.committed_words,
            "test finished"
        );
        results
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        Snapshot {
            words: state.sequence.words(),
            current_index: state.current_index,
            live_buffer: &state.live_buffer,
            mask: scoring::live_mask(&state.live_buffer, state.current_word()),
            time_left: state.time_left,
            live_wpm: self.live.net_wpm,
            errors: state.cumulative_errors,
            phase: state.phase,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn live_metrics(&self) -> Metrics {
        self.live
    }

    pub fn results(&self) -> Option<&FinalResults> {
        self.results.as_ref()
    }
}

/// Characters per word in the standard wpm convention
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub correct_chars: usize,
    pub net_wpm: u32,
    /// Percentage, 0..=100
    pub accuracy: u32,
}

pub fn correct_chars(committed_chars: usize, cumulative_errors: usize) -> usize {
    committed_chars.saturating_sub(cumulative_errors)
}

/// Elapsed time in minutes, floored at one second so t=0 stays finite
pub fn minutes(elapsed_secs: u32) -> f64 {
    if elapsed_secs == 0 {
        1.0 / 60.0
    } else {
        elapsed_secs as f64 / 60.0
    }
}

/// Net words per minute from correct characters only
pub fn net_wpm(correct_chars: usize, elapsed_secs: u32) -> u32 {
    let wpm = (correct_chars as f64 / CHARS_PER_WORD) / minutes(elapsed_secs);
    wpm.round().max(0.0) as u32
}

pub fn accuracy(correct_chars: usize, committed_chars: usize) -> u32 {
    if committed_chars == 0 {
        return 0;
    }
    ((correct_chars as f64 / committed_chars as f64) * 100.0).round() as u32
}

pub fn compute(committed_chars: usize, cumulative_errors: usize, elapsed_secs: u32) -> Metrics {
    let correct = correct_chars(committed_chars, cumulative_errors);
    Metrics {
        correct_chars: correct,
        net_wpm: net_wpm(correct, elapsed_secs),
        accuracy: accuracy(correct, committed_chars),
    }
}

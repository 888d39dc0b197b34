use itertools::{EitherOrBoth, Itertools};

/// Live correctness of one typed character against the current word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharMark {
    Correct,
    Incorrect,
    /// Typed past the end of the target word; an incorrect position the
    /// renderer can draw as overflow
    Extra,
}

impl CharMark {
    /// Binary live feedback: anything but `Correct` is incorrect
    pub fn is_correct(self) -> bool {
        self == CharMark::Correct
    }
}

/// Per-character mask for the in-progress word, one entry per typed char
pub fn live_mask(typed: &str, target: &str) -> Vec<CharMark> {
    typed
        .chars()
        .zip_longest(target.chars())
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(t, c) if t == c => Some(CharMark::Correct),
            EitherOrBoth::Both(_, _) => Some(CharMark::Incorrect),
            EitherOrBoth::Left(_) => Some(CharMark::Extra),
            EitherOrBoth::Right(_) => None,
        })
        .collect()
}

/// Mismatches between a committed word and its target.
///
/// Every position in `[0, max(len(typed), len(target)))` that is missing
/// from either side or differs counts as one error.
pub fn word_errors(typed: &str, target: &str) -> usize {
    typed
        .chars()
        .zip_longest(target.chars())
        .filter(|pair| !matches!(pair, EitherOrBoth::Both(t, c) if t == c))
        .count()
}

/// Text that gets scored when the delimiter is pressed
pub fn committed_text(live_buffer: &str) -> &str {
    live_buffer.trim_end()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordScore {
    pub errors: usize,
    pub typed_chars: usize,
}

pub fn score_word(live_buffer: &str, target: &str) -> WordScore {
    let typed = committed_text(live_buffer);
    WordScore {
        errors: word_errors(typed, target),
        typed_chars: typed.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharMark::*;

    #[test]
    fn test_transposed_letters() {
        assert_eq!(word_errors("teh", "the"), 2);
        assert_eq!(
            score_word("teh", "the"),
            WordScore {
                errors: 2,
                typed_chars: 3
            }
        );
    }

    #[test]
    fn test_empty_commit_penalises_every_target_char() {
        assert_eq!(
            score_word("", "cat"),
            WordScore {
                errors: 3,
                typed_chars: 0
            }
        );
    }

    #[test]
    fn test_exact_match_has_no_errors() {
        assert_eq!(word_errors("people", "people"), 0);
    }

    #[test]
    fn test_overlong_and_short_words() {
        assert_eq!(word_errors("thee", "the"), 1);
        assert_eq!(word_errors("th", "the"), 1);
        assert_eq!(word_errors("xyz", ""), 3);
        assert_eq!(word_errors("", ""), 0);
    }

    #[test]
    fn test_errors_bounded_by_longer_word() {
        for (typed, target) in [("abc", "xyzuvw"), ("longerword", "a"), ("q", "q")] {
            let max_len = typed.len().max(target.len());
            assert!(word_errors(typed, target) <= max_len);
        }
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        assert_eq!(committed_text("the  "), "the");
        assert_eq!(score_word("the\t", "the").errors, 0);
        assert_eq!(score_word("the\t", "the").typed_chars, 3);
    }

    #[test]
    fn test_live_mask_marks_each_typed_char() {
        assert!(live_mask("", "the").is_empty());
        assert_eq!(live_mask("t", "the"), vec![Correct]);
        assert_eq!(live_mask("tx", "the"), vec![Correct, Incorrect]);
        assert_eq!(live_mask("thee", "the"), vec![Correct, Correct, Correct, Extra]);
        assert_eq!(live_mask("ab", ""), vec![Extra, Extra]);
    }

    #[test]
    fn test_overflow_counts_as_incorrect() {
        let mask = live_mask("thee", "the");
        assert_eq!(mask.iter().filter(|m| !m.is_correct()).count(), 1);
        assert!(!Extra.is_correct());
        assert!(!Incorrect.is_correct());
        assert!(Correct.is_correct());
    }

    #[test]
    fn test_live_mask_counts_chars_not_bytes() {
        assert_eq!(live_mask("é", "e"), vec![Incorrect]);
        assert_eq!(score_word("café", "cafe").typed_chars, 4);
    }
}

pub mod leaderboard;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    scoring::CharMark,
    session::window_range,
    typing::Snapshot,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Spans for the visible word window with live colouring on the current word
pub fn word_spans(snapshot: &Snapshot<'_>, window: usize) -> Vec<Span<'static>> {
    let green = bold().fg(Color::Green);
    let red = bold().fg(Color::Red);
    let pending = dim_bold().add_modifier(Modifier::UNDERLINED);

    let mut spans = Vec::new();
    for idx in window_range(snapshot.words.len(), snapshot.current_index, window) {
        let word = &snapshot.words[idx];
        if idx < snapshot.current_index {
            spans.push(Span::styled(word.clone(), Style::default().fg(Color::DarkGray)));
        } else if idx == snapshot.current_index {
            for (pos, expected) in word.chars().enumerate() {
                let style = match snapshot.mask.get(pos) {
                    Some(mark) if mark.is_correct() => green,
                    Some(_) => red,
                    None => pending,
                };
                spans.push(Span::styled(expected.to_string(), style));
            }
            // overflow typed past the end of the word
            let overflow: String = snapshot
                .live_buffer
                .chars()
                .zip(snapshot.mask.iter())
                .filter(|(_, mark)| **mark == CharMark::Extra)
                .map(|(c, _)| c)
                .collect();
            if !overflow.is_empty() {
                spans.push(Span::styled(overflow, red.add_modifier(Modifier::CROSSED_OUT)));
            }
        } else {
            spans.push(Span::styled(word.clone(), bold()));
        }
        spans.push(Span::raw(" "));
    }
    spans
}

fn render_idle(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "typesprint",
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(user_line(app), italic()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter) start / (l)eaderboard / (o) logout / (esc)ape",
        italic(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

/// Greeting for the current profile
pub fn user_line(app: &App) -> String {
    if !app.has_backend() {
        return app.report_status.describe();
    }
    match &app.profile {
        Some(profile) if profile.logged_in => format!(
            "Welcome, {}! (Highest WPM: {})",
            profile.username.as_deref().unwrap_or("player"),
            profile.highest_wpm.unwrap_or(0)
        ),
        _ => "Login to save scores.".to_string(),
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let snapshot = app.test.snapshot();
    let window = app.test.config().visible_window;

    let spans = word_spans(&snapshot, window);
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let text_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let prompt_lines = ((text_width as f64 / max_chars_per_line as f64).ceil() as u16).max(1) + 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(prompt_lines + 4) / 2),
            Constraint::Length(2),
            Constraint::Length(prompt_lines),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{}s   {} wpm   {} errors",
            snapshot.time_left, snapshot.live_wpm, snapshot.errors
        ),
        dim_bold(),
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines <= 2 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_bold()),
        Span::styled(snapshot.live_buffer.to_string(), bold()),
        Span::styled("_", dim_bold()),
    ]))
    .alignment(Alignment::Center);
    input.render(chunks[3], buf);

    let hint = if app.ticker.is_armed() {
        "(space) next word / (tab) refresh / (esc)ape"
    } else {
        "timer starts on your first key / (tab) refresh / (esc)ape"
    };
    Paragraph::new(Span::styled(hint, italic())).render(chunks[5], buf);
}

/// Summary lines for the results screen
pub fn summary_lines(app: &App) -> Vec<String> {
    let Some(results) = app.test.results() else {
        return vec![];
    };
    vec![
        format!("time             {}s", results.elapsed_secs),
        format!("words            {}", results.committed_words),
        format!("characters       {}", results.committed_chars),
        format!("correct chars    {}", results.metrics.correct_chars),
        format!("errors           {}", results.cumulative_errors),
        format!("net wpm          {}", results.metrics.net_wpm),
    ]
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(results) = app.test.results() else {
        return;
    };
    let summary = summary_lines(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(summary.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {} errors   {}% acc",
            results.metrics.net_wpm, results.cumulative_errors, results.metrics.accuracy
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let summary_text: Vec<Line> = summary
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Gray))))
        .collect();
    Paragraph::new(summary_text)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        app.report_status.describe(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(enter) start again / (l)eaderboard / (esc)ape",
        italic(),
    ))
    .render(chunks[8], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Idle => render_idle(self, area, buf),
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::Leaderboard => leaderboard::render(self, area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{LocalBackend, ScoreBackend},
        language::Language,
        session::SessionConfig,
        typing::{KeyInput, TypingTest},
        word_generator::WordSource,
    };
    use std::sync::Arc;

    fn create_test_app(words: &[&str], backend: Option<Arc<dyn ScoreBackend>>) -> App {
        let corpus = Language::from_words("t", words.iter().copied());
        let config = SessionConfig {
            sequence_len: 30,
            ..SessionConfig::default()
        };
        App::new(TypingTest::new(config, WordSource::seeded(corpus, 30, 5)), backend)
    }

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect::<String>()
    }

    #[test]
    fn test_idle_screen_shows_legend() {
        let app = create_test_app(&["the"], None);
        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains("typesprint"));
        assert!(text.contains("scores are not saved"));
    }

    #[test]
    fn test_idle_screen_greets_profile() {
        let local: Arc<dyn ScoreBackend> = Arc::new(LocalBackend::in_memory("ada").unwrap());
        let mut app = create_test_app(&["the"], Some(local));
        app.load_profile();
        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains("Welcome, ada! (Highest WPM: 0)"));
    }

    #[test]
    fn test_typing_screen_shows_words_and_timer() {
        let mut app = create_test_app(&["people"], None);
        app.start();
        let text = rendered(&app, Rect::new(0, 0, 120, 24));
        assert!(text.contains("people"));
        assert!(text.contains("60s"));
    }

    #[test]
    fn test_word_spans_colour_current_word() {
        let mut app = create_test_app(&["the"], None);
        app.start();
        app.test.on_key(KeyInput::Char('t'));
        app.test.on_key(KeyInput::Char('x'));

        let snapshot = app.test.snapshot();
        let spans = word_spans(&snapshot, 15);

        assert_eq!(spans[0].content, "t");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].content, "h");
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert_eq!(spans[2].content, "e");
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_word_spans_show_overflow() {
        let mut app = create_test_app(&["go"], None);
        app.start();
        for c in "gone".chars() {
            app.test.on_key(KeyInput::Char(c));
        }

        let snapshot = app.test.snapshot();
        let spans = word_spans(&snapshot, 15);
        assert_eq!(spans[2].content, "ne");
    }

    #[test]
    fn test_word_spans_window_size() {
        let mut app = create_test_app(&["a"], None);
        app.start();
        let snapshot = app.test.snapshot();
        // one span per char of the current word plus a separator per word
        let words = word_spans(&snapshot, 15)
            .iter()
            .filter(|s| s.content == " ")
            .count();
        assert_eq!(words, 15);
    }

    #[test]
    fn test_word_spans_past_the_end() {
        let corpus = Language::from_words("t", ["ab"]);
        let config = SessionConfig {
            sequence_len: 1,
            ..SessionConfig::default()
        };
        let mut app = App::new(TypingTest::new(config, WordSource::seeded(corpus, 1, 0)), None);
        app.start();
        for c in "ab xy".chars() {
            app.test.on_key(KeyInput::from(c));
        }

        let snapshot = app.test.snapshot();
        let spans = word_spans(&snapshot, 15);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "ab");

        // rendering past the last word must not panic
        rendered(&app, Rect::new(0, 0, 80, 24));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let mut app = create_test_app(&["hello"], None);
        app.start();
        let area = Rect::new(0, 0, 12, 4);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 2);
    }
}

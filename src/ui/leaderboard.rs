use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::{app::App, backend::LeaderboardEntry};

/// Pure presenter for one leaderboard row; `me` is the logged-in username
pub fn present_row(rank: usize, entry: &LeaderboardEntry, me: Option<&str>) -> Row<'static> {
    let rank_color = match rank {
        1 => Color::Yellow,
        2 => Color::White,
        3 => Color::LightRed,
        _ => Color::Gray,
    };

    let name_style = if me == Some(entry.username.as_str()) {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(format!("{rank}.")).style(Style::default().fg(rank_color)),
        Cell::from(entry.username.clone()).style(name_style),
        Cell::from(entry.highest_wpm.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
    ])
}

/// Render the leaderboard screen
pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Legend
        ])
        .split(area);

    Paragraph::new("Leaderboard")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let view = &app.leaderboard;
    if let Some(error) = &view.error {
        Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else if view.entries.is_empty() {
        Paragraph::new("No scores yet. Finish a test to get on the board.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else {
        let me = app
            .profile
            .as_ref()
            .filter(|p| p.logged_in)
            .and_then(|p| p.username.as_deref());

        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from("Username"),
            Cell::from("Highest WPM"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = view
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| present_row(idx + 1, entry, me))
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(12),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Top 10"))
        .column_spacing(2)
        .render(chunks[1], buf);
    }

    Paragraph::new("(b)ack / (esc) back")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

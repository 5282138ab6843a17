//! Leaderboards: top damage, longest battles and player standings.

use client_frontend_core::{format, view_model::LeaderboardView};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, boards: &LeaderboardView, theme: &RatatuiTheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let damage = boards
        .damage
        .iter()
        .enumerate()
        .map(|(i, entry)| format::damage_row(i + 1, entry))
        .collect();
    let rounds = boards
        .rounds
        .iter()
        .enumerate()
        .map(|(i, entry)| format::rounds_row(i + 1, entry))
        .collect();
    let players = boards
        .players
        .iter()
        .enumerate()
        .map(|(i, standing)| format::player_row(i + 1, standing))
        .collect();

    render_board(frame, rows[0], " Top Damage ", damage, boards.loaded, theme);
    render_board(frame, rows[1], " Longest Battles ", rounds, boards.loaded, theme);
    render_board(frame, rows[2], " Players ", players, boards.loaded, theme);
}

fn render_board(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<String>,
    loaded: bool,
    theme: &RatatuiTheme,
) {
    let lines: Vec<Line> = if !loaded {
        vec![Line::from(Span::styled("Loading... (r to refresh)", theme.muted()))]
    } else if rows.is_empty() {
        vec![Line::from(Span::styled("No entries", theme.muted()))]
    } else {
        rows.into_iter().map(Line::from).collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

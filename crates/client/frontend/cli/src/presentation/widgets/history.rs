//! Recent battles with an optional replay of the selected one.

use client_frontend_core::{format, view_model::HistoryView};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, history: &HistoryView, theme: &RatatuiTheme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let items: Vec<ListItem> = history
        .recent
        .iter()
        .map(|game| ListItem::new(format::game_row(game)))
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Recent Battles ");
    if items.is_empty() {
        let empty = Paragraph::new(Span::styled("No finished battles yet", theme.muted()))
            .block(block);
        frame.render_widget(empty, columns[0]);
    } else {
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.accent().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(history.selected));
        frame.render_stateful_widget(list, columns[0], &mut state);
    }

    render_replay(frame, columns[1], history, theme);
}

fn render_replay(frame: &mut Frame, area: Rect, history: &HistoryView, theme: &RatatuiTheme) {
    let (title, lines) = match &history.replay {
        Some(replay) => {
            let mut lines = vec![Line::from(Span::styled(
                format!(
                    "{} vs Dragon King, {} rounds, winner: {}",
                    replay.game.player_name,
                    replay.game.total_rounds,
                    format::winner_label(replay.game.winner)
                ),
                theme.accent(),
            ))];
            lines.extend(
                replay
                    .events
                    .iter()
                    .map(|event| Line::from(format::replay_line(event))),
            );
            (format!(" Replay {} ", replay.game.game_id), lines)
        }
        None => (
            " Replay ".to_string(),
            vec![Line::from(Span::styled(
                "Press Enter to load the selected battle",
                theme.muted(),
            ))],
        ),
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

//! Header widget displaying battle identity and connection health.

use client_frontend_core::view_model::{ConnectionView, ViewModel};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::{presentation::theme::RatatuiTheme, state::Tab};

/// Render the header panel with battle info and connection state.
pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let mut spans = match &view_model.battle {
        Some(battle) => vec![
            Span::raw("Battle "),
            Span::styled(battle.game_id.to_string(), theme.accent()),
            Span::raw(" | "),
            Span::styled(
                battle.player_name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" | {} | Round ", battle.difficulty)),
            Span::styled(battle.round.to_string(), theme.accent()),
            Span::raw(" | "),
            Span::styled(
                if battle.auto_mode { "AUTO" } else { "MANUAL" },
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        ],
        None => vec![Span::styled("No active battle", theme.muted())],
    };

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        view_model.connection.label(),
        connection_style(&view_model.connection),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Dragon Duel "));

    frame.render_widget(paragraph, area);
}

pub fn render_tabs(frame: &mut Frame, area: Rect, selected: Tab, theme: &RatatuiTheme) {
    let titles: Vec<_> = Tab::ALL.iter().map(|tab| tab.title()).collect();
    let tabs = Tabs::new(titles)
        .select(selected.index())
        .style(theme.muted())
        .highlight_style(theme.accent().add_modifier(Modifier::BOLD))
        .divider("|");

    frame.render_widget(tabs, area);
}

fn connection_style(connection: &ConnectionView) -> Style {
    let color = match connection {
        ConnectionView::Online => Color::Green,
        ConnectionView::Connecting | ConnectionView::Reconnecting { .. } => Color::Yellow,
        ConnectionView::Polling => Color::LightRed,
    };
    Style::default().fg(color)
}

//! One-line key hints for the active tab.

use client_bootstrap::DisplayMode;
use client_frontend_core::view_model::ViewModel;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    presentation::theme::RatatuiTheme,
    state::{AppState, Tab},
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    app_state: &AppState,
    view_model: &ViewModel,
    theme: &RatatuiTheme,
) {
    let mut hints: Vec<(&str, &str)> = match app_state.tab {
        Tab::Battle if view_model.battle_ended() => vec![("n", "new"), ("c", "close")],
        Tab::Battle if view_model.has_battle() => {
            vec![("1-3", "skill"), ("t", "auto"), ("c", "close")]
        }
        Tab::Battle => vec![("n", "new battle")],
        Tab::Stats | Tab::Leaderboard => vec![("r", "refresh")],
        Tab::History => vec![("j/k", "select"), ("Enter", "replay")],
    };
    hints.extend([("Tab", "panel"), ("?", "help"), ("q", "quit")]);

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(key, theme.accent()));
        spans.push(Span::raw(format!(" {label}  ")));
    }

    let display = match app_state.display_mode {
        DisplayMode::Detailed => "detailed",
        DisplayMode::Compact => "compact",
    };
    let sound = if app_state.sound_enabled { "on" } else { "off" };
    spans.push(Span::styled(
        format!("[{display} | sound {sound}]"),
        theme.muted(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

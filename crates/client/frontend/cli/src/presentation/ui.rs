//! UI rendering using the widget architecture with ViewModel.
//!
//! This module provides the main render entry point that composes all widgets
//! to create the complete terminal UI.
use anyhow::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::{
    presentation::{terminal::Tui, theme::RatatuiTheme, widgets},
    state::{AppMode, AppState, Tab},
};
use client_bootstrap::DisplayMode;
use client_frontend_core::{message::MessageLog, view_model::ViewModel};

/// Rendering context containing all state and configuration needed for UI rendering.
pub struct RenderContext<'a> {
    pub view_model: &'a ViewModel,
    pub messages: &'a MessageLog,
    pub app_state: &'a AppState,
    pub message_panel_height: u16,
}

/// Render the terminal UI using ViewModel and widget system.
///
/// - The start screen replaces the whole frame.
/// - Otherwise the tabbed main view is drawn, with the help overlay and the
///   active notice on top.
pub fn render_with_view_model(terminal: &mut Tui, ctx: &RenderContext) -> Result<()> {
    let theme = RatatuiTheme::new();

    terminal.draw(|frame| {
        if let AppMode::StartScreen(form) = &ctx.app_state.mode {
            widgets::start_screen::render(frame, frame.area(), form, &theme);
        } else {
            render_main(frame, ctx, &theme);
            if ctx.app_state.show_help {
                widgets::help::render(frame, centered_rect(60, 70, frame.area()), &theme);
            }
        }

        if let Some(active) = &ctx.view_model.notice {
            widgets::notice::render(frame, frame.area(), &active.notice, &theme);
        }
    })?;

    Ok(())
}

fn render_main(frame: &mut Frame, ctx: &RenderContext, theme: &RatatuiTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Tabs
            Constraint::Min(0),    // Active tab
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    widgets::header::render(frame, chunks[0], ctx.view_model, theme);
    widgets::header::render_tabs(frame, chunks[1], ctx.app_state.tab, theme);

    match ctx.app_state.tab {
        Tab::Battle => render_battle_tab(frame, chunks[2], ctx, theme),
        Tab::Stats => widgets::stats::render(frame, chunks[2], ctx.view_model, theme),
        Tab::History => widgets::history::render(frame, chunks[2], &ctx.view_model.history, theme),
        Tab::Leaderboard => {
            widgets::leaderboard::render(frame, chunks[2], &ctx.view_model.leaderboards, theme)
        }
    }

    widgets::footer::render(frame, chunks[3], ctx.app_state, ctx.view_model, theme);
}

fn render_battle_tab(frame: &mut Frame, area: Rect, ctx: &RenderContext, theme: &RatatuiTheme) {
    let message_height = match ctx.app_state.display_mode {
        DisplayMode::Detailed => ctx.message_panel_height,
        DisplayMode::Compact => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                 // Arena
            Constraint::Length(3),              // Skills
            Constraint::Length(message_height), // Messages
        ])
        .split(area);

    widgets::arena::render(frame, chunks[0], ctx.view_model, theme);
    widgets::skills::render(frame, chunks[1], ctx.view_model, theme);

    if message_height > 0 {
        let visible = usize::from(message_height.saturating_sub(2));
        let recent: Vec<_> = ctx.messages.recent(visible).cloned().collect();
        widgets::messages::render(frame, chunks[2], &recent, theme);
    }
}

/// Create a centered rectangle for modal overlays.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

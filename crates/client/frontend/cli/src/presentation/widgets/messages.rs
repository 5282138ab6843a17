//! Battle log panel.

use client_frontend_core::{message::MessageEntry, view_model::PresentationMapper};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

/// Render `entries` (newest first) with the newest line at the bottom.
pub fn render(frame: &mut Frame, area: Rect, entries: &[MessageEntry], theme: &RatatuiTheme) {
    let lines: Vec<Line> = entries
        .iter()
        .rev()
        .map(|entry| {
            let prefix = entry
                .round
                .map_or_else(String::new, |round| format!("[R{round}] "));
            Line::from(vec![
                Span::styled(prefix, theme.muted()),
                Span::styled(entry.text.clone(), theme.style_message(entry.level)),
            ])
        })
        .collect();

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Messages "));
    frame.render_widget(paragraph, area);
}

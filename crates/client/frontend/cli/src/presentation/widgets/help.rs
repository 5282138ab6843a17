//! Key binding overlay.

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

const BINDINGS: &[(&str, &str)] = &[
    ("1 / 2 / 3", "Sword Strike / Potion / Fire Magic"),
    ("t", "Toggle auto battle"),
    ("n", "New battle"),
    ("c", "Close the current battle"),
    ("Tab / Shift+Tab", "Switch panel"),
    ("j / k, ↑ / ↓", "Select battle in history"),
    ("Enter", "Load replay of the selected battle"),
    ("r", "Refresh statistics and leaderboards"),
    ("d", "Toggle compact display"),
    ("s", "Toggle sound"),
    ("?", "Show this help"),
    ("q", "Quit"),
];

pub fn render(frame: &mut Frame, area: Rect, theme: &RatatuiTheme) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Skills unlock once the current round has finished playing.",
            theme.muted(),
        )),
        Line::from(""),
    ];
    lines.extend(BINDINGS.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("{keys:<18}"), theme.accent().add_modifier(Modifier::BOLD)),
            Span::raw(*action),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press any key to close", theme.muted())));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help ")),
        area,
    );
}

//! Skill bar: one button per hero skill, greyed out while the gate is closed.

use battle_protocol::SkillId;
use client_frontend_core::{
    format,
    view_model::{PresentationMapper, ViewModel},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::Span,
    widgets::{Block, Borders, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let controls = &view_model.controls;
    let title = if controls.auto_mode {
        " Skills (auto) "
    } else if controls.locked {
        " Skills (waiting) "
    } else {
        " Skills "
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(inner);

    for (skill, column) in SkillId::ALL.iter().zip(columns.iter()) {
        let enabled = view_model.has_battle() && controls.is_enabled(*skill);
        let mut style = theme.style_skill(enabled);
        if !controls.cooldowns.is_ready(*skill) {
            style = style.add_modifier(Modifier::ITALIC);
        }
        let caption = format::skill_caption(*skill, controls.cooldowns.remaining(*skill));
        frame.render_widget(Paragraph::new(Span::styled(caption, style)), *column);
    }
}

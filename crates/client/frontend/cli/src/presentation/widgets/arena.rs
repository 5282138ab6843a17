//! Battle arena: both fighters, their HP bars and the per-step markers.

use battle_protocol::{EffectKind, Side};
use client_frontend_core::view_model::{BattleView, FighterView, PresentationMapper, ViewModel};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let Some(battle) = &view_model.battle else {
        let idle = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No battle in progress", theme.muted())),
            Line::from(Span::styled("Press n to start a new battle", theme.accent())),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Arena "));
        frame.render_widget(idle, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_fighter(frame, columns[0], battle, &battle.dragon, theme);
    render_fighter(frame, columns[1], battle, &battle.person, theme);
    render_status(frame, rows[1], battle, theme);
}

fn render_fighter(
    frame: &mut Frame,
    area: Rect,
    battle: &BattleView,
    fighter: &FighterView,
    theme: &RatatuiTheme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.style_fighter(fighter.side, fighter.acting))
        .title(format!(" {} ", fighter.side.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Name / acting marker
            Constraint::Length(1), // HP bar
            Constraint::Length(1), // Hit marker
            Constraint::Min(0),    // Floating numbers
        ])
        .split(inner);

    let mut name = vec![Span::styled(
        fighter_name(battle, fighter.side),
        theme.style_fighter(fighter.side, false).add_modifier(Modifier::BOLD),
    )];
    if fighter.acting {
        name.push(Span::styled("  acting", theme.accent()));
    }
    frame.render_widget(Paragraph::new(Line::from(name)), rows[0]);

    let max = fighter.bar_max();
    let label = match fighter.max_hp {
        Some(max_hp) => format!("{}/{}", fighter.hp, max_hp),
        None => format!("{} HP", fighter.hp),
    };
    let gauge = Gauge::default()
        .gauge_style(theme.style_health(fighter.hp, max))
        .ratio(fighter.hp_ratio().clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, rows[1]);

    if let Some(kind) = fighter.hit {
        let text = match (kind, fighter.critical) {
            (EffectKind::Damage, true) => "CRITICAL HIT!",
            (EffectKind::Damage, false) => "hit",
            (EffectKind::Heal, _) => "healed",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, theme.style_effect(kind, fighter.critical))),
            rows[2],
        );
    }

    let floating: Vec<Line> = battle
        .floating_for(fighter.side)
        .map(|text| {
            Line::from(Span::styled(
                text.text.clone(),
                theme.style_effect(text.kind, fighter.critical),
            ))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(floating).alignment(Alignment::Center),
        rows[3],
    );
}

fn fighter_name(battle: &BattleView, side: Side) -> String {
    match side {
        Side::Dragon => side.title().to_string(),
        Side::Person => battle.player_name.clone(),
    }
}

fn render_status(frame: &mut Frame, area: Rect, battle: &BattleView, theme: &RatatuiTheme) {
    let line = match (&battle.status, battle.ended) {
        (Some(status), true) => Line::from(vec![
            Span::styled(status.clone(), theme.accent().add_modifier(Modifier::BOLD)),
            Span::styled("  (n: new battle, c: close)", theme.muted()),
        ]),
        (Some(status), false) => Line::from(Span::styled(status.clone(), theme.accent())),
        (None, true) => Line::from(Span::styled("Battle over", theme.muted())),
        (None, false) => Line::from(Span::styled("Choose a skill", theme.muted())),
    };

    let paragraph = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

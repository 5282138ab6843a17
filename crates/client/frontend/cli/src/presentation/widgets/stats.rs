//! Aggregate statistics tab: overview, per-side totals and achievements.

use battle_protocol::Side;
use client_frontend_core::{Achievement, format, view_model::ViewModel};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Min(0),
        ])
        .split(area);

    render_overview(frame, rows[0], view_model, theme);
    render_characters(frame, rows[1], view_model, theme);
    render_achievements(frame, rows[2], view_model, theme);
}

fn render_overview(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let lines = match &view_model.stats.overview {
        Some(stats) => vec![
            Line::from(format!("Battles fought: {}", stats.total_games)),
            Line::from(vec![
                Span::styled("Dragon King ", theme.style_fighter_name(Side::Dragon)),
                Span::raw(format!(
                    "{} wins ({})",
                    stats.dragon_wins,
                    format::win_rate(stats.dragon_win_rate)
                )),
            ]),
            Line::from(vec![
                Span::styled("Hero        ", theme.style_fighter_name(Side::Person)),
                Span::raw(format!(
                    "{} wins ({})",
                    stats.person_wins,
                    format::win_rate(stats.person_win_rate)
                )),
            ]),
            Line::from(format!("Draws: {}", stats.draws)),
            Line::from(format!("Average rounds: {:.1}", stats.avg_rounds)),
        ],
        None => vec![Line::from(Span::styled("Loading statistics...", theme.muted()))],
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Overview ")),
        area,
    );
}

fn render_characters(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (side, column) in [Side::Dragon, Side::Person].into_iter().zip(columns.iter()) {
        let lines = match &view_model.stats.characters {
            Some(characters) => {
                let stats = characters.side(side);
                vec![
                    Line::from(format!("Total damage:  {}", stats.total_damage)),
                    Line::from(format!("Total healing: {}", stats.total_healing)),
                    Line::from(format!("Critical hits: {}", stats.total_crits)),
                    Line::from(format!("Avg damage:    {:.1}", stats.avg_damage)),
                    Line::from(format!("Avg healing:   {:.1}", stats.avg_healing)),
                ]
            }
            None => vec![Line::from(Span::styled("-", theme.muted()))],
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.style_fighter_name(side))
            .title(format!(" {} ", side.title()));
        frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_achievements(
    frame: &mut Frame,
    area: Rect,
    view_model: &ViewModel,
    theme: &RatatuiTheme,
) {
    let lines: Vec<Line> = Achievement::ALL
        .iter()
        .map(|achievement| {
            let unlocked = view_model.achievements.is_unlocked(*achievement);
            let (mark, style) = if unlocked {
                ("[x] ", theme.accent().add_modifier(Modifier::BOLD))
            } else {
                ("[ ] ", theme.muted())
            };
            Line::from(vec![
                Span::styled(mark, style),
                Span::styled(achievement.title(), style),
                Span::styled(format!("  {}", achievement.description()), theme.muted()),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Achievements ")),
        area,
    );
}

//! Start screen widget: player name, difficulty and battle mode.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    presentation::theme::RatatuiTheme,
    state::{StartField, StartScreenState},
};

/// Renders the battle setup form.
pub fn render(frame: &mut Frame, area: Rect, state: &StartScreenState, theme: &RatatuiTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Title banner
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_title(frame, chunks[0]);
    render_form(frame, chunks[1], state, theme);
    render_footer(frame, chunks[2], theme);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "DRAGON DUEL",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![Span::styled(
            "The Hero challenges the Dragon King",
            Style::default().fg(Color::Gray),
        )]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightRed)),
    );

    frame.render_widget(title, area);
}

fn render_form(frame: &mut Frame, area: Rect, state: &StartScreenState, theme: &RatatuiTheme) {
    let name = if state.name.is_empty() && state.focus != StartField::Name {
        "Anonymous".to_string()
    } else if state.focus == StartField::Name {
        format!("{}_", state.name)
    } else {
        state.name.clone()
    };
    let mode = if state.auto_mode { "Auto" } else { "Manual" };

    let lines = vec![
        Line::from(""),
        field_line("Name", &name, state.focus == StartField::Name, theme),
        field_line(
            "Difficulty",
            &format!("< {} >", state.difficulty),
            state.focus == StartField::Difficulty,
            theme,
        ),
        field_line(
            "Mode",
            &format!("< {mode} >"),
            state.focus == StartField::Mode,
            theme,
        ),
        Line::from(""),
        start_button(state.focus == StartField::Start, theme),
    ];

    let form = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" New Battle ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(form, area);
}

fn field_line(label: &str, value: &str, focused: bool, theme: &RatatuiTheme) -> Line<'static> {
    let marker = if focused { "► " } else { "  " };
    let value_style = if focused {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(marker, theme.accent()),
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::Cyan)),
        Span::styled(value.to_string(), value_style),
    ])
}

fn start_button(focused: bool, theme: &RatatuiTheme) -> Line<'static> {
    let style = if focused {
        theme.accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        theme.accent()
    };
    Line::from(Span::styled("[ Start Battle ]", style))
}

fn render_footer(frame: &mut Frame, area: Rect, theme: &RatatuiTheme) {
    let key = theme.accent();
    let text = Style::default().fg(Color::Gray);
    let footer = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Tab/↑/↓", key),
            Span::styled(" Field  ", text),
            Span::styled("←/→/Space", key),
            Span::styled(" Change  ", text),
            Span::styled("Enter", key),
            Span::styled(" Start  ", text),
            Span::styled("Esc", key),
            Span::styled(" Quit", text),
        ]),
    ])
    .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

//! Ratatui theme implementation of PresentationMapper.
//!
//! This module provides concrete styling for the terminal UI, implementing
//! the framework-agnostic PresentationMapper trait from client-frontend-core.

use battle_protocol::{EffectKind, Side};
use client_frontend_core::{message::MessageLevel, view_model::PresentationMapper};
use ratatui::style::{Color, Modifier, Style};
use runtime::NoticeLevel;

/// Ratatui-specific theme implementing PresentationMapper.
#[derive(Clone, Copy, Debug, Default)]
pub struct RatatuiTheme;

impl RatatuiTheme {
    pub fn new() -> Self {
        Self
    }

    pub fn side_color(&self, side: Side) -> Color {
        match side {
            Side::Dragon => Color::LightRed,
            Side::Person => Color::LightCyan,
        }
    }

    pub fn style_fighter_name(&self, side: Side) -> Style {
        Style::default().fg(self.side_color(side))
    }

    pub fn style_notice(&self, level: NoticeLevel) -> Style {
        let color = match level {
            NoticeLevel::Info => Color::Cyan,
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Warning => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }
}

impl PresentationMapper for RatatuiTheme {
    type Style = Style;

    fn style_fighter(&self, side: Side, acting: bool) -> Self::Style {
        let style = Style::default().fg(self.side_color(side));
        if acting {
            style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            style
        }
    }

    fn style_health(&self, current: u32, maximum: u32) -> Self::Style {
        if maximum == 0 {
            return Style::default().fg(Color::Gray);
        }

        let percent = (u64::from(current) * 100) / u64::from(maximum);
        let color = match percent {
            50.. => Color::Green,
            25..=49 => Color::Yellow,
            _ => Color::Red,
        };

        Style::default().fg(color)
    }

    fn style_effect(&self, kind: EffectKind, critical: bool) -> Self::Style {
        let style = match kind {
            EffectKind::Damage => Style::default().fg(Color::Red),
            EffectKind::Heal => Style::default().fg(Color::Green),
        };
        if critical {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    fn style_skill(&self, enabled: bool) -> Self::Style {
        if enabled {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            self.muted()
        }
    }

    fn style_message(&self, level: MessageLevel) -> Self::Style {
        match level {
            MessageLevel::Info => Style::default().fg(Color::White),
            MessageLevel::Success => Style::default().fg(Color::Green),
            MessageLevel::Warning => Style::default().fg(Color::Yellow),
            MessageLevel::Error => Style::default().fg(Color::LightRed),
        }
    }
}

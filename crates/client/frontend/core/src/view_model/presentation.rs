//! Framework-agnostic presentation mapping traits.
//!
//! Each frontend (TUI, GUI, Web) implements [`PresentationMapper`] with its
//! own styling system while sharing the same view model logic.

use battle_protocol::{EffectKind, Side};

use crate::message::MessageLevel;

/// Framework-agnostic presentation mapper for battle elements.
pub trait PresentationMapper {
    /// Style type for this frontend (e.g., `ratatui::style::Style`).
    type Style: Clone;

    /// Base style of a fighter's name and panel border.
    fn style_fighter(&self, side: Side, acting: bool) -> Self::Style;

    /// Style for an HP bar at `current` out of `maximum`.
    fn style_health(&self, current: u32, maximum: u32) -> Self::Style;

    /// Style for floating damage/heal numbers.
    fn style_effect(&self, kind: EffectKind, critical: bool) -> Self::Style;

    /// Style for a skill button.
    fn style_skill(&self, enabled: bool) -> Self::Style;

    fn style_message(&self, level: MessageLevel) -> Self::Style;
}

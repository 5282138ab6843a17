//! Battle arena view: both fighters, transient markers and status text.
use std::time::Instant;

use battle_protocol::{Difficulty, EffectKind, GameId, Side, Winner};

#[derive(Clone, Debug)]
pub struct BattleView {
    pub game_id: GameId,
    pub player_name: String,
    pub difficulty: Difficulty,
    pub auto_mode: bool,
    pub round: u32,
    pub dragon: FighterView,
    pub person: FighterView,
    /// "-N"/"+N" markers still on screen.
    pub floating: Vec<FloatingText>,
    /// Transient status line ("Hero is acting…").
    pub status: Option<String>,
    pub winner: Option<Winner>,
    /// The final round arrived; the view is torn down after a delay.
    pub ended: bool,
}

impl BattleView {
    pub fn new(
        game_id: GameId,
        player_name: impl Into<String>,
        difficulty: Difficulty,
        auto_mode: bool,
        round: u32,
    ) -> Self {
        Self {
            game_id,
            player_name: player_name.into(),
            difficulty,
            auto_mode,
            round,
            dragon: FighterView::new(Side::Dragon),
            person: FighterView::new(Side::Person),
            floating: Vec::new(),
            status: None,
            winner: None,
            ended: false,
        }
    }

    pub fn fighter(&self, side: Side) -> &FighterView {
        match side {
            Side::Dragon => &self.dragon,
            Side::Person => &self.person,
        }
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut FighterView {
        match side {
            Side::Dragon => &mut self.dragon,
            Side::Person => &mut self.person,
        }
    }

    /// Drops per-step markers (acting, hit, critical) on both fighters.
    pub fn clear_markers(&mut self) {
        self.dragon.clear_markers();
        self.person.clear_markers();
    }

    pub fn floating_for(&self, side: Side) -> impl Iterator<Item = &FloatingText> {
        self.floating.iter().filter(move |text| text.target == side)
    }
}

#[derive(Clone, Debug)]
pub struct FighterView {
    pub side: Side,
    pub hp: u32,
    /// Maximum HP as reported by the backend.
    pub max_hp: Option<u32>,
    /// Highest HP seen this battle; stands in for `max_hp` when unknown.
    pub peak_hp: u32,
    pub acting: bool,
    /// Effect that just landed on this fighter.
    pub hit: Option<EffectKind>,
    pub critical: bool,
}

impl FighterView {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            hp: 0,
            max_hp: None,
            peak_hp: 0,
            acting: false,
            hit: None,
            critical: false,
        }
    }

    pub fn set_hp(&mut self, hp: u32, max_hp: Option<u32>) {
        self.hp = hp;
        if max_hp.is_some() {
            self.max_hp = max_hp;
        }
        self.peak_hp = self.peak_hp.max(hp);
    }

    /// Denominator for HP bars.
    pub fn bar_max(&self) -> u32 {
        self.max_hp.unwrap_or(self.peak_hp).max(self.hp).max(1)
    }

    /// HP as a fraction in `0.0..=1.0`.
    pub fn hp_ratio(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.bar_max())
    }

    pub fn clear_markers(&mut self) {
        self.acting = false;
        self.hit = None;
        self.critical = false;
    }
}

#[derive(Clone, Debug)]
pub struct FloatingText {
    pub target: Side,
    pub kind: EffectKind,
    pub text: String,
    pub expires_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_uses_peak_until_max_is_known() {
        let mut fighter = FighterView::new(Side::Dragon);
        fighter.set_hp(20, None);
        fighter.set_hp(5, None);
        assert_eq!(fighter.bar_max(), 20);
        assert!((fighter.hp_ratio() - 0.25).abs() < f64::EPSILON);

        fighter.set_hp(5, Some(40));
        assert_eq!(fighter.bar_max(), 40);
    }

    #[test]
    fn empty_fighter_does_not_divide_by_zero() {
        let fighter = FighterView::new(Side::Person);
        assert_eq!(fighter.hp_ratio(), 0.0);
    }
}

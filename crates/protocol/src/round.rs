//! Per-round snapshot pushed by the backend after it resolves a round.
//!
//! [`RoundResult`] is the authoritative state the client converges to; its
//! [`TurnEvent`]s are the ordered sub-effects the client animates on the way
//! there. The JSON shape nests HP under `dragon`/`person` objects, so the
//! flattened Rust type converts through a private wire snapshot.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{GameId, Side, SkillId, Winner};

/// Kind of atomic effect resolved during a round.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
}

/// One atomic effect resolved by the backend.
///
/// Order within [`RoundResult::events`] is authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub target: Side,
    pub value: u32,
    #[serde(rename = "is_crit", default)]
    pub is_critical: bool,
}

impl TurnEvent {
    pub const fn damage(target: Side, value: u32, is_critical: bool) -> Self {
        Self {
            kind: EffectKind::Damage,
            target,
            value,
            is_critical,
        }
    }

    pub const fn heal(target: Side, value: u32) -> Self {
        Self {
            kind: EffectKind::Heal,
            target,
            value,
            is_critical: false,
        }
    }

    /// Side credited with the event: always the one facing the target.
    #[inline]
    pub const fn actor(&self) -> Side {
        self.target.opposite()
    }

    /// Applies the event to a running HP total.
    ///
    /// Damage saturates at zero; healing is capped at `max_hp` when known.
    pub fn apply_to(&self, hp: u32, max_hp: Option<u32>) -> u32 {
        match self.kind {
            EffectKind::Damage => hp.saturating_sub(self.value),
            EffectKind::Heal => {
                let healed = hp.saturating_add(self.value);
                max_hp.map_or(healed, |max| healed.min(max))
            }
        }
    }
}

/// Remaining cooldown (in rounds) per hero skill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cooldowns(BTreeMap<SkillId, u32>);

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining rounds for `skill`; unknown skills are ready.
    pub fn remaining(&self, skill: SkillId) -> u32 {
        self.0.get(&skill).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, skill: SkillId) -> bool {
        self.remaining(skill) == 0
    }

    pub fn set(&mut self, skill: SkillId, rounds: u32) {
        self.0.insert(skill, rounds);
    }

    pub fn with(mut self, skill: SkillId, rounds: u32) -> Self {
        self.set(skill, rounds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillId, u32)> + '_ {
        self.0.iter().map(|(skill, rounds)| (*skill, *rounds))
    }
}

impl FromIterator<(SkillId, u32)> for Cooldowns {
    fn from_iter<I: IntoIterator<Item = (SkillId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Authoritative state after one resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoundSnapshot", into = "RoundSnapshot")]
pub struct RoundResult {
    pub game_id: Option<GameId>,
    pub round: u32,
    pub dragon_hp: u32,
    pub person_hp: u32,
    pub dragon_max_hp: Option<u32>,
    pub person_max_hp: Option<u32>,
    pub cooldowns: Cooldowns,
    pub events: Vec<TurnEvent>,
    pub game_over: bool,
    pub winner: Option<Winner>,
}

impl RoundResult {
    /// Snapshot with no events, no cooldowns and the battle still running.
    pub fn new(round: u32, dragon_hp: u32, person_hp: u32) -> Self {
        Self {
            game_id: None,
            round: round.max(1),
            dragon_hp,
            person_hp,
            dragon_max_hp: None,
            person_max_hp: None,
            cooldowns: Cooldowns::default(),
            events: Vec::new(),
            game_over: false,
            winner: None,
        }
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = TurnEvent>) -> Self {
        self.events = events.into_iter().collect();
        self
    }

    pub fn with_cooldowns(mut self, cooldowns: Cooldowns) -> Self {
        self.cooldowns = cooldowns;
        self
    }

    pub fn with_max_hp(mut self, dragon: u32, person: u32) -> Self {
        self.dragon_max_hp = Some(dragon);
        self.person_max_hp = Some(person);
        self
    }

    pub fn with_game_id(mut self, game_id: GameId) -> Self {
        self.game_id = Some(game_id);
        self
    }

    /// Marks the snapshot as the final one of the battle.
    pub fn finished(mut self, winner: Winner) -> Self {
        self.game_over = true;
        self.winner = Some(winner);
        self
    }

    pub fn hp(&self, side: Side) -> u32 {
        match side {
            Side::Dragon => self.dragon_hp,
            Side::Person => self.person_hp,
        }
    }

    pub fn max_hp(&self, side: Side) -> Option<u32> {
        match side {
            Side::Dragon => self.dragon_max_hp,
            Side::Person => self.person_max_hp,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("round number must start at 1")]
    ZeroRound,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RoundSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    game_id: Option<GameId>,
    round: u32,
    #[serde(default)]
    winner: Option<Winner>,
    #[serde(default)]
    game_over: bool,
    dragon: FighterSnapshot,
    person: FighterSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    turn_events: Vec<TurnEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FighterSnapshot {
    hp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Cooldowns::is_empty")]
    cooldowns: Cooldowns,
}

fn clamp_hp(raw: i64) -> u32 {
    raw.clamp(0, i64::from(u32::MAX)) as u32
}

impl TryFrom<RoundSnapshot> for RoundResult {
    type Error = SnapshotError;

    fn try_from(snapshot: RoundSnapshot) -> Result<Self, Self::Error> {
        if snapshot.round == 0 {
            return Err(SnapshotError::ZeroRound);
        }

        Ok(Self {
            game_id: snapshot.game_id,
            round: snapshot.round,
            dragon_hp: clamp_hp(snapshot.dragon.hp),
            person_hp: clamp_hp(snapshot.person.hp),
            dragon_max_hp: snapshot.dragon.max_hp,
            person_max_hp: snapshot.person.max_hp,
            // Only the hero's skills are player-facing.
            cooldowns: snapshot.person.cooldowns,
            events: snapshot.turn_events,
            game_over: snapshot.game_over,
            winner: snapshot.winner,
        })
    }
}

impl From<RoundResult> for RoundSnapshot {
    fn from(result: RoundResult) -> Self {
        Self {
            game_id: result.game_id,
            round: result.round,
            winner: result.winner,
            game_over: result.game_over,
            dragon: FighterSnapshot {
                hp: i64::from(result.dragon_hp),
                max_hp: result.dragon_max_hp,
                cooldowns: Cooldowns::default(),
            },
            person: FighterSnapshot {
                hp: i64::from(result.person_hp),
                max_hp: result.person_max_hp,
                cooldowns: result.cooldowns,
            },
            turn_events: result.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_saturates_and_heal_caps() {
        let hit = TurnEvent::damage(Side::Dragon, 9, false);
        assert_eq!(hit.apply_to(5, None), 0);

        let heal = TurnEvent::heal(Side::Person, 6);
        assert_eq!(heal.apply_to(17, Some(20)), 20);
        assert_eq!(heal.apply_to(17, None), 23);
    }

    #[test]
    fn actor_is_the_side_facing_the_target() {
        assert_eq!(TurnEvent::damage(Side::Dragon, 1, false).actor(), Side::Person);
        assert_eq!(TurnEvent::heal(Side::Dragon, 1).actor(), Side::Person);
    }

    #[test]
    fn decodes_backend_snapshot() {
        let raw = r#"{
            "game_id": 7, "round": 3, "winner": null, "game_over": false,
            "dragon": {"hp": 12, "max_hp": 20},
            "person": {"hp": 8, "max_hp": 20, "cooldowns": {"1": 0, "2": 2, "3": 0}},
            "turn_events": [
                {"type": "damage", "target": "dragon", "value": 5, "is_crit": false},
                {"type": "heal", "target": "person", "value": 3}
            ]
        }"#;

        let result: RoundResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.game_id, Some(GameId(7)));
        assert_eq!(result.round, 3);
        assert_eq!((result.dragon_hp, result.person_hp), (12, 8));
        assert_eq!(result.cooldowns.remaining(SkillId::HEAL), 2);
        assert!(result.cooldowns.is_ready(SkillId::ULTIMATE));
        assert_eq!(result.events[1], TurnEvent::heal(Side::Person, 3));
        assert!(!result.game_over);
    }

    #[test]
    fn missing_events_and_negative_hp_are_normalized() {
        let raw = r#"{"round": 9, "game_over": true, "winner": "勇者",
            "dragon": {"hp": -4}, "person": {"hp": 3}}"#;

        let result: RoundResult = serde_json::from_str(raw).unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.dragon_hp, 0);
        assert_eq!(result.winner, Some(Winner::Person));
    }

    #[test]
    fn round_zero_is_rejected() {
        let raw = r#"{"round": 0, "dragon": {"hp": 1}, "person": {"hp": 1}}"#;
        assert!(serde_json::from_str::<RoundResult>(raw).is_err());
    }
}

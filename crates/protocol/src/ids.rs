//! Identifiers and small enums shared by every payload.
use serde::{Deserialize, Serialize};

/// Backend-assigned battle identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hero skill slot as understood by the backend.
///
/// Cooldown maps are keyed by this id; on the wire the keys are the decimal
/// strings `"1"`, `"2"`, `"3"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u8);

impl SkillId {
    /// Plain attack.
    pub const ATTACK: Self = Self(1);
    /// Self-heal.
    pub const HEAL: Self = Self(2);
    /// Ultimate; starts every battle on cooldown.
    pub const ULTIMATE: Self = Self(3);

    /// Skills the hero can trigger, in button order.
    pub const ALL: [Self; 3] = [Self::ATTACK, Self::HEAL, Self::ULTIMATE];

    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Sword Strike",
            2 => "Potion",
            3 => "Fire Magic",
            _ => "Unknown Skill",
        }
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two combatants.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Side {
    Dragon,
    Person,
}

impl Side {
    /// The side facing this one.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Dragon => Side::Person,
            Side::Person => Side::Dragon,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Side::Dragon => "Dragon King",
            Side::Person => "Hero",
        }
    }
}

/// Battle outcome.
///
/// The original backend reports localized labels; both spellings decode.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Winner {
    #[serde(alias = "龍王")]
    Dragon,
    #[serde(alias = "勇者")]
    Person,
    #[serde(alias = "平手")]
    Draw,
}

impl Winner {
    /// The winning side, if the battle did not end in a draw.
    pub const fn side(self) -> Option<Side> {
        match self {
            Winner::Dragon => Some(Side::Dragon),
            Winner::Person => Some(Side::Person),
            Winner::Draw => None,
        }
    }
}

/// Dragon strength requested at battle start.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Parses a difficulty, falling back to [`Difficulty::Normal`] like the
    /// backend does for unknown values.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }

    /// Cycles to the next difficulty (wrapping).
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        assert_eq!(Side::Dragon.opposite(), Side::Person);
        assert_eq!(Side::Person.opposite().opposite(), Side::Person);
    }

    #[test]
    fn winner_accepts_localized_labels() {
        let winner: Winner = serde_json::from_str("\"龍王\"").unwrap();
        assert_eq!(winner, Winner::Dragon);
        let winner: Winner = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(winner, Winner::Draw);
        assert_eq!(Winner::Person.side(), Some(Side::Person));
        assert_eq!(Winner::Draw.side(), None);
    }

    #[test]
    fn unknown_difficulty_falls_back_to_normal() {
        assert_eq!(Difficulty::parse_lenient("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_lenient("nightmare"), Difficulty::Normal);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }
}

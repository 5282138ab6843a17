//! Milestones unlocked from the global statistics.
use battle_protocol::{OverallStats, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Achievement {
    /// At least one battle was fought.
    FirstBattle,
    /// One side has won five battles.
    Veteran,
    /// A hundred battles were fought.
    Centurion,
}

impl Achievement {
    pub const ALL: [Self; 3] = [Self::FirstBattle, Self::Veteran, Self::Centurion];

    pub const fn title(self) -> &'static str {
        match self {
            Achievement::FirstBattle => "First Blood",
            Achievement::Veteran => "Seasoned Fighter",
            Achievement::Centurion => "Hundred Battles",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Achievement::FirstBattle => "Fight your first battle",
            Achievement::Veteran => "Either side wins 5 battles",
            Achievement::Centurion => "100 battles fought",
        }
    }

    pub fn is_met(self, stats: &OverallStats) -> bool {
        match self {
            Achievement::FirstBattle => stats.total_games >= 1,
            Achievement::Veteran => {
                stats.wins(Side::Dragon) >= 5 || stats.wins(Side::Person) >= 5
            }
            Achievement::Centurion => stats.total_games >= 100,
        }
    }
}

/// Achievements unlocked so far. Unlocks are never revoked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AchievementSet {
    unlocked: Vec<Achievement>,
}

impl AchievementSet {
    /// Unlocks everything `stats` qualifies for; returns only the new ones.
    pub fn unlock_from(&mut self, stats: &OverallStats) -> Vec<Achievement> {
        let fresh: Vec<_> = Achievement::ALL
            .into_iter()
            .filter(|achievement| !self.is_unlocked(*achievement) && achievement.is_met(stats))
            .collect();
        self.unlocked.extend(fresh.iter().copied());
        self.unlocked.sort();
        fresh
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.unlocked.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u64, dragon: u64, person: u64) -> OverallStats {
        OverallStats {
            total_games: total,
            dragon_wins: dragon,
            person_wins: person,
            ..OverallStats::default()
        }
    }

    #[test]
    fn thresholds_match_milestones() {
        let mut set = AchievementSet::default();
        assert!(set.unlock_from(&stats(0, 0, 0)).is_empty());
        assert_eq!(set.unlock_from(&stats(1, 1, 0)), [Achievement::FirstBattle]);
        assert_eq!(set.unlock_from(&stats(9, 2, 5)), [Achievement::Veteran]);
        assert_eq!(set.unlock_from(&stats(100, 60, 40)), [Achievement::Centurion]);
    }

    #[test]
    fn unlocks_are_reported_once_and_kept() {
        let mut set = AchievementSet::default();
        set.unlock_from(&stats(3, 0, 0));
        assert!(set.unlock_from(&stats(3, 0, 0)).is_empty());
        // Lower numbers from a reset backend do not revoke anything.
        set.unlock_from(&stats(0, 0, 0));
        assert!(set.is_unlocked(Achievement::FirstBattle));
    }
}

//! Focus-fire target selection

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::config::CombatConfig;
use crate::units::{Unit, UnitType};

/// Scoring closure for a custom policy; higher scores are shot first
pub type TargetScore = Arc<dyn Fn(&Unit, &Unit) -> f32 + Send + Sync>;

/// How weapon-ready units choose what to shoot
#[derive(Clone, Default)]
pub enum TargetPolicy {
    /// Lowest remaining health plus shield
    #[default]
    LowestHealth,
    /// Highest table priority first, lowest health among equals.
    /// Types missing from the table score zero.
    Prioritized(AHashMap<UnitType, f32>),
    /// Caller-supplied score of (shooter, candidate)
    Custom(TargetScore),
}

impl fmt::Debug for TargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPolicy::LowestHealth => write!(f, "LowestHealth"),
            TargetPolicy::Prioritized(table) => f.debug_tuple("Prioritized").field(table).finish(),
            TargetPolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl TargetPolicy {
    /// Policy described by the combat config; an empty table means lowest health
    pub fn from_config(config: &CombatConfig) -> Self {
        if config.target_priorities.is_empty() {
            return TargetPolicy::LowestHealth;
        }
        let table = config
            .target_priorities
            .iter()
            .map(|entry| (entry.unit_type, entry.priority))
            .collect();
        TargetPolicy::Prioritized(table)
    }

    pub fn custom(score: impl Fn(&Unit, &Unit) -> f32 + Send + Sync + 'static) -> Self {
        TargetPolicy::Custom(Arc::new(score))
    }

    /// Best target among `candidates` for `shooter`
    ///
    /// Ties resolve to the lowest tag so the choice is stable across ticks.
    pub fn pick<'b>(&self, shooter: &Unit, candidates: impl Iterator<Item = &'b Unit>) -> Option<&'b Unit> {
        candidates
            .filter(|c| shooter.can_attack(c))
            .max_by_key(|c| {
                let (primary, secondary) = self.score(shooter, c);
                (OrderedFloat(primary), OrderedFloat(secondary), std::cmp::Reverse(c.tag))
            })
    }

    fn score(&self, shooter: &Unit, candidate: &Unit) -> (f32, f32) {
        let health = -candidate.effective_health();
        match self {
            TargetPolicy::LowestHealth => (health, 0.0),
            TargetPolicy::Prioritized(table) => {
                (table.get(&candidate.unit_type).copied().unwrap_or(0.0), health)
            }
            TargetPolicy::Custom(score) => (score(shooter, candidate), health),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TargetPriorityEntry;
    use crate::core::types::UnitTag;
    use glam::Vec2;

    fn unit(tag: u64, unit_type: UnitType) -> Unit {
        Unit::new(UnitTag(tag), unit_type, Vec2::ZERO)
    }

    #[test]
    fn test_lowest_health_default() {
        let shooter = unit(1, UnitType::Rifleman);
        let healthy = unit(2, UnitType::Brawler);
        let hurt = unit(3, UnitType::Brawler).with_health_fraction(0.2);
        let candidates = [healthy, hurt];
        let picked = TargetPolicy::default().pick(&shooter, candidates.iter());
        assert_eq!(picked.map(|u| u.tag), Some(UnitTag(3)));
    }

    #[test]
    fn test_priority_table_wins_over_health() {
        let mut config = CombatConfig::default();
        config.target_priorities.push(TargetPriorityEntry {
            unit_type: UnitType::Bombard,
            priority: 10.0,
        });
        let policy = TargetPolicy::from_config(&config);
        let shooter = unit(1, UnitType::Ranger);
        let candidates = [unit(2, UnitType::Rifleman).with_health_fraction(0.1), unit(3, UnitType::Bombard)];
        let picked = policy.pick(&shooter, candidates.iter());
        assert_eq!(picked.map(|u| u.tag), Some(UnitTag(3)));
    }

    #[test]
    fn test_custom_policy() {
        let policy = TargetPolicy::custom(|_, c| if c.is_flying() { 1.0 } else { 0.0 });
        let shooter = unit(1, UnitType::Ranger);
        let candidates = [unit(2, UnitType::Rifleman), unit(3, UnitType::Gunship)];
        let picked = policy.pick(&shooter, candidates.iter());
        assert_eq!(picked.map(|u| u.tag), Some(UnitTag(3)));
    }

    #[test]
    fn test_unattackable_candidates_skipped() {
        let shooter = unit(1, UnitType::Juggernaut);
        let candidates = [unit(2, UnitType::Gunship)];
        assert!(TargetPolicy::default().pick(&shooter, candidates.iter()).is_none());
    }

    #[test]
    fn test_tie_breaks_on_lowest_tag() {
        let shooter = unit(1, UnitType::Rifleman);
        let candidates = [unit(7, UnitType::Brawler), unit(5, UnitType::Brawler)];
        let picked = TargetPolicy::default().pick(&shooter, candidates.iter());
        assert_eq!(picked.map(|u| u.tag), Some(UnitTag(5)));
    }
}

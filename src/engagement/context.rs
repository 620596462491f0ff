//! Per-group engagement scratch, rebuilt every tick
//!
//! Inputs are read-only group snapshots, so contexts for different groups
//! can be computed in parallel before the sequential strategy pass.

use ahash::AHashMap;
use glam::Vec2;
use rayon::prelude::*;

use crate::combat::MovementIntent;
use crate::core::config::{CombatConfig, EngagementTuning};
use crate::core::types::UnitTag;
use crate::groups::UnitGroup;
use crate::power::PowerVector;
use crate::units::Unit;

/// What one of our groups is up against this tick
#[derive(Debug, Clone, Default)]
pub struct EngagementContext {
    pub own_power: PowerVector,
    /// Power of enemy groups currently in combat with us
    pub engaged_power: PowerVector,
    pub in_combat: bool,
    /// Index into the enemy group list
    pub closest_group: Option<usize>,
    pub closest_center: Option<Vec2>,
    /// Nearest valid enemy each member can attack
    pub nearest_enemy: AHashMap<UnitTag, UnitTag>,
    /// Share of members with their nearest enemy inside weapon range
    pub engage_ratio: f32,
    /// Share of members with their nearest enemy inside range plus buffer
    pub can_engage_ratio: f32,
    /// Share of members whose weapon is ready
    pub ready_ratio: f32,
    /// Share of members with an enemy melee unit touching them
    pub melee_surround_ratio: f32,
    /// Engaged enemy melee power moving at or above the fast-melee speed
    pub fast_melee_power: f32,
    /// Power-weighted own range against the engaged enemies
    pub own_range: f32,
    /// Longest engaged enemy range against us
    pub enemy_range: f32,
    pub intent: MovementIntent,
}

impl EngagementContext {
    pub fn build(
        group: &UnitGroup,
        enemy_groups: &[UnitGroup],
        intent: MovementIntent,
        tuning: &EngagementTuning,
        combat: &CombatConfig,
    ) -> Self {
        let mut ctx = Self {
            own_power: group.power,
            intent,
            ..Self::default()
        };
        if group.is_empty() {
            return ctx;
        }

        ctx.closest_group = group.closest_target_group(enemy_groups, tuning.target_search_radius);
        ctx.closest_center = ctx.closest_group.map(|i| enemy_groups[i].center);

        let engaged: Vec<&Unit> = enemy_groups
            .iter()
            .filter(|g| group.is_in_combat(g, tuning))
            .flat_map(|g| g.units.iter())
            .filter(|u| u.is_valid_target())
            .collect();
        ctx.in_combat = !engaged.is_empty();
        ctx.engaged_power = PowerVector::of_units(engaged.iter().copied());
        ctx.fast_melee_power = engaged
            .iter()
            .filter(|u| u.data().is_melee && u.speed() >= combat.fast_melee_speed)
            .map(|u| PowerVector::of_unit(u).total)
            .sum();

        let enemies: Vec<&Unit> = enemy_groups
            .iter()
            .flat_map(|g| g.units.iter())
            .filter(|u| u.is_valid_target())
            .collect();

        let members = group.len() as f32;
        let mut engaging = 0usize;
        let mut can_engage = 0usize;
        let mut ready = 0usize;
        let mut surrounded = 0usize;
        for unit in &group.units {
            if unit.weapon_ready(combat.ready_cooldown_allowance) {
                ready += 1;
            }
            let nearest = enemies
                .iter()
                .filter(|e| unit.can_attack(e))
                .min_by(|a, b| unit.distance_to(a).total_cmp(&unit.distance_to(b)));
            if let Some(enemy) = nearest {
                ctx.nearest_enemy.insert(unit.tag, enemy.tag);
                let range = unit.range_vs(enemy);
                let gap = unit.gap_to(enemy);
                if gap <= range + tuning.range_margin {
                    engaging += 1;
                }
                if gap <= range + tuning.can_engage_buffer {
                    can_engage += 1;
                }
            }
            let touched = enemies
                .iter()
                .any(|e| e.data().is_melee && e.can_attack(unit) && e.gap_to(unit) <= tuning.melee_surround_range);
            if touched {
                surrounded += 1;
            }
        }
        ctx.engage_ratio = engaging as f32 / members;
        ctx.can_engage_ratio = can_engage as f32 / members;
        ctx.ready_ratio = ready as f32 / members;
        ctx.melee_surround_ratio = surrounded as f32 / members;

        let (weighted, weight) = group
            .units
            .iter()
            .filter_map(|u| {
                let range = engaged.iter().map(|e| u.range_vs(e)).fold(0.0, f32::max);
                (range > 0.0).then(|| (range, PowerVector::of_unit(u).total.max(0.1)))
            })
            .fold((0.0, 0.0), |(sum, w), (range, p)| (sum + range * p, w + p));
        ctx.own_range = if weight > 0.0 { weighted / weight } else { 0.0 };
        ctx.enemy_range = engaged
            .iter()
            .map(|e| group.units.iter().map(|u| e.range_vs(u)).fold(0.0, f32::max))
            .fold(0.0, f32::max);

        ctx
    }

    /// Any engaged enemy power at all
    pub fn has_engaged_enemy(&self) -> bool {
        self.in_combat && self.engaged_power.total > 0.0
    }

    /// Share of engaged enemy power that is siege
    pub fn siege_ratio(&self) -> f32 {
        self.engaged_power.siege_ratio()
    }

    /// Share of engaged enemy power that is fast melee
    pub fn fast_melee_ratio(&self) -> f32 {
        if self.engaged_power.total <= 0.0 {
            0.0
        } else {
            self.fast_melee_power / self.engaged_power.total
        }
    }
}

/// Engagement context for every own group, in group order
///
/// Switches to a parallel build once there are at least `parallel_threshold`
/// groups. Each context only reads the shared group snapshots.
pub fn build_contexts(
    own_groups: &[UnitGroup],
    enemy_groups: &[UnitGroup],
    intent: MovementIntent,
    tuning: &EngagementTuning,
    combat: &CombatConfig,
) -> Vec<EngagementContext> {
    if own_groups.len() >= combat.parallel_group_threshold {
        own_groups
            .par_iter()
            .map(|g| EngagementContext::build(g, enemy_groups, intent, tuning, combat))
            .collect()
    } else {
        own_groups
            .iter()
            .map(|g| EngagementContext::build(g, enemy_groups, intent, tuning, combat))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitType;

    fn unit(tag: u64, unit_type: UnitType, x: f32, y: f32) -> Unit {
        Unit::new(UnitTag(tag), unit_type, Vec2::new(x, y))
    }

    fn groups(units: Vec<Unit>) -> Vec<UnitGroup> {
        vec![UnitGroup::new(units, &EngagementTuning::default())]
    }

    fn build(own: Vec<Unit>, enemy: Vec<Unit>) -> EngagementContext {
        let tuning = EngagementTuning::default();
        let own = UnitGroup::new(own, &tuning);
        EngagementContext::build(
            &own,
            &groups(enemy),
            MovementIntent::Assault,
            &tuning,
            &CombatConfig::default(),
        )
    }

    #[test]
    fn test_nearest_enemy_skips_unattackable() {
        let ctx = build(
            vec![unit(1, UnitType::Juggernaut, 0.0, 0.0)],
            vec![unit(10, UnitType::Gunship, 1.0, 0.0), unit(11, UnitType::Brawler, 6.0, 0.0)],
        );
        assert_eq!(ctx.nearest_enemy.get(&UnitTag(1)), Some(&UnitTag(11)));
    }

    #[test]
    fn test_nearest_enemy_skips_memories() {
        let mut ghost = unit(10, UnitType::Brawler, 1.0, 0.0);
        ghost.is_memory = true;
        let ctx = build(
            vec![unit(1, UnitType::Rifleman, 0.0, 0.0)],
            vec![ghost, unit(11, UnitType::Brawler, 4.0, 0.0)],
        );
        assert_eq!(ctx.nearest_enemy.get(&UnitTag(1)), Some(&UnitTag(11)));
    }

    #[test]
    fn test_ratios_in_range() {
        let ctx = build(
            vec![
                unit(1, UnitType::Rifleman, 0.0, 0.0),
                unit(2, UnitType::Rifleman, 0.0, 1.0).with_weapon_cooldown(0.5),
            ],
            vec![unit(10, UnitType::Brawler, 3.0, 0.0)],
        );
        assert!(ctx.in_combat);
        assert_eq!(ctx.engage_ratio, 1.0);
        assert_eq!(ctx.ready_ratio, 0.5);
    }

    #[test]
    fn test_fast_melee_and_surround() {
        let ctx = build(
            vec![unit(1, UnitType::Ranger, 0.0, 0.0)],
            vec![unit(10, UnitType::Hound, 1.5, 0.0), unit(11, UnitType::Hound, -1.5, 0.0)],
        );
        assert_eq!(ctx.melee_surround_ratio, 1.0);
        assert!((ctx.fast_melee_ratio() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ranges_against_engaged() {
        let ctx = build(
            vec![unit(1, UnitType::Bombard, 0.0, 0.0)],
            vec![unit(10, UnitType::Rifleman, 8.0, 0.0)],
        );
        assert_eq!(ctx.own_range, 13.0);
        assert_eq!(ctx.enemy_range, 5.0);
    }

    #[test]
    fn test_no_enemies_not_in_combat() {
        let ctx = build(vec![unit(1, UnitType::Rifleman, 0.0, 0.0)], Vec::new());
        assert!(!ctx.has_engaged_enemy());
        assert!(ctx.closest_group.is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tuning = EngagementTuning::default();
        let own: Vec<UnitGroup> = (0..6)
            .map(|i| UnitGroup::new(vec![unit(i, UnitType::Rifleman, i as f32 * 30.0, 0.0)], &tuning))
            .collect();
        let enemy = groups(vec![unit(100, UnitType::Brawler, 3.0, 0.0)]);
        let mut seq_config = CombatConfig::default();
        seq_config.parallel_group_threshold = usize::MAX;
        let mut par_config = CombatConfig::default();
        par_config.parallel_group_threshold = 1;

        let seq = build_contexts(&own, &enemy, MovementIntent::Assault, &tuning, &seq_config);
        let par = build_contexts(&own, &enemy, MovementIntent::Assault, &tuning, &par_config);
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(par.iter()) {
            assert_eq!(a.in_combat, b.in_combat);
            assert_eq!(a.closest_group, b.closest_group);
            assert_eq!(a.nearest_enemy, b.nearest_enemy);
        }
    }
}

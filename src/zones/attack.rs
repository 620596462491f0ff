//! Attack / retreat state machine
//!
//! Owns the force-wide decision of whether to attack, where, and when to
//! pull back. Every wait is a comparison against game time; nothing is
//! scheduled. At most one status transition happens per tick.

use std::collections::BTreeSet;

use glam::Vec2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::MovementIntent;
use crate::core::config::AttackConfig;
use crate::core::types::{GameSeconds, UnitTag};
use crate::power::PowerVector;
use crate::services::{PathingService, WorldSnapshot};
use crate::units::{Unit, UnitType};
use crate::zones::targeting::{select_target, AttackTarget};
use crate::zones::ZoneMap;

/// Force-wide orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackStatus {
    #[default]
    Inactive,
    Attacking,
    /// Pulling back after losing the local fight
    Retreating,
    /// Pulling back because home needs the army
    Withdrawing,
    MovingToExpansion,
    ProtectingExpansion,
}

impl AttackStatus {
    pub fn is_retreat(&self) -> bool {
        matches!(self, AttackStatus::Retreating | AttackStatus::Withdrawing)
    }

    /// Attackers are committed away from home and not free for defense
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            AttackStatus::Attacking | AttackStatus::MovingToExpansion | AttackStatus::ProtectingExpansion
        )
    }
}

/// One status change, for logs and reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusTransition {
    pub at: GameSeconds,
    pub from: AttackStatus,
    pub to: AttackStatus,
    pub reason: &'static str,
}

/// What the attacking units should do this tick
#[derive(Debug, Clone, PartialEq)]
pub struct AttackPlan {
    pub status: AttackStatus,
    pub intent: MovementIntent,
    pub target: Vec2,
    /// Units under orchestrator control, ascending by tag
    pub units: Vec<UnitTag>,
    pub transition: Option<StatusTransition>,
}

#[derive(Debug, Clone, Default)]
pub struct AttackOrchestrator {
    status: AttackStatus,
    status_since: GameSeconds,
    attackers: BTreeSet<UnitTag>,
    retreat_intent: MovementIntent,
    target: Option<AttackTarget>,
}

impl AttackOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AttackStatus {
        self.status
    }

    pub fn attackers(&self) -> &BTreeSet<UnitTag> {
        &self.attackers
    }

    pub fn target(&self) -> Option<AttackTarget> {
        self.target
    }

    fn transition(
        &mut self,
        now: GameSeconds,
        to: AttackStatus,
        reason: &'static str,
    ) -> Option<StatusTransition> {
        let record = StatusTransition {
            at: now,
            from: self.status,
            to,
            reason,
        };
        info!(from = ?record.from, to = ?to, reason, attackers = self.attackers.len(), "attack status");
        self.status = to;
        self.status_since = now;
        if to == AttackStatus::Inactive {
            self.attackers.clear();
        }
        Some(record)
    }

    /// Advance the state machine one tick
    ///
    /// `candidates` are own army units not held by zone defense. When the
    /// orchestrator is idle they form the attacking force; while it is
    /// committed they reinforce it.
    pub fn update(
        &mut self,
        world: &WorldSnapshot,
        zones: &ZoneMap,
        candidates: &[&Unit],
        defense_unmet: bool,
        pathing: &dyn PathingService,
        config: &AttackConfig,
    ) -> AttackPlan {
        let now = world.time;
        let alive: BTreeSet<UnitTag> = world.own_army().map(|u| u.tag).collect();
        self.attackers.retain(|tag| alive.contains(tag));

        let transition = match self.status {
            AttackStatus::Inactive => self.update_inactive(world, zones, candidates, pathing, config),
            AttackStatus::Attacking => self.update_attacking(world, zones, candidates, defense_unmet, pathing, config),
            AttackStatus::Retreating | AttackStatus::Withdrawing => self.update_retreating(world, config),
            AttackStatus::MovingToExpansion | AttackStatus::ProtectingExpansion => {
                self.update_expansion(world, candidates, config)
            }
        };

        self.plan(world, transition)
    }

    fn update_inactive(
        &mut self,
        world: &WorldSnapshot,
        zones: &ZoneMap,
        candidates: &[&Unit],
        pathing: &dyn PathingService,
        config: &AttackConfig,
    ) -> Option<StatusTransition> {
        if candidates.is_empty() {
            return None;
        }
        if world.expansion_target.is_some() {
            self.attackers = candidates.iter().map(|u| u.tag).collect();
            return self.transition(world.time, AttackStatus::MovingToExpansion, "expansion requested");
        }

        let reason = if world.supply_used >= config.supply_cap_fallback {
            "supply cap"
        } else if should_attack(world, candidates, config) {
            "power advantage"
        } else {
            return None;
        };
        let target = select_target(world, zones, pathing, config)?;
        self.target = Some(target);
        self.attackers = candidates.iter().map(|u| u.tag).collect();
        self.transition(world.time, AttackStatus::Attacking, reason)
    }

    fn update_attacking(
        &mut self,
        world: &WorldSnapshot,
        zones: &ZoneMap,
        candidates: &[&Unit],
        defense_unmet: bool,
        pathing: &dyn PathingService,
        config: &AttackConfig,
    ) -> Option<StatusTransition> {
        if self.attackers.is_empty() {
            self.retreat_intent = MovementIntent::DefensiveRetreat;
            return self.transition(world.time, AttackStatus::Retreating, "no attackers left");
        }
        if defense_unmet {
            self.retreat_intent = MovementIntent::DefensiveRetreat;
            return self.transition(world.time, AttackStatus::Withdrawing, "home under assault");
        }

        self.attackers.extend(candidates.iter().map(|u| u.tag));
        if let Some(target) = select_target(world, zones, pathing, config) {
            self.target = Some(target);
        }
        let target = self.target.map(|t| t.position()).unwrap_or(world.rally_point);

        let lead = world
            .own_army()
            .filter(|u| self.attackers.contains(&u.tag))
            .min_by_key(|u| (OrderedFloat(u.position.distance(target)), u.tag));
        let Some(lead) = lead else {
            return None;
        };

        let (own, enemy) = local_power(world, lead.position, config.local_power_radius);
        debug!(own = own.total, enemy = enemy.total, "front line power");
        if enemy.total * config.retreat_multiplier > own.total {
            let ratio = if own.total > 0.0 { enemy.total / own.total } else { f32::INFINITY };
            self.retreat_intent = if ratio >= config.panic_ratio {
                MovementIntent::PanicRetreat
            } else {
                MovementIntent::DefensiveRetreat
            };
            return self.transition(world.time, AttackStatus::Retreating, "losing local fight");
        }
        None
    }

    fn update_retreating(&mut self, world: &WorldSnapshot, config: &AttackConfig) -> Option<StatusTransition> {
        if world.time - self.status_since >= config.retreat_duration {
            return self.transition(world.time, AttackStatus::Inactive, "retreat timer");
        }
        let gathered = world
            .own_army()
            .filter(|u| self.attackers.contains(&u.tag))
            .all(|u| u.position.distance(world.rally_point) <= config.rally_radius);
        if gathered {
            return self.transition(world.time, AttackStatus::Inactive, "reached rally point");
        }
        None
    }

    fn update_expansion(
        &mut self,
        world: &WorldSnapshot,
        candidates: &[&Unit],
        config: &AttackConfig,
    ) -> Option<StatusTransition> {
        let Some(site) = world.expansion_target else {
            return self.transition(world.time, AttackStatus::Inactive, "expansion settled");
        };
        self.attackers.extend(candidates.iter().map(|u| u.tag));
        if self.attackers.is_empty() {
            return self.transition(world.time, AttackStatus::Inactive, "no escort left");
        }
        if self.status == AttackStatus::MovingToExpansion {
            let arrived = world
                .own_army()
                .filter(|u| self.attackers.contains(&u.tag))
                .all(|u| u.position.distance(site) <= config.expansion_arrival_radius);
            if arrived {
                return self.transition(world.time, AttackStatus::ProtectingExpansion, "escort arrived");
            }
        }
        None
    }

    fn plan(&self, world: &WorldSnapshot, transition: Option<StatusTransition>) -> AttackPlan {
        let (intent, target) = match self.status {
            AttackStatus::Inactive => (MovementIntent::Regroup, world.rally_point),
            AttackStatus::Attacking => {
                let intent = match self.target {
                    Some(t) if t.is_structure_target() => MovementIntent::Assault,
                    _ => MovementIntent::SearchAndDestroy,
                };
                let target = self.target.map(|t| t.position()).unwrap_or(world.rally_point);
                (intent, target)
            }
            AttackStatus::Retreating | AttackStatus::Withdrawing => (self.retreat_intent, world.rally_point),
            AttackStatus::MovingToExpansion => {
                (MovementIntent::Push, world.expansion_target.unwrap_or(world.rally_point))
            }
            AttackStatus::ProtectingExpansion => (
                MovementIntent::SearchAndDestroy,
                world.expansion_target.unwrap_or(world.rally_point),
            ),
        };
        AttackPlan {
            status: self.status,
            intent,
            target,
            units: self.attackers.iter().copied().collect(),
            transition,
        }
    }
}

/// Idle power against the margin-inflated known enemy estimate
fn should_attack(world: &WorldSnapshot, candidates: &[&Unit], config: &AttackConfig) -> bool {
    let idle = PowerVector::of_units(candidates.iter().copied());

    let mut estimate = PowerVector::of_units(world.known_enemies().filter(|u| !u.data().is_structure));
    estimate.multiply(config.enemy_power_margin);

    let bases = world
        .enemy_structures()
        .filter(|u| u.unit_type == UnitType::Townhall)
        .count();
    if bases <= config.max_bases_for_static_defense {
        let defenses = PowerVector::of_units(world.enemy_structures().filter(|u| u.unit_type.is_static_defense()));
        estimate.add_power(&defenses);
    }

    idle.is_enough_for_margin(&estimate, config.enough_margin)
}

/// Own and enemy power within `radius` of `point`
fn local_power(world: &WorldSnapshot, point: Vec2, radius: f32) -> (PowerVector, PowerVector) {
    let own = PowerVector::of_units(
        world
            .own_army()
            .filter(|u| u.position.distance(point) <= radius),
    );
    let enemy = PowerVector::of_units(world.enemies_in_radius(point, radius));
    (own, enemy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ZoneId;
    use crate::services::ThreatFieldPathing;
    use crate::zones::{Zone, ZoneOwner};

    fn unit(tag: u64, unit_type: UnitType, x: f32, y: f32) -> Unit {
        Unit::new(UnitTag(tag), unit_type, Vec2::new(x, y))
    }

    fn zones() -> ZoneMap {
        ZoneMap::new(vec![
            Zone::new(ZoneId(0), Vec2::ZERO, 15.0).with_owner(ZoneOwner::Own),
            Zone::new(ZoneId(1), Vec2::new(100.0, 0.0), 15.0).as_enemy_start(),
        ])
    }

    fn step(orchestrator: &mut AttackOrchestrator, world: &WorldSnapshot) -> AttackPlan {
        let mut zones = zones();
        zones.refresh(world);
        let candidates: Vec<&Unit> = world.own_army().collect();
        orchestrator.update(
            world,
            &zones,
            &candidates,
            false,
            &ThreatFieldPathing::default(),
            &AttackConfig::default(),
        )
    }

    fn army(count: u64, x: f32) -> Vec<Unit> {
        (0..count).map(|i| unit(i, UnitType::Ranger, x, i as f32 * 0.5)).collect()
    }

    #[test]
    fn test_outnumbered_force_stays_home() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = (0..20).map(|i| unit(i, UnitType::Rifleman, 0.0, i as f32)).collect();
        world.enemy_units = (0..40).map(|i| unit(100 + i, UnitType::Rifleman, 100.0, i as f32)).collect();
        let mut orchestrator = AttackOrchestrator::new();
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Inactive);
        assert!(plan.units.is_empty());
    }

    #[test]
    fn test_supply_cap_forces_attack() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(4, 0.0);
        world.enemy_units = (0..40).map(|i| unit(100 + i, UnitType::Rifleman, 100.0, i as f32)).collect();
        world.supply_used = 200.0;
        let mut orchestrator = AttackOrchestrator::new();
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Attacking);
    }

    #[test]
    fn test_attack_when_enough() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![
            unit(100, UnitType::Townhall, 100.0, 0.0),
            unit(101, UnitType::Rifleman, 100.0, 5.0),
        ];
        let mut orchestrator = AttackOrchestrator::new();
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Attacking);
        assert_eq!(plan.intent, MovementIntent::Assault);
        assert_eq!(plan.target, Vec2::new(100.0, 0.0));
        assert_eq!(plan.units.len(), 10);
        assert!(plan.transition.is_some());
    }

    #[test]
    fn test_static_defense_counts_with_few_bases() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(4, 0.0); // 5 power
        world.enemy_units = (0..3)
            .map(|i| unit(100 + i, UnitType::Cannon, 100.0, i as f32 * 2.0))
            .collect();
        let mut orchestrator = AttackOrchestrator::new();
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Inactive);
    }

    #[test]
    fn test_losing_local_fight_retreats_same_tick() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Attacking);

        // 12.5 own power at the front; 16 enemy power is more than 12.5 / 0.8
        world.time = 1.0;
        world.own_units = army(10, 60.0);
        world.enemy_units.extend((0..8).map(|i| unit(200 + i, UnitType::Tracker, 65.0, i as f32)));
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Retreating);
        assert_eq!(plan.intent, MovementIntent::DefensiveRetreat);
        assert_eq!(plan.target, world.rally_point);
    }

    #[test]
    fn test_even_fight_keeps_attacking() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        step(&mut orchestrator, &world);

        world.time = 1.0;
        world.own_units = army(10, 60.0);
        // 14 power: 14 * 0.8 = 11.2 < 12.5
        world.enemy_units.extend((0..7).map(|i| unit(200 + i, UnitType::Tracker, 65.0, i as f32)));
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Attacking);
    }

    #[test]
    fn test_crushing_defeat_is_panic() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        step(&mut orchestrator, &world);

        world.time = 1.0;
        world.own_units = army(10, 60.0);
        world.enemy_units.extend((0..20).map(|i| unit(200 + i, UnitType::Tracker, 65.0, i as f32 * 0.5)));
        assert_eq!(step(&mut orchestrator, &world).intent, MovementIntent::PanicRetreat);
    }

    #[test]
    fn test_all_attackers_dead_retreats_then_resets() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        step(&mut orchestrator, &world);

        world.time = 1.0;
        world.own_units.clear();
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Retreating);

        world.time = 2.0;
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::Inactive);
        assert!(orchestrator.attackers().is_empty());
    }

    #[test]
    fn test_retreat_timer_expires() {
        let mut world = WorldSnapshot::new(0.0);
        world.rally_point = Vec2::new(-50.0, 0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        step(&mut orchestrator, &world);

        world.time = 1.0;
        world.own_units = army(10, 60.0);
        world.enemy_units.extend((0..20).map(|i| unit(200 + i, UnitType::Tracker, 65.0, i as f32 * 0.5)));
        step(&mut orchestrator, &world);
        assert_eq!(orchestrator.status(), AttackStatus::Retreating);

        world.time = 10.0;
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Retreating);
        world.time = 21.5;
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Inactive);
    }

    #[test]
    fn test_withdraw_when_home_needs_army() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(10, 0.0);
        world.enemy_units = vec![unit(100, UnitType::Townhall, 100.0, 0.0)];
        let mut orchestrator = AttackOrchestrator::new();
        step(&mut orchestrator, &world);

        world.time = 1.0;
        let zones = zones();
        let plan = orchestrator.update(
            &world,
            &zones,
            &[],
            true,
            &ThreatFieldPathing::default(),
            &AttackConfig::default(),
        );
        assert_eq!(plan.status, AttackStatus::Withdrawing);
    }

    #[test]
    fn test_expansion_escort_cycle() {
        let mut world = WorldSnapshot::new(0.0);
        world.own_units = army(3, 0.0);
        world.expansion_target = Some(Vec2::new(40.0, 0.0));
        let mut orchestrator = AttackOrchestrator::new();
        let plan = step(&mut orchestrator, &world);
        assert_eq!(plan.status, AttackStatus::MovingToExpansion);
        assert_eq!(plan.intent, MovementIntent::Push);

        world.time = 5.0;
        world.own_units = army(3, 38.0);
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::ProtectingExpansion);

        world.time = 6.0;
        world.expansion_target = None;
        assert_eq!(step(&mut orchestrator, &world).status, AttackStatus::Inactive);
    }
}

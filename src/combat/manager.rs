//! Group combat manager
//!
//! Given a set of own units plus a target and intent, clusters the units,
//! builds engagement contexts, and asks each unit type's strategy for a
//! command. At most one command leaves per unit per tick.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use tracing::debug;

use crate::combat::{CombatAction, MovementIntent};
use crate::core::config::VanguardConfig;
use crate::core::types::UnitTag;
use crate::engagement::build_contexts;
use crate::groups::{build_groups, UnitGroup};
use crate::micro::{MicroContext, MicroRegistry, TargetPolicy};
use crate::services::{CooldownTracker, PathingService, WorldSnapshot};
use crate::units::{Unit, UnitType};

/// One batch of units sent to one target with one intent
#[derive(Debug, Clone)]
pub struct CombatOrder {
    pub units: Vec<Unit>,
    pub target: Vec2,
    pub intent: MovementIntent,
}

pub struct CombatManager {
    registry: MicroRegistry,
    policy: TargetPolicy,
    /// Units already commanded this tick
    issued: AHashSet<UnitTag>,
    /// Members per unit type for the group being solved, reused across groups
    by_type: AHashMap<UnitType, Vec<usize>>,
    type_order: Vec<UnitType>,
}

impl CombatManager {
    pub fn new(registry: MicroRegistry, policy: TargetPolicy) -> Self {
        Self {
            registry,
            policy,
            issued: AHashSet::new(),
            by_type: AHashMap::new(),
            type_order: Vec::new(),
        }
    }

    pub fn registry_mut(&mut self) -> &mut MicroRegistry {
        &mut self.registry
    }

    pub fn set_policy(&mut self, policy: TargetPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &TargetPolicy {
        &self.policy
    }

    /// Start a new tick; forgets which units were commanded
    pub fn begin_tick(&mut self) {
        self.issued.clear();
    }

    /// Solve one order against the shared enemy groups
    pub fn solve(
        &mut self,
        order: &CombatOrder,
        world: &WorldSnapshot,
        enemy_groups: &[UnitGroup],
        pathing: &dyn PathingService,
        cooldowns: &mut CooldownTracker,
        config: &VanguardConfig,
    ) -> Vec<CombatAction> {
        let mut actions = Vec::new();
        if order.units.is_empty() {
            return actions;
        }

        let own_groups = build_groups(&order.units, &config.engagement);
        let contexts = build_contexts(
            &own_groups,
            enemy_groups,
            order.intent,
            &config.engagement,
            &config.combat,
        );

        let Self {
            registry,
            policy,
            issued,
            by_type,
            type_order,
        } = self;

        for (index, group) in own_groups.iter().enumerate() {
            let engagement = &contexts[index];
            let base = group_command(group, order, engagement.in_combat, config);

            for members in by_type.values_mut() {
                members.clear();
            }
            type_order.clear();
            for (i, unit) in group.units.iter().enumerate() {
                let members = by_type.entry(unit.unit_type).or_default();
                if members.is_empty() {
                    type_order.push(unit.unit_type);
                }
                members.push(i);
            }

            let mut ctx = MicroContext {
                now: world.time,
                intent: order.intent,
                target: order.target,
                group,
                engagement,
                own_groups: &own_groups,
                enemy_groups,
                world,
                pathing,
                cooldowns: &mut *cooldowns,
                policy: &*policy,
                config,
            };

            for unit_type in type_order.iter() {
                let Some(members) = by_type.get(unit_type) else {
                    continue;
                };
                let units: Vec<&Unit> = members.iter().map(|&i| &group.units[i]).collect();
                let strategy = registry.get_mut(*unit_type);
                let group_action = strategy.group_solve(&mut ctx, &units, base);
                for unit in units {
                    if issued.contains(&unit.tag) {
                        continue;
                    }
                    if let Some(action) = strategy.unit_solve(&mut ctx, unit, group_action) {
                        issued.insert(unit.tag);
                        actions.push(action.with_actor(unit.tag));
                    }
                }
            }
        }

        debug!(
            units = order.units.len(),
            groups = own_groups.len(),
            actions = actions.len(),
            intent = ?order.intent,
            "combat solve"
        );
        actions
    }
}

/// Group-level command before any strategy touches it
fn group_command(group: &UnitGroup, order: &CombatOrder, in_combat: bool, config: &VanguardConfig) -> CombatAction {
    if order.intent.is_retreat() || order.intent == MovementIntent::Regroup {
        return CombatAction::move_to(order.target);
    }
    if !in_combat && group.is_too_spread(&config.engagement) {
        return CombatAction::move_to(group.center);
    }
    if order.intent.is_aggressive() {
        CombatAction::attack_move(order.target)
    } else {
        CombatAction::move_to(order.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::micro::NoMicro;
    use crate::services::ThreatFieldPathing;

    fn unit(tag: u64, unit_type: UnitType, x: f32, y: f32) -> Unit {
        Unit::new(UnitTag(tag), unit_type, Vec2::new(x, y))
    }

    fn manager() -> CombatManager {
        let config = VanguardConfig::default();
        CombatManager::new(MicroRegistry::with_defaults(&config), TargetPolicy::default())
    }

    fn run(manager: &mut CombatManager, order: &CombatOrder, world: &WorldSnapshot) -> Vec<CombatAction> {
        let config = VanguardConfig::default();
        let enemies: Vec<Unit> = world.valid_enemies().cloned().collect();
        let enemy_groups = build_groups(&enemies, &config.engagement);
        let pathing = ThreatFieldPathing::from_enemies(&world.enemy_units);
        let mut cooldowns = CooldownTracker::new();
        cooldowns.advance_to(world.time);
        manager.begin_tick();
        manager.solve(order, world, &enemy_groups, &pathing, &mut cooldowns, &config)
    }

    #[test]
    fn test_one_action_per_unit() {
        let mut world = WorldSnapshot::new(1.0);
        world.own_units = vec![
            unit(1, UnitType::Rifleman, 0.0, 0.0),
            unit(2, UnitType::Ranger, 1.0, 0.0),
            unit(3, UnitType::Rifleman, 40.0, 0.0),
        ];
        world.enemy_units = vec![unit(10, UnitType::Brawler, 5.0, 0.0)];
        let order = CombatOrder {
            units: world.own_units.clone(),
            target: Vec2::new(5.0, 0.0),
            intent: MovementIntent::Assault,
        };
        let mut manager = manager();
        let actions = run(&mut manager, &order, &world);
        assert_eq!(actions.len(), 3);
        let tags: AHashSet<UnitTag> = actions.iter().filter_map(|a| a.actor).collect();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_units_already_commanded_are_skipped() {
        let mut world = WorldSnapshot::new(1.0);
        world.own_units = vec![unit(1, UnitType::Rifleman, 0.0, 0.0)];
        let order = CombatOrder {
            units: world.own_units.clone(),
            target: Vec2::new(20.0, 0.0),
            intent: MovementIntent::Assault,
        };
        let config = VanguardConfig::default();
        let mut manager = manager();
        let mut cooldowns = CooldownTracker::new();
        manager.begin_tick();
        let first = manager.solve(&order, &world, &[], &ThreatFieldPathing::default(), &mut cooldowns, &config);
        let second = manager.solve(&order, &world, &[], &ThreatFieldPathing::default(), &mut cooldowns, &config);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_retreat_order_moves_without_attacking() {
        let mut world = WorldSnapshot::new(1.0);
        world.own_units = vec![unit(1, UnitType::Rifleman, 0.0, 0.0), unit(2, UnitType::Rifleman, 1.0, 0.0)];
        world.enemy_units = vec![unit(10, UnitType::Brawler, 3.0, 0.0)];
        let rally = Vec2::new(-30.0, 0.0);
        let order = CombatOrder {
            units: world.own_units.clone(),
            target: rally,
            intent: MovementIntent::PanicRetreat,
        };
        let actions = run(&mut manager(), &order, &world);
        assert!(actions.iter().all(|a| a.is_move() && a.point() == Some(rally)));
    }

    #[test]
    fn test_spread_group_regroups_out_of_combat() {
        let mut world = WorldSnapshot::new(1.0);
        world.own_units = (0..5).map(|i| unit(i, UnitType::Rifleman, i as f32 * 6.0, 0.0)).collect();
        let order = CombatOrder {
            units: world.own_units.clone(),
            target: Vec2::new(100.0, 0.0),
            intent: MovementIntent::Assault,
        };
        let actions = run(&mut manager(), &order, &world);
        assert_eq!(actions.len(), 5);
        assert!(actions.iter().all(|a| a.is_move() && a.point() == Some(Vec2::new(12.0, 0.0))));
    }

    #[test]
    fn test_noop_types_get_no_command() {
        let mut world = WorldSnapshot::new(1.0);
        world.own_units = vec![unit(1, UnitType::Observer, 0.0, 0.0), unit(2, UnitType::Rifleman, 0.5, 0.0)];
        let order = CombatOrder {
            units: world.own_units.clone(),
            target: Vec2::new(20.0, 0.0),
            intent: MovementIntent::Assault,
        };
        let mut manager = manager();
        manager.registry_mut().register(UnitType::Observer, Box::new(NoMicro));
        let actions = run(&mut manager, &order, &world);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].actor, Some(UnitTag(2)));
    }
}

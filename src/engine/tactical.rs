//! Tactical engine
//!
//! Runs the full decision pipeline for one tick:
//! zone refresh -> defense -> attack state machine -> group combat solve.
//!
//! The three unit sets it commands (defenders, attackers, idle) are
//! disjoint, so every own unit receives at most one command per tick.

use ahash::AHashSet;
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, trace};

use crate::combat::{CombatAction, CombatManager, CombatOrder, MovementIntent};
use crate::core::config::VanguardConfig;
use crate::core::error::Result;
use crate::core::types::{GameSeconds, Tick, UnitTag, ZoneId};
use crate::groups::{build_groups, UnitGroup};
use crate::micro::{MicroRegistry, TargetPolicy};
use crate::services::{CooldownTracker, PathingService, WorldSnapshot};
use crate::units::Unit;
use crate::zones::{AttackOrchestrator, AttackStatus, StatusTransition, ZoneDefense, ZoneMap};

/// Outcome of one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub time: GameSeconds,
    pub status: AttackStatus,
    pub intent: MovementIntent,
    pub target: Vec2,
    pub transition: Option<StatusTransition>,
    pub defended_zones: Vec<ZoneId>,
    pub actions: Vec<CombatAction>,
}

pub struct TacticalEngine {
    config: VanguardConfig,
    combat: CombatManager,
    orchestrator: AttackOrchestrator,
    defense: ZoneDefense,
    cooldowns: CooldownTracker,
    tick: Tick,
}

impl TacticalEngine {
    /// Engine with the default strategy roster
    pub fn new(config: VanguardConfig) -> Result<Self> {
        let registry = MicroRegistry::with_defaults(&config);
        Self::with_registry(config, registry)
    }

    /// Engine with a caller-supplied strategy registry
    pub fn with_registry(config: VanguardConfig, registry: MicroRegistry) -> Result<Self> {
        config.validate()?;
        let policy = TargetPolicy::from_config(&config.combat);
        Ok(Self {
            combat: CombatManager::new(registry, policy),
            orchestrator: AttackOrchestrator::new(),
            defense: ZoneDefense::new(),
            cooldowns: CooldownTracker::new(),
            tick: 0,
            config,
        })
    }

    pub fn config(&self) -> &VanguardConfig {
        &self.config
    }

    pub fn status(&self) -> AttackStatus {
        self.orchestrator.status()
    }

    pub fn orchestrator(&self) -> &AttackOrchestrator {
        &self.orchestrator
    }

    pub fn defense(&self) -> &ZoneDefense {
        &self.defense
    }

    pub fn combat_mut(&mut self) -> &mut CombatManager {
        &mut self.combat
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Decide this tick's commands
    pub fn tick(
        &mut self,
        world: &WorldSnapshot,
        zones: &mut ZoneMap,
        pathing: &dyn PathingService,
    ) -> TickReport {
        self.tick += 1;
        self.cooldowns.advance_to(world.time);
        zones.refresh(world);

        let enemies: Vec<Unit> = world.valid_enemies().cloned().collect();
        let enemy_groups = build_groups(&enemies, &self.config.engagement);

        // Defense may pull any army unit not committed to an attack
        let committed: AHashSet<UnitTag> = if self.orchestrator.status().is_committed() {
            self.orchestrator.attackers().iter().copied().collect()
        } else {
            AHashSet::new()
        };
        let available: Vec<&Unit> = world
            .own_army()
            .filter(|u| !committed.contains(&u.tag))
            .collect();
        let defense_orders = self.defense.update(world, zones, &available, &self.config.defense);
        let defenders = self.defense.defenders();

        let candidates: Vec<&Unit> = world
            .own_army()
            .filter(|u| !defenders.contains(&u.tag))
            .collect();
        let plan = self.orchestrator.update(
            world,
            zones,
            &candidates,
            self.defense.has_unmet_threat(),
            pathing,
            &self.config.attack,
        );

        self.combat.begin_tick();
        let mut actions = Vec::new();

        for order in &defense_orders {
            let units = collect_units(world, order.units.iter().copied(), |_| true);
            let order = CombatOrder {
                units,
                target: order.target,
                intent: MovementIntent::Assault,
            };
            actions.extend(self.solve(&order, world, &enemy_groups, pathing));
        }

        let attacking: AHashSet<UnitTag> = plan.units.iter().copied().collect();
        if !attacking.is_empty() {
            let units = collect_units(world, plan.units.iter().copied(), |tag| !defenders.contains(&tag));
            let order = CombatOrder {
                units,
                target: plan.target,
                intent: plan.intent,
            };
            actions.extend(self.solve(&order, world, &enemy_groups, pathing));
        }

        let idle: Vec<Unit> = world
            .own_army()
            .filter(|u| !defenders.contains(&u.tag) && !attacking.contains(&u.tag))
            .filter(|u| u.position.distance(world.rally_point) > self.config.attack.rally_radius)
            .cloned()
            .collect();
        if !idle.is_empty() {
            let order = CombatOrder {
                units: idle,
                target: world.rally_point,
                intent: MovementIntent::Regroup,
            };
            actions.extend(self.solve(&order, world, &enemy_groups, pathing));
        }

        let alive: AHashSet<UnitTag> = world.own_units.iter().map(|u| u.tag).collect();
        self.cooldowns.retain_units(&alive);

        debug!(
            tick = self.tick,
            status = ?plan.status,
            defenders = defenders.len(),
            attackers = plan.units.len(),
            actions = actions.len(),
            "tactical tick"
        );
        trace!(enemy_groups = enemy_groups.len(), "enemy clustering");

        TickReport {
            tick: self.tick,
            time: world.time,
            status: plan.status,
            intent: plan.intent,
            target: plan.target,
            transition: plan.transition,
            defended_zones: defense_orders.iter().map(|o| o.zone).collect(),
            actions,
        }
    }

    fn solve(
        &mut self,
        order: &CombatOrder,
        world: &WorldSnapshot,
        enemy_groups: &[UnitGroup],
        pathing: &dyn PathingService,
    ) -> Vec<CombatAction> {
        self.combat
            .solve(order, world, enemy_groups, pathing, &mut self.cooldowns, &self.config)
    }
}

/// Snapshot copies of the listed own units, skipping dead ones
fn collect_units(
    world: &WorldSnapshot,
    tags: impl Iterator<Item = UnitTag>,
    keep: impl Fn(UnitTag) -> bool,
) -> Vec<Unit> {
    tags.filter(|tag| keep(*tag))
        .filter_map(|tag| world.own_by_tag(tag))
        .cloned()
        .collect()
}

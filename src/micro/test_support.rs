//! Fixture for driving strategies outside the combat manager

use glam::Vec2;

use crate::combat::{CombatAction, MovementIntent};
use crate::core::config::VanguardConfig;
use crate::engagement::{build_contexts, EngagementContext};
use crate::groups::{build_groups, UnitGroup};
use crate::micro::{MicroContext, TargetPolicy};
use crate::services::{CooldownTracker, NoPathing, PathingService, ThreatFieldPathing, WorldSnapshot};
use crate::units::Unit;

pub(crate) struct Harness {
    pub world: WorldSnapshot,
    pub own_groups: Vec<UnitGroup>,
    pub enemy_groups: Vec<UnitGroup>,
    pub contexts: Vec<EngagementContext>,
    pub cooldowns: CooldownTracker,
    pub config: VanguardConfig,
    pub policy: TargetPolicy,
    pub pathing: Box<dyn PathingService>,
    pub intent: MovementIntent,
    pub target: Vec2,
}

impl Harness {
    pub fn new(world: WorldSnapshot, intent: MovementIntent, target: Vec2) -> Self {
        Self::with_config(world, intent, target, VanguardConfig::default())
    }

    pub fn with_config(
        world: WorldSnapshot,
        intent: MovementIntent,
        target: Vec2,
        config: VanguardConfig,
    ) -> Self {
        let own: Vec<Unit> = world.own_army().cloned().collect();
        let enemies: Vec<Unit> = world.valid_enemies().cloned().collect();
        let own_groups = build_groups(&own, &config.engagement);
        let enemy_groups = build_groups(&enemies, &config.engagement);
        let contexts = build_contexts(
            &own_groups,
            &enemy_groups,
            intent,
            &config.engagement,
            &config.combat,
        );
        let mut cooldowns = CooldownTracker::new();
        cooldowns.advance_to(world.time);
        let pathing = Box::new(ThreatFieldPathing::from_enemies(&world.enemy_units));
        Self {
            world,
            own_groups,
            enemy_groups,
            contexts,
            cooldowns,
            policy: TargetPolicy::from_config(&config.combat),
            config,
            pathing,
            intent,
            target,
        }
    }

    pub fn disable_pathing(&mut self) {
        self.pathing = Box::new(NoPathing);
    }

    pub fn base_command(&self) -> CombatAction {
        if self.intent.is_aggressive() {
            CombatAction::attack_move(self.target)
        } else {
            CombatAction::move_to(self.target)
        }
    }

    pub fn ctx(&mut self, group: usize) -> MicroContext<'_> {
        MicroContext {
            now: self.world.time,
            intent: self.intent,
            target: self.target,
            group: &self.own_groups[group],
            engagement: &self.contexts[group],
            own_groups: &self.own_groups,
            enemy_groups: &self.enemy_groups,
            world: &self.world,
            pathing: self.pathing.as_ref(),
            cooldowns: &mut self.cooldowns,
            policy: &self.policy,
            config: &self.config,
        }
    }
}

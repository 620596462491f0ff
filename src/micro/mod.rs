//! Micro strategies: per-unit-type combat behavior
//!
//! Every strategy implements [`MicroStep`]. The registry maps unit types to
//! strategies and falls back to the generic combat model for anything not
//! registered.

pub mod generic;
pub mod noop;
pub mod registry;
pub mod specialized;
pub mod targeting;
pub mod threat;

#[cfg(test)]
pub(crate) mod test_support;

use glam::Vec2;

use crate::combat::{CombatAction, MovementIntent};
use crate::core::config::VanguardConfig;
use crate::core::types::{GameSeconds, UnitTag};
use crate::engagement::EngagementContext;
use crate::groups::UnitGroup;
use crate::services::{CooldownTracker, PathingService, WorldSnapshot};
use crate::units::Unit;

pub use generic::{GenericCombatModel, Posture};
pub use noop::NoMicro;
pub use registry::MicroRegistry;
pub use specialized::{DenialBoard, DenialSpot, LancerMicro, SentinelMicro, WardenMicro};
pub use targeting::TargetPolicy;
pub use threat::ThreatSnapshot;

/// Everything a strategy may read (and the cooldown ledger it may write)
/// while solving one group
pub struct MicroContext<'a> {
    pub now: GameSeconds,
    pub intent: MovementIntent,
    /// Where the orchestrator sent this group
    pub target: Vec2,
    pub group: &'a UnitGroup,
    pub engagement: &'a EngagementContext,
    pub own_groups: &'a [UnitGroup],
    pub enemy_groups: &'a [UnitGroup],
    pub world: &'a WorldSnapshot,
    pub pathing: &'a dyn PathingService,
    pub cooldowns: &'a mut CooldownTracker,
    pub policy: &'a TargetPolicy,
    pub config: &'a VanguardConfig,
}

impl<'a> MicroContext<'a> {
    /// Look up a visible, real enemy by tag
    pub fn enemy(&self, tag: UnitTag) -> Option<&'a Unit> {
        self.world.enemy_by_tag(tag).filter(|u| u.is_valid_target())
    }

    /// Nearest valid enemy `unit` can attack, from the engagement map
    pub fn nearest_enemy(&self, unit: &Unit) -> Option<&'a Unit> {
        self.engagement
            .nearest_enemy
            .get(&unit.tag)
            .and_then(|&tag| self.enemy(tag))
    }
}

/// Pluggable combat behavior for one unit type
///
/// `group_solve` runs once per group for the members of this type and may
/// rewrite the group command; `unit_solve` then runs per member. Returning
/// `None` from `unit_solve` leaves the unit on its current order.
pub trait MicroStep: Send {
    fn group_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        units: &[&Unit],
        current: CombatAction,
    ) -> CombatAction;

    fn unit_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        unit: &Unit,
        current: CombatAction,
    ) -> Option<CombatAction>;

    /// Can `unit` fire this tick?
    fn ready_to_shoot(&self, ctx: &MicroContext<'_>, unit: &Unit) -> bool {
        unit.weapon_ready(ctx.config.combat.ready_cooldown_allowance)
    }

    /// Pick a target for an attack-assigned unit
    ///
    /// Never re-targets while the weapon is cooling down.
    fn focus_fire(&self, ctx: &MicroContext<'_>, unit: &Unit, current: CombatAction) -> CombatAction {
        if !current.is_attack {
            return current;
        }
        if !self.ready_to_shoot(ctx, unit) {
            return match unit.order_target.and_then(|tag| ctx.enemy(tag)) {
                Some(locked) => CombatAction::attack_unit(locked.tag).with_actor(unit.tag),
                None => current,
            };
        }
        let margin = ctx.config.engagement.range_margin;
        let in_range = ctx
            .world
            .valid_enemies()
            .filter(|e| unit.in_weapon_range(e, margin));
        match ctx.policy.pick(unit, in_range) {
            Some(target) => CombatAction::attack_unit(target.tag).with_actor(unit.tag),
            None => current,
        }
    }
}

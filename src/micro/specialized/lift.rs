//! Lift-and-remove caster (Warden)

use ahash::AHashSet;
use tracing::{debug, trace};

use crate::combat::{ActionTarget, CombatAction};
use crate::core::config::WardenConfig;
use crate::core::types::{GameSeconds, UnitTag};
use crate::micro::{GenericCombatModel, MicroContext, MicroStep, ThreatSnapshot};
use crate::services::safe_point_air;
use crate::units::{AbilityId, Unit, UnitType};

/// Static removal priority; `None` for units that cannot be lifted
pub fn lift_priority(unit_type: UnitType) -> Option<f32> {
    let data = unit_type.data();
    if data.is_flying || data.is_structure || data.is_massive {
        return None;
    }
    let priority = match unit_type {
        UnitType::Bombard => 10.0,
        UnitType::Tracker => 8.0,
        UnitType::Juggernaut => 7.0,
        UnitType::Sentinel => 6.0,
        UnitType::Ranger | UnitType::Shade => 5.0,
        UnitType::Brawler => 3.0,
        UnitType::Rifleman => 2.0,
        _ => 1.0,
    };
    Some(priority)
}

#[derive(Debug, Clone, Default)]
pub struct WardenMicro {
    config: WardenConfig,
    generic: GenericCombatModel,
    /// Tick the claims below belong to
    claims_at: Option<GameSeconds>,
    /// Enemies already targeted by a lift this tick
    claimed: AHashSet<UnitTag>,
    /// Lifts issued this tick
    issued: usize,
}

impl WardenMicro {
    pub fn new(config: WardenConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn reset_claims(&mut self, now: GameSeconds) {
        if self.claims_at != Some(now) {
            self.claims_at = Some(now);
            self.claimed.clear();
            self.issued = 0;
        }
    }

    /// Allied casters currently channelling a lift, plus lifts issued this tick
    fn casting(&self, ctx: &MicroContext<'_>) -> usize {
        let channelling = ctx
            .world
            .own_units
            .iter()
            .filter(|u| u.active_ability == Some(AbilityId::Lift))
            .count();
        channelling + self.issued
    }

    /// Highest scored unclaimed removal candidate inside lift range
    fn best_candidate<'a>(&self, ctx: &MicroContext<'a>, unit: &Unit) -> Option<&'a Unit> {
        let reach = AbilityId::Lift.cast_range();
        ctx.world
            .enemies_in_radius(unit.position, self.config.scan_radius)
            .filter(|e| !self.claimed.contains(&e.tag))
            .filter(|e| unit.gap_to(e) <= reach)
            .filter_map(|e| {
                let priority = lift_priority(e.unit_type)?;
                let score = priority + 1.0 / (1.0 + unit.distance_to(e));
                Some((e, score))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.tag.cmp(&a.0.tag)))
            .map(|(e, _)| e)
    }
}

impl MicroStep for WardenMicro {
    fn group_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        units: &[&Unit],
        current: CombatAction,
    ) -> CombatAction {
        self.reset_claims(ctx.now);
        self.generic.group_solve(ctx, units, current)
    }

    fn unit_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        unit: &Unit,
        current: CombatAction,
    ) -> Option<CombatAction> {
        self.reset_claims(ctx.now);

        if ctx.intent.is_retreat() {
            return self.generic.unit_solve(ctx, unit, current);
        }

        if unit.active_ability == Some(AbilityId::Lift) {
            // Mid-cast; any new order would cancel it
            return None;
        }

        let can_cast = unit.energy >= AbilityId::Lift.energy_cost()
            && ctx
                .cooldowns
                .is_ready(unit.tag, AbilityId::Lift, AbilityId::Lift.cooldown())
            && self.casting(ctx) < self.config.max_concurrent_lifts;
        if can_cast {
            if let Some(target) = self.best_candidate(ctx, unit) {
                self.claimed.insert(target.tag);
                self.issued += 1;
                ctx.cooldowns.used(unit.tag, AbilityId::Lift);
                debug!(unit = unit.tag.0, target = target.tag.0, "lift");
                return Some(
                    CombatAction::ability(AbilityId::Lift, ActionTarget::Unit(target.tag))
                        .with_actor(unit.tag),
                );
            }
        }

        let threat = ThreatSnapshot::around(ctx.world, unit.position, self.config.threat_scan_radius);
        let unliftable = threat
            .threats_to(unit)
            .any(|e| lift_priority(e.unit_type).is_none());
        if unliftable {
            if let Some(safe) = safe_point_air(ctx.pathing, unit.position, self.config.retreat_radius) {
                trace!(unit = unit.tag.0, "warden backs off");
                return Some(CombatAction::move_to(safe).with_actor(unit.tag));
            }
        }

        self.generic.unit_solve(ctx, unit, current)
    }
}

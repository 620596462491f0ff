//! Channel-weapon flyer (Lancer)
//!
//! The beam only hurts light ground units and the Lancer cannot shoot back
//! at air, so the strategy is mostly about when to switch the beam and when
//! to run.

use tracing::debug;

use crate::combat::{ActionTarget, CombatAction};
use crate::core::config::LancerConfig;
use crate::micro::{GenericCombatModel, MicroContext, MicroStep, ThreatSnapshot};
use crate::services::safe_point_air;
use crate::units::{AbilityId, Unit};

#[derive(Debug, Clone, Default)]
pub struct LancerMicro {
    config: LancerConfig,
    generic: GenericCombatModel,
}

impl LancerMicro {
    pub fn new(config: LancerConfig) -> Self {
        Self {
            config,
            generic: GenericCombatModel::new(),
        }
    }

    /// Nearest light ground enemy inside beam activation range
    fn beam_target<'a>(&self, ctx: &MicroContext<'a>, unit: &Unit) -> Option<&'a Unit> {
        ctx.world
            .enemies_in_radius(unit.position, self.config.activation_range + unit.radius() + 1.0)
            .filter(|e| !e.is_flying() && e.data().is_light && !e.data().is_structure)
            .filter(|e| unit.gap_to(e) <= self.config.activation_range)
            .min_by(|a, b| unit.distance_to(a).total_cmp(&unit.distance_to(b)))
    }

    fn evade(&self, ctx: &MicroContext<'_>, unit: &Unit) -> Option<CombatAction> {
        safe_point_air(ctx.pathing, unit.position, self.config.evade_radius)
            .map(|p| CombatAction::move_to(p).with_actor(unit.tag))
    }

    fn beam_off(&self, ctx: &mut MicroContext<'_>, unit: &Unit) -> CombatAction {
        ctx.cooldowns.used(unit.tag, AbilityId::BeamOff);
        debug!(unit = unit.tag.0, "beam off");
        CombatAction::ability(AbilityId::BeamOff, ActionTarget::Unit(unit.tag)).with_actor(unit.tag)
    }
}

impl MicroStep for LancerMicro {
    fn group_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        units: &[&Unit],
        current: CombatAction,
    ) -> CombatAction {
        self.generic.group_solve(ctx, units, current)
    }

    fn unit_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        unit: &Unit,
        current: CombatAction,
    ) -> Option<CombatAction> {
        // Retreat orders override the beam; drop it first, then fall back
        if ctx.intent.is_retreat() {
            if unit.is_channeling {
                return Some(self.beam_off(ctx, unit));
            }
            return self.generic.unit_solve(ctx, unit, current);
        }

        let threat = ThreatSnapshot::around(ctx.world, unit.position, self.config.threat_scan_radius);
        let air_threat = threat.air_threat();
        let toggle_ready = ctx
            .cooldowns
            .is_ready(unit.tag, AbilityId::BeamOn, AbilityId::BeamOn.cooldown())
            && ctx
                .cooldowns
                .is_ready(unit.tag, AbilityId::BeamOff, AbilityId::BeamOff.cooldown());

        if air_threat > self.config.panic_air_threat {
            if unit.is_channeling {
                return Some(self.beam_off(ctx, unit));
            }
            if let Some(evade) = self.evade(ctx, unit) {
                return Some(evade);
            }
            return self.generic.unit_solve(ctx, unit, current);
        }

        let target = self.beam_target(ctx, unit);

        if unit.is_channeling {
            if target.is_none() && toggle_ready {
                return Some(self.beam_off(ctx, unit));
            }
            if air_threat > self.config.moderate_air_threat {
                if let Some(kite) = self.evade(ctx, unit) {
                    return Some(kite);
                }
            }
            // Channelling; leave the beam alone
            return None;
        }

        if let Some(target) = target {
            let energy = unit.energy >= self.config.min_energy.max(AbilityId::BeamOn.energy_cost());
            if energy && toggle_ready {
                ctx.cooldowns.used(unit.tag, AbilityId::BeamOn);
                debug!(unit = unit.tag.0, target = target.tag.0, "beam on");
                return Some(
                    CombatAction::ability(AbilityId::BeamOn, ActionTarget::Unit(target.tag))
                        .with_actor(unit.tag),
                );
            }
        }

        if air_threat > self.config.moderate_air_threat && !self.generic.ready_to_shoot(ctx, unit) {
            if let Some(kite) = self.evade(ctx, unit) {
                return Some(kite);
            }
        }

        self.generic.unit_solve(ctx, unit, current)
    }
}

//! Generic combat model - the default strategy for every unit type
//!
//! Picks a posture for the group from the engaged-power composition, then
//! layers per-unit decisions on top: low-health retreat, lock-on evasion,
//! and focus fire. Nothing carries over between ticks; the posture field is
//! scratch written by `group_solve` and read by the following `unit_solve`
//! calls for the same group.

use glam::Vec2;
use tracing::{debug, trace};

use crate::combat::{CombatAction, MovementIntent};
use crate::core::config::CombatConfig;
use crate::core::types::{away_from, towards};
use crate::engagement::EngagementContext;
use crate::micro::{MicroContext, MicroStep};
use crate::services::{safe_point_air, safe_point_ground};
use crate::units::Unit;

/// Group combat posture for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Posture {
    /// No engaged enemy; the group command passes through
    #[default]
    Idle,
    /// Retreat intent; posturing skipped
    Retreat,
    /// Push toward a forward target, shooting only what is already in range
    Advance,
    /// Dive onto siege before it can set up
    CounterSiege,
    /// Fast melee on us and we are winning the trade; keep pressing
    KitePush,
    /// Fast melee on us; hold a safe spot and let them come
    KiteHold,
    /// We outrange them; hold and drift toward their center
    Outrange,
    /// They outrange us; close the gap while focus firing
    Outranged,
}

impl Posture {
    pub fn is_retreat(&self) -> bool {
        matches!(self, Posture::Retreat)
    }

    pub fn is_kite(&self) -> bool {
        matches!(self, Posture::KitePush | Posture::KiteHold)
    }
}

/// Posture from the engaged composition alone
pub fn classify(engagement: &EngagementContext, config: &CombatConfig) -> Posture {
    if engagement.siege_ratio() >= config.siege_heavy_ratio {
        return Posture::CounterSiege;
    }

    let swarmed = engagement.melee_surround_ratio >= config.melee_surround_ratio
        && engagement.fast_melee_ratio() >= config.fast_melee_ratio
        && engagement.own_power.total >= config.kite_power_threshold;
    if swarmed {
        return if engagement.engage_ratio >= config.kite_push_engage_ratio {
            Posture::KitePush
        } else {
            Posture::KiteHold
        };
    }

    if engagement.own_range > engagement.enemy_range + config.outrange_margin {
        Posture::Outrange
    } else {
        Posture::Outranged
    }
}

/// Full posture choice in priority order: retreat, push, composition
pub fn choose_posture(
    intent: MovementIntent,
    center: Vec2,
    target: Vec2,
    engagement: &EngagementContext,
    config: &CombatConfig,
) -> Posture {
    if intent.is_retreat() {
        return Posture::Retreat;
    }
    if intent == MovementIntent::Push && center.distance(target) > config.push_arrival_radius {
        return Posture::Advance;
    }
    if !engagement.has_engaged_enemy() {
        return Posture::Idle;
    }
    classify(engagement, config)
}

#[derive(Debug, Clone, Default)]
pub struct GenericCombatModel {
    posture: Posture,
}

impl GenericCombatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posture chosen by the last `group_solve`
    pub fn posture(&self) -> Posture {
        self.posture
    }

    fn safe_point(ctx: &MicroContext<'_>, unit: &Unit, point: Vec2, radius: f32) -> Option<Vec2> {
        if unit.is_flying() {
            safe_point_air(ctx.pathing, point, radius)
        } else {
            safe_point_ground(ctx.pathing, point, radius)
        }
    }

    /// Pull a badly hurt or disarmed unit out of the fight
    fn low_health_retreat(&self, ctx: &MicroContext<'_>, unit: &Unit) -> Option<CombatAction> {
        let config = &ctx.config.combat;
        if self.posture.is_retreat() || config.no_retreat_types.contains(&unit.unit_type) {
            return None;
        }
        if unit.health_fraction() >= config.retreat_health_fraction && !unit.is_weapon_disabled {
            return None;
        }

        let step_back = match ctx.nearest_enemy(unit).or_else(|| nearest_threat(ctx, unit)) {
            Some(enemy) => away_from(unit.position, enemy.position, config.retreat_step),
            None => {
                let anchor = nearest_friendly_center(ctx, unit)?;
                towards(unit.position, anchor, config.retreat_step)
            }
        };
        let safe = Self::safe_point(ctx, unit, step_back, config.retreat_search_radius)?;
        trace!(unit = unit.tag.0, health = unit.health_fraction(), "low health retreat");
        Some(CombatAction::move_to(safe).with_actor(unit.tag))
    }

    /// Step away from the unit holding a lock-on on us
    fn evade_lock_on(&self, ctx: &MicroContext<'_>, unit: &Unit) -> Option<CombatAction> {
        let source_tag = unit.locked_on_by?;
        // A lone unit does not break formation
        if ctx.group.len() <= 1 {
            return None;
        }
        let source = ctx.world.enemy_by_tag(source_tag)?;
        let distance = ctx.config.combat.lock_on_escape_distance;
        let escape = away_from(unit.position, source.position, distance);
        let step = if unit.is_flying() {
            ctx.pathing.next_step_air(unit.position, escape, distance)
        } else {
            ctx.pathing.next_step_ground(unit.position, escape, distance)
        };
        trace!(unit = unit.tag.0, source = source_tag.0, "lock-on evade");
        Some(CombatAction::move_to(step).with_actor(unit.tag))
    }

    /// Back off to a safe spot while the weapon cools down
    fn kite_step(&self, ctx: &MicroContext<'_>, unit: &Unit) -> Option<CombatAction> {
        if self.ready_to_shoot(ctx, unit) {
            return None;
        }
        let enemy = ctx.nearest_enemy(unit)?;
        if unit.gap_to(enemy) > unit.range_vs(enemy) {
            return None;
        }
        let back = away_from(unit.position, enemy.position, ctx.config.combat.retreat_step);
        let safe = Self::safe_point(ctx, unit, back, ctx.config.combat.safe_point_radius)?;
        Some(CombatAction::move_to(safe).with_actor(unit.tag))
    }
}

fn nearest_threat<'a>(ctx: &MicroContext<'a>, unit: &Unit) -> Option<&'a Unit> {
    ctx.world
        .valid_enemies()
        .filter(|e| e.can_attack(unit))
        .min_by(|a, b| unit.distance_to(a).total_cmp(&unit.distance_to(b)))
}

fn nearest_friendly_center(ctx: &MicroContext<'_>, unit: &Unit) -> Option<Vec2> {
    ctx.own_groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.center)
        .filter(|c| c.distance(unit.position) > 1.0)
        .min_by(|a, b| a.distance(unit.position).total_cmp(&b.distance(unit.position)))
}

impl MicroStep for GenericCombatModel {
    fn group_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        units: &[&Unit],
        current: CombatAction,
    ) -> CombatAction {
        self.posture = choose_posture(
            ctx.intent,
            ctx.group.center,
            ctx.target,
            ctx.engagement,
            &ctx.config.combat,
        );
        debug!(posture = ?self.posture, units = units.len(), "group posture");

        let enemy_center = ctx.engagement.closest_center;
        match self.posture {
            Posture::Idle | Posture::Retreat => current,
            Posture::Advance => CombatAction::move_to(ctx.target),
            Posture::CounterSiege | Posture::KitePush | Posture::Outranged => {
                enemy_center.map(CombatAction::attack_move).unwrap_or(current)
            }
            Posture::KiteHold => {
                let radius = ctx.config.combat.safe_point_radius;
                safe_point_ground(ctx.pathing, ctx.group.center, radius)
                    .map(CombatAction::attack_move)
                    .unwrap_or(current)
            }
            Posture::Outrange => match enemy_center {
                Some(enemy) => {
                    let merge = ctx
                        .group
                        .center
                        .lerp(enemy, ctx.config.combat.soft_merge_factor);
                    CombatAction::attack_move(merge)
                }
                None => current,
            },
        }
    }

    fn unit_solve(
        &mut self,
        ctx: &mut MicroContext<'_>,
        unit: &Unit,
        current: CombatAction,
    ) -> Option<CombatAction> {
        let current = current.with_actor(unit.tag);

        if let Some(action) = self.low_health_retreat(ctx, unit) {
            return Some(action);
        }
        if let Some(action) = self.evade_lock_on(ctx, unit) {
            return Some(action);
        }

        match self.posture {
            Posture::Retreat => Some(current),
            Posture::Advance => {
                if !self.ready_to_shoot(ctx, unit) {
                    return Some(current);
                }
                let attack = self.focus_fire(ctx, unit, CombatAction::attack_move(ctx.target));
                Some(if attack.unit().is_some() { attack } else { current })
            }
            posture if posture.is_kite() => match self.kite_step(ctx, unit) {
                Some(kite) => Some(kite),
                None => Some(self.focus_fire(ctx, unit, current)),
            },
            _ => Some(self.focus_fire(ctx, unit, current)),
        }
    }
}

//! Area-denial / shield caster (Sentinel)
//!
//! Two independent cooldowns. The personal shield is cheap and comes first
//! under direct fire. Area denial is expensive: it needs its own cooldown,
//! a quorum of allied casters that have not shielded recently, and a real
//! enemy cluster. A placement plans a short line of fields across the
//! cluster; casters arriving inside the join window take the free spots on
//! that line instead of planning a second one.

use glam::Vec2;
use tracing::debug;

use crate::combat::{ActionTarget, CombatAction};
use crate::core::config::SentinelConfig;
use crate::core::types::{GameSeconds, UnitTag};
use crate::micro::{GenericCombatModel, MicroContext, MicroStep, ThreatSnapshot};
use crate::units::{AbilityId, Unit, UnitType};

/// One planned field and the caster that took it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenialSpot {
    pub position: Vec2,
    pub caster: Option<UnitTag>,
}

/// Persisted record of the last area-denial placement
#[derive(Debug, Clone, Default)]
pub struct DenialBoard {
    pub last_placed_at: Option<GameSeconds>,
    pub spots: Vec<DenialSpot>,
    /// Fresh placements planned since start
    pub placements: usize,
}

impl DenialBoard {
    pub fn in_join_window(&self, now: GameSeconds, window: GameSeconds) -> bool {
        self.last_placed_at
            .map(|at| now - at < window)
            .unwrap_or(false)
    }

    /// Has `tag` already cast on the current placement?
    pub fn has_joined(&self, tag: UnitTag) -> bool {
        self.spots.iter().any(|s| s.caster == Some(tag))
    }

    pub fn casters(&self) -> usize {
        self.spots.iter().filter(|s| s.caster.is_some()).count()
    }

    /// Start a new placement; the planning caster takes the first spot
    fn place(&mut self, now: GameSeconds, caster: UnitTag, line: Vec<Vec2>) -> Option<Vec2> {
        self.last_placed_at = Some(now);
        self.placements += 1;
        self.spots = line
            .into_iter()
            .map(|position| DenialSpot { position, caster: None })
            .collect();
        let first = self.spots.first_mut()?;
        first.caster = Some(caster);
        Some(first.position)
    }

    /// Take the nearest free spot within `reach` of `from`
    fn claim(&mut self, caster: UnitTag, from: Vec2, reach: f32) -> Option<Vec2> {
        let spot = self
            .spots
            .iter_mut()
            .filter(|s| s.caster.is_none() && s.position.distance(from) <= reach)
            .min_by(|a, b| a.position.distance(from).total_cmp(&b.position.distance(from)))?;
        spot.caster = Some(caster);
        Some(spot.position)
    }
}

/// Field positions across a cluster at `anchor`, as seen from `caster`
///
/// The anchor comes first, then alternating steps to either side.
pub fn denial_line(caster: Vec2, anchor: Vec2, spots: usize, spacing: f32) -> Vec<Vec2> {
    let facing = (anchor - caster).try_normalize().unwrap_or(Vec2::X);
    let across = facing.perp();
    let mut line = Vec::with_capacity(spots);
    line.push(anchor);
    let mut step = 1.0;
    while line.len() < spots {
        line.push(anchor + across * spacing * step);
        if line.len() < spots {
            line.push(anchor - across * spacing * step);
        }
        step += 1.0;
    }
    line.truncate(spots);
    line
}

#[derive(Debug, Clone, Default)]
pub struct SentinelMicro {
    config: SentinelConfig,
    generic: GenericCombatModel,
    board: DenialBoard,
}

impl SentinelMicro {
    pub fn new(config: SentinelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn board(&self) -> &DenialBoard {
        &self.board
    }

    /// Enough allied casters still have their shield on cooldown budget
    fn quorum_ok(&self, ctx: &MicroContext<'_>) -> bool {
        let casters: Vec<UnitTag> = ctx.world.own_of_type(UnitType::Sentinel).map(|u| u.tag).collect();
        if casters.is_empty() {
            return true;
        }
        let fresh = casters
            .iter()
            .filter(|&&tag| {
                !ctx.cooldowns
                    .used_within(tag, AbilityId::PersonalShield, self.config.shield_recent_window)
            })
            .count();
        fresh as f32 / casters.len() as f32 >= self.config.shield_quorum
    }

    /// Enemy position with the densest cluster in cast range, if dense enough
    fn cluster_point(&self, ctx: &MicroContext<'_>, unit: &Unit) -> Option<Vec2> {
        let candidates: Vec<&Unit> = ctx
            .world
            .enemies_in_radius(unit.position, AbilityId::AreaDenial.cast_range())
            .filter(|e| !e.is_flying() && !e.data().is_structure)
            .collect();
        candidates
            .iter()
            .map(|anchor| {
                let count = candidates
                    .iter()
                    .filter(|e| e.position.distance(anchor.position) <= self.config.denial_cluster_radius)
                    .count();
                (anchor, count)
            })
            .filter(|(_, count)| *count >= self.config.denial_min_enemies)
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.tag.cmp(&a.0.tag)))
            .map(|(anchor, _)| anchor.position)
    }

    fn under_direct_threat(&self, ctx: &MicroContext<'_>, unit: &Unit) -> bool {
        ThreatSnapshot::around(ctx.world, unit.position, self.config.shield_threat_radius)
            .threats_to(unit)
            .any(|e| e.in_weapon_range(unit, 1.0))
    }

    fn cast(&self, ctx: &mut MicroContext<'_>, unit: &Unit, position: Vec2) -> CombatAction {
        ctx.cooldowns.used(unit.tag, AbilityId::AreaDenial);
        CombatAction::ability(AbilityId::AreaDenial, ActionTarget::Point(position)).with_actor(unit.tag)
    }
}

impl MicroStep for SentinelMicro {
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
        if ctx.intent.is_retreat() {
            return self.generic.unit_solve(ctx, unit, current);
        }

        let shield = AbilityId::PersonalShield;
        if unit.energy >= shield.energy_cost()
            && ctx.cooldowns.is_ready(unit.tag, shield, shield.cooldown())
            && self.under_direct_threat(ctx, unit)
        {
            ctx.cooldowns.used(unit.tag, shield);
            debug!(unit = unit.tag.0, "personal shield");
            return Some(CombatAction::ability(shield, ActionTarget::Unit(unit.tag)).with_actor(unit.tag));
        }

        let denial = AbilityId::AreaDenial;
        let can_cast = unit.energy >= denial.energy_cost()
            && ctx.cooldowns.is_ready(unit.tag, denial, denial.cooldown());
        if can_cast {
            if self.board.in_join_window(ctx.now, self.config.join_window) {
                if !self.board.has_joined(unit.tag) {
                    if let Some(position) = self.board.claim(unit.tag, unit.position, denial.cast_range()) {
                        debug!(unit = unit.tag.0, x = position.x, y = position.y, "joins area denial");
                        return Some(self.cast(ctx, unit, position));
                    }
                }
            } else if self.quorum_ok(ctx) {
                if let Some(anchor) = self.cluster_point(ctx, unit) {
                    let line = denial_line(
                        unit.position,
                        anchor,
                        self.config.denial_line_spots,
                        self.config.denial_spacing,
                    );
                    if let Some(position) = self.board.place(ctx.now, unit.tag, line) {
                        debug!(unit = unit.tag.0, x = position.x, y = position.y, "area denial");
                        return Some(self.cast(ctx, unit, position));
                    }
                }
            }
        }

        self.generic.unit_solve(ctx, unit, current)
    }
}

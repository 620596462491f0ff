//! Attack target selection

use glam::Vec2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::AttackConfig;
use crate::core::types::ZoneId;
use crate::services::{PathingService, WorldSnapshot};
use crate::zones::ZoneMap;

/// Where the attack is headed and why
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackTarget {
    /// Enemy structure close to our home
    Proxy(Vec2),
    /// Best-scored known enemy zone
    Zone(ZoneId, Vec2),
    /// Nearest known enemy unit when no zone is known
    Unit(Vec2),
    /// Last resort: where the enemy started
    EnemyStart(Vec2),
}

impl AttackTarget {
    pub fn position(&self) -> Vec2 {
        match *self {
            AttackTarget::Proxy(p)
            | AttackTarget::Zone(_, p)
            | AttackTarget::Unit(p)
            | AttackTarget::EnemyStart(p) => p,
        }
    }

    /// Targets with known structures get a committed assault
    pub fn is_structure_target(&self) -> bool {
        matches!(self, AttackTarget::Proxy(_) | AttackTarget::Zone(..))
    }
}

/// Pick the attack target for this tick
///
/// Proxies near home come first. Otherwise each known enemy zone is scored
/// by path distance from home plus a penalty per unit of static defense,
/// lowest score wins. Straight-line distance stands in when pathing has no
/// answer.
pub fn select_target(
    world: &WorldSnapshot,
    zones: &ZoneMap,
    pathing: &dyn PathingService,
    config: &AttackConfig,
) -> Option<AttackTarget> {
    let home = world.home;

    let proxy = world
        .enemy_structures()
        .map(|u| u.position)
        .filter(|p| p.distance(home) <= config.proxy_radius)
        .filter(|p| zones.zone_at(*p).map_or(true, |z| !z.is_enemy_start))
        .min_by_key(|p| OrderedFloat(p.distance(home)));
    if let Some(p) = proxy {
        return Some(AttackTarget::Proxy(p));
    }

    let zone = zones
        .zones
        .iter()
        .filter(|z| !z.enemy_structures.is_empty())
        .map(|z| {
            let distance = pathing
                .path_distance(home, z.center)
                .unwrap_or_else(|| home.distance(z.center));
            let score = distance + config.static_defense_penalty * z.static_defense_power.total;
            (z, score)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
    if let Some((z, _)) = zone {
        return Some(AttackTarget::Zone(z.id, z.center));
    }

    let unit = world
        .known_enemies()
        .filter(|u| u.unit_type.is_army() || u.unit_type.is_worker())
        .map(|u| u.position)
        .min_by_key(|p| OrderedFloat(p.distance(home)));
    if let Some(p) = unit {
        return Some(AttackTarget::Unit(p));
    }

    zones.enemy_start().map(|z| AttackTarget::EnemyStart(z.center))
}

//! Per-zone defense assignments
//!
//! Runs alongside the attack state machine. Each own zone under assault
//! gets the nearest available units until they are enough for the assault;
//! the assignment holds until the zone has been quiet for the debounce
//! window.

use std::collections::BTreeMap;

use ahash::AHashSet;
use glam::Vec2;
use ordered_float::OrderedFloat;
use tracing::info;

use crate::core::config::DefenseConfig;
use crate::core::types::{GameSeconds, UnitTag, ZoneId};
use crate::power::PowerVector;
use crate::services::WorldSnapshot;
use crate::units::Unit;
use crate::zones::ZoneMap;

#[derive(Debug, Clone, Default)]
struct Assignment {
    units: Vec<UnitTag>,
    last_threat_at: GameSeconds,
    /// Where the assault was last seen
    focus: Vec2,
    /// Assigned power is not enough for the assault
    unmet: bool,
}

/// Defenders sent to one zone this tick
#[derive(Debug, Clone, PartialEq)]
pub struct DefenseOrder {
    pub zone: ZoneId,
    pub target: Vec2,
    pub units: Vec<UnitTag>,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneDefense {
    assignments: BTreeMap<ZoneId, Assignment>,
}

impl ZoneDefense {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit currently assigned to some zone
    pub fn defenders(&self) -> AHashSet<UnitTag> {
        self.assignments
            .values()
            .flat_map(|a| a.units.iter().copied())
            .collect()
    }

    pub fn is_defending(&self, zone: ZoneId) -> bool {
        self.assignments.contains_key(&zone)
    }

    /// Some zone is under assault and its defenders are not enough
    pub fn has_unmet_threat(&self) -> bool {
        self.assignments.values().any(|a| a.unmet)
    }

    /// Update assignments and return one order per defended zone
    ///
    /// `available` are own army units free to be pulled into defense, in the
    /// order the caller prefers. Units already assigned stay assigned while
    /// they live.
    pub fn update(
        &mut self,
        world: &WorldSnapshot,
        zones: &ZoneMap,
        available: &[&Unit],
        config: &DefenseConfig,
    ) -> Vec<DefenseOrder> {
        let now = world.time;
        let alive: AHashSet<UnitTag> = world.own_units.iter().map(|u| u.tag).collect();
        for assignment in self.assignments.values_mut() {
            assignment.units.retain(|tag| alive.contains(tag));
        }

        let mut taken = self.defenders();

        for zone in zones.own_zones() {
            if !zone.is_under_assault() {
                continue;
            }
            let focus = world
                .enemies_in_radius(zone.center, zone.radius)
                .filter(|u| u.unit_type.is_army())
                .map(|u| u.position)
                .min_by_key(|p| OrderedFloat(p.distance(zone.center)))
                .unwrap_or(zone.center);

            let assignment = self.assignments.entry(zone.id).or_insert_with(|| {
                info!(zone = zone.id.0, power = zone.assaulting_enemy_power.total, "zone under assault");
                Assignment::default()
            });
            assignment.last_threat_at = now;
            assignment.focus = focus;

            let mut power: PowerVector = assignment
                .units
                .iter()
                .filter_map(|tag| world.own_by_tag(*tag))
                .map(PowerVector::of_unit)
                .sum();

            let mut candidates: Vec<&Unit> = available
                .iter()
                .copied()
                .filter(|u| !taken.contains(&u.tag))
                .collect();
            candidates.sort_by_key(|u| (OrderedFloat(u.position.distance(focus)), u.tag));

            for unit in candidates {
                if power.is_enough_for_margin(&zone.assaulting_enemy_power, config.defend_margin) {
                    break;
                }
                power.add_unit(unit, 1.0);
                assignment.units.push(unit.tag);
                taken.insert(unit.tag);
            }
            assignment.unmet = !power.is_enough_for_margin(&zone.assaulting_enemy_power, config.defend_margin);
        }

        self.assignments.retain(|zone, assignment| {
            let quiet_for = now - assignment.last_threat_at;
            let keep = quiet_for < config.clear_debounce;
            if !keep {
                info!(zone = zone.0, "zone clear, releasing defenders");
            }
            keep
        });

        // A zone that went quiet this tick is no longer short on defenders
        for (zone, assignment) in self.assignments.iter_mut() {
            let assaulted = zones.get(*zone).map(|z| z.is_under_assault()).unwrap_or(false);
            if !assaulted {
                assignment.unmet = false;
            }
        }

        self.assignments
            .iter()
            .filter(|(_, a)| !a.units.is_empty())
            .map(|(zone, a)| DefenseOrder {
                zone: *zone,
                target: a.focus,
                units: a.units.clone(),
            })
            .collect()
    }
}

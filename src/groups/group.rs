//! UnitGroup - one tick's view of a cluster of units
//!
//! Built from the current roster every tick and never mutated afterwards.
//! Center, power and speed are computed once at construction.

use glam::Vec2;

use crate::core::config::EngagementTuning;
use crate::core::types::UnitTag;
use crate::power::PowerVector;
use crate::units::Unit;

const MEDIAN_EPSILON: f32 = 1e-4;

/// Geometric median of `points` by Weiszfeld iteration from the centroid
///
/// Empty input yields the origin.
pub fn geometric_median(points: &[Vec2], iterations: usize) -> Vec2 {
    match points.len() {
        0 => return Vec2::ZERO,
        1 => return points[0],
        _ => {}
    }

    let mut guess = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    for _ in 0..iterations {
        let mut numerator = Vec2::ZERO;
        let mut denominator = 0.0;
        for &p in points {
            let d = p.distance(guess);
            if d < MEDIAN_EPSILON {
                continue;
            }
            numerator += p / d;
            denominator += 1.0 / d;
        }
        if denominator <= 0.0 {
            break;
        }
        let next = numerator / denominator;
        let moved = next.distance(guess);
        guess = next;
        if moved < MEDIAN_EPSILON {
            break;
        }
    }
    guess
}

/// Immutable per-tick snapshot of a tactical group
#[derive(Debug, Clone)]
pub struct UnitGroup {
    pub units: Vec<Unit>,
    pub center: Vec2,
    /// Indices into `units` of the non-flying members
    ground: Vec<usize>,
    pub power: PowerVector,
    pub average_speed: f32,
}

impl UnitGroup {
    pub fn new(units: Vec<Unit>, tuning: &EngagementTuning) -> Self {
        let ground: Vec<usize> = units
            .iter()
            .enumerate()
            .filter(|(_, u)| !u.is_flying())
            .map(|(i, _)| i)
            .collect();

        let positions: Vec<Vec2> = units.iter().map(|u| u.position).collect();
        let median = geometric_median(&positions, tuning.median_iterations);

        // Snap to a ground unit so the anchor stays pathable
        let center = ground
            .iter()
            .map(|&i| units[i].position)
            .min_by(|a, b| a.distance_squared(median).total_cmp(&b.distance_squared(median)))
            .unwrap_or(median);

        let power = PowerVector::of_units(units.iter());
        let average_speed = if units.is_empty() {
            0.0
        } else {
            units.iter().map(|u| u.speed()).sum::<f32>() / units.len() as f32
        };

        Self {
            units,
            center,
            ground,
            power,
            average_speed,
        }
    }

    pub fn empty() -> Self {
        Self {
            units: Vec::new(),
            center: Vec2::ZERO,
            ground: Vec::new(),
            power: PowerVector::new(),
            average_speed: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = UnitTag> + '_ {
        self.units.iter().map(|u| u.tag)
    }

    pub fn contains(&self, tag: UnitTag) -> bool {
        self.units.iter().any(|u| u.tag == tag)
    }

    /// Non-flying members
    pub fn ground_units(&self) -> impl Iterator<Item = &Unit> {
        self.ground.iter().map(move |&i| &self.units[i])
    }

    /// Can any member of this group hit any member of `other`?
    pub fn can_damage(&self, other: &UnitGroup) -> bool {
        self.units
            .iter()
            .any(|u| other.units.iter().any(|o| o.is_valid_target() && u.can_attack(o)))
    }

    /// Nearest group in `others` this group can damage, within `max_distance`
    pub fn closest_target_group(&self, others: &[UnitGroup], max_distance: f32) -> Option<usize> {
        others
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_empty() && self.can_damage(g))
            .map(|(i, g)| (i, self.center.distance(g.center)))
            .filter(|(_, d)| *d <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Are the two groups fighting each other?
    ///
    /// Cheap center-distance cutoffs outside the ambiguous band; inside it,
    /// an exact per-pair range test weighted by power.
    pub fn is_in_combat(&self, other: &UnitGroup, tuning: &EngagementTuning) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let distance = self.center.distance(other.center);
        if distance > tuning.combat_far_distance {
            return false;
        }
        if distance < tuning.combat_near_distance {
            return true;
        }

        let mut engaged = 0.0;
        let mut any_engaged = false;
        for unit in &self.units {
            let in_reach = other.units.iter().any(|o| {
                unit.in_weapon_range(o, tuning.range_margin)
                    || (o.is_valid_target() && o.in_weapon_range(unit, tuning.range_margin))
            });
            if in_reach {
                any_engaged = true;
                engaged += PowerVector::of_unit(unit).total;
            }
        }

        if self.power.total <= 0.0 {
            return any_engaged;
        }
        engaged > self.power.total * tuning.engaged_power_fraction
    }

    /// Mean member distance from the center
    pub fn mean_spread(&self) -> f32 {
        if self.units.is_empty() {
            return 0.0;
        }
        self.units
            .iter()
            .map(|u| u.position.distance(self.center))
            .sum::<f32>()
            / self.units.len() as f32
    }

    /// Members scattered further than a size-scaled limit
    pub fn is_too_spread(&self, tuning: &EngagementTuning) -> bool {
        let limit = tuning.spread_base + tuning.spread_per_unit * (self.units.len() as f32).sqrt();
        self.mean_spread() > limit
    }
}

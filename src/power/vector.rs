//! PowerVector accumulation and comparison

use std::iter::Sum;

use derive_more::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};

use crate::units::{Unit, UnitType};

/// Margin used by `is_enough_for` when none is given
pub const DEFAULT_ENOUGH_MARGIN: f32 = 1.1;

/// A force below this total is never "enough", whatever it faces
pub const MIN_POWER_FLOOR: f32 = 1.0;

/// Health scalar in [0.5, 1.0].
///
/// A damaged unit keeps at least half its threat until it is destroyed.
pub fn health_scalar(health_fraction: f32) -> f32 {
    0.5 + 0.5 * health_fraction.clamp(0.0, 1.0)
}

/// Combat value broken down by what it can hit and what it is
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    MulAssign,
)]
pub struct PowerVector {
    pub total: f32,
    /// Power that can shoot air targets
    pub air_power: f32,
    /// Power that can shoot ground targets
    pub ground_power: f32,
    /// Power carried by flying units
    pub air_presence: f32,
    /// Power carried by ground units
    pub ground_presence: f32,
    pub melee_power: f32,
    pub siege_power: f32,
    pub detectors: f32,
    pub stealth_power: f32,
}

impl PowerVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power of a single unit
    pub fn of_unit(unit: &Unit) -> Self {
        let mut power = Self::new();
        power.add_unit(unit, 1.0);
        power
    }

    /// Power of a set of units
    pub fn of_units<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        let mut power = Self::new();
        power.add_units(units);
        power
    }

    /// Add `count` copies of `unit`, scaled by its current health
    pub fn add_unit(&mut self, unit: &Unit, count: f32) {
        let scalar = health_scalar(unit.health_fraction());
        self.add_type(unit.unit_type, count * scalar);
    }

    pub fn add_units<'a>(&mut self, units: impl IntoIterator<Item = &'a Unit>) {
        for unit in units {
            self.add_unit(unit, 1.0);
        }
    }

    /// Add `count` full-health units of `unit_type`
    ///
    /// Static defenses count like any armed ground unit: they must be beaten
    /// with ground power, so the structure tag adds no separate weight.
    /// Unarmed structures carry zero power and drop out below.
    pub fn add_type(&mut self, unit_type: UnitType, count: f32) {
        let data = unit_type.data();

        if data.is_detector {
            self.detectors += count;
        }

        let power = data.power * count;
        if power <= 0.0 {
            return;
        }

        self.total += power;
        if data.ground_range > 0.0 {
            self.ground_power += power;
        }
        if data.air_range > 0.0 {
            self.air_power += power;
        }
        if data.is_flying {
            self.air_presence += power;
        } else {
            self.ground_presence += power;
        }
        if data.is_melee {
            self.melee_power += power;
        }
        if data.is_siege {
            self.siege_power += power;
        }
        if data.is_cloaked {
            self.stealth_power += power;
        }
    }

    pub fn add_power(&mut self, other: &PowerVector) {
        *self += *other;
    }

    /// Component-wise subtraction; may go negative, never persist the result
    pub fn subtract_power(&mut self, other: &PowerVector) {
        *self -= *other;
    }

    pub fn multiply(&mut self, factor: f32) {
        *self *= factor;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_zero(&self) -> bool {
        self.total <= 0.0 && self.detectors <= 0.0
    }

    /// Is this force enough to beat `other` with the default margin?
    pub fn is_enough_for(&self, other: &PowerVector) -> bool {
        self.is_enough_for_margin(other, DEFAULT_ENOUGH_MARGIN)
    }

    /// Is this force enough to beat `other`, with `margin` slack on our side?
    ///
    /// Needs the power floor, enough anti-air for their air, enough
    /// anti-ground for their ground, and enough total.
    pub fn is_enough_for_margin(&self, other: &PowerVector, margin: f32) -> bool {
        if self.total < MIN_POWER_FLOOR {
            return false;
        }
        self.air_power * margin >= other.air_presence
            && self.ground_power * margin >= other.ground_presence
            && self.total * margin >= other.total
    }

    /// Share of total power that is siege
    pub fn siege_ratio(&self) -> f32 {
        if self.total <= 0.0 {
            0.0
        } else {
            self.siege_power / self.total
        }
    }
}

impl Sum for PowerVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}

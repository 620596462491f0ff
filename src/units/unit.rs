//! Per-tick unit snapshot
//!
//! Built by the ingestion layer every frame. The engine never mutates a
//! snapshot; it only reads it to decide the next command.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitTag;
use crate::units::ability::AbilityId;
use crate::units::unit_type::{UnitType, UnitTypeData};

/// One unit as observed this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub tag: UnitTag,
    pub unit_type: UnitType,
    pub position: Vec2,

    pub health: f32,
    pub health_max: f32,
    pub shield: f32,
    pub shield_max: f32,
    pub energy: f32,
    /// Seconds until the weapon can fire again (0 = ready)
    pub weapon_cooldown: f32,

    /// Last-known position of a unit no longer in vision
    pub is_memory: bool,
    pub is_hallucination: bool,
    /// Weapons temporarily disabled (e.g. by an enemy effect)
    pub is_weapon_disabled: bool,
    /// Enemy unit holding a lock-on debuff on this unit
    pub locked_on_by: Option<UnitTag>,
    /// Unit currently targeted by this unit's attack order
    pub order_target: Option<UnitTag>,
    /// Ability this unit is currently casting or channelling
    pub active_ability: Option<AbilityId>,
    /// Channel weapon currently switched on
    pub is_channeling: bool,
}

impl Unit {
    /// Fresh, fully healthy unit
    pub fn new(tag: UnitTag, unit_type: UnitType, position: Vec2) -> Self {
        let data = unit_type.data();
        Self {
            tag,
            unit_type,
            position,
            health: data.health_max,
            health_max: data.health_max,
            shield: data.shield_max,
            shield_max: data.shield_max,
            energy: 0.0,
            weapon_cooldown: 0.0,
            is_memory: false,
            is_hallucination: false,
            is_weapon_disabled: false,
            locked_on_by: None,
            order_target: None,
            active_ability: None,
            is_channeling: false,
        }
    }

    /// Scale health and shield to the given combined fraction
    pub fn with_health_fraction(mut self, fraction: f32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        self.health = self.health_max * fraction;
        self.shield = self.shield_max * fraction;
        self
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_weapon_cooldown(mut self, cooldown: f32) -> Self {
        self.weapon_cooldown = cooldown;
        self
    }

    pub fn data(&self) -> &'static UnitTypeData {
        self.unit_type.data()
    }

    pub fn is_flying(&self) -> bool {
        self.data().is_flying
    }

    pub fn radius(&self) -> f32 {
        self.data().radius
    }

    pub fn speed(&self) -> f32 {
        self.data().speed
    }

    /// Health plus shield
    pub fn effective_health(&self) -> f32 {
        self.health + self.shield
    }

    /// Combined health+shield fraction in [0, 1]
    pub fn health_fraction(&self) -> f32 {
        let max = self.health_max + self.shield_max;
        if max <= 0.0 {
            return 1.0;
        }
        (self.effective_health() / max).clamp(0.0, 1.0)
    }

    /// Real, currently visible unit (not a memory or hallucination)
    pub fn is_valid_target(&self) -> bool {
        !self.is_memory && !self.is_hallucination
    }

    /// Weapon range against `other` (0 = cannot hit it)
    pub fn range_vs(&self, other: &Unit) -> f32 {
        self.unit_type.range_vs(other.unit_type)
    }

    pub fn can_attack(&self, other: &Unit) -> bool {
        !self.is_weapon_disabled && self.range_vs(other) > 0.0
    }

    pub fn distance_to(&self, other: &Unit) -> f32 {
        self.position.distance(other.position)
    }

    /// Edge-to-edge gap between the two unit footprints
    pub fn gap_to(&self, other: &Unit) -> f32 {
        (self.distance_to(other) - self.radius() - other.radius()).max(0.0)
    }

    /// `other` is within weapon range plus `margin`
    pub fn in_weapon_range(&self, other: &Unit, margin: f32) -> bool {
        self.can_attack(other) && self.gap_to(other) <= self.range_vs(other) + margin
    }

    /// Weapon cooldown is at or below `allowance`
    pub fn weapon_ready(&self, allowance: f32) -> bool {
        !self.is_weapon_disabled && self.weapon_cooldown <= allowance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(unit_type: UnitType, x: f32, y: f32) -> Unit {
        Unit::new(UnitTag(1), unit_type, Vec2::new(x, y))
    }

    #[test]
    fn test_new_unit_is_full_health() {
        let u = unit(UnitType::Ranger, 0.0, 0.0);
        assert_eq!(u.health_fraction(), 1.0);
        assert_eq!(u.effective_health(), 160.0);
    }

    #[test]
    fn test_health_fraction_combines_shield() {
        let u = unit(UnitType::Ranger, 0.0, 0.0).with_health_fraction(0.25);
        assert!((u.health_fraction() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_memory_and_hallucination_are_not_targets() {
        let mut u = unit(UnitType::Rifleman, 0.0, 0.0);
        assert!(u.is_valid_target());
        u.is_memory = true;
        assert!(!u.is_valid_target());
        u.is_memory = false;
        u.is_hallucination = true;
        assert!(!u.is_valid_target());
    }

    #[test]
    fn test_weapon_range_uses_footprints() {
        let a = unit(UnitType::Rifleman, 0.0, 0.0);
        let b = unit(UnitType::Rifleman, 5.7, 0.0);
        // 5.7 center distance - 0.75 footprints = 4.95 gap
        assert!(a.in_weapon_range(&b, 0.0));
        let c = unit(UnitType::Rifleman, 6.5, 0.0);
        assert!(!a.in_weapon_range(&c, 0.0));
    }

    #[test]
    fn test_ground_only_cannot_hit_air() {
        let tank = unit(UnitType::Juggernaut, 0.0, 0.0);
        let gunship = unit(UnitType::Gunship, 1.0, 0.0);
        assert!(!tank.can_attack(&gunship));
        assert!(!tank.in_weapon_range(&gunship, 10.0));
    }

    #[test]
    fn test_disabled_weapon_is_never_ready() {
        let mut u = unit(UnitType::Rifleman, 0.0, 0.0);
        assert!(u.weapon_ready(0.0));
        u.is_weapon_disabled = true;
        assert!(!u.weapon_ready(0.0));
    }
}

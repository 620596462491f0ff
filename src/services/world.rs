//! Unit snapshot service - own and known enemy units for one tick

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::{GameSeconds, UnitTag};
use crate::units::{Unit, UnitType};

/// Everything the engine knows about the field this tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: GameSeconds,
    pub own_units: Vec<Unit>,
    /// Known enemy units, including stale memories and hallucinations
    pub enemy_units: Vec<Unit>,
    pub supply_used: f32,
    /// Main base position
    pub home: Vec2,
    /// Where idle and retreating units gather
    pub rally_point: Vec2,
    /// Expansion site the economy layer wants escorted, if any
    pub expansion_target: Option<Vec2>,
}

impl WorldSnapshot {
    pub fn new(time: GameSeconds) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Own mobile army units (no workers, no structures)
    pub fn own_army(&self) -> impl Iterator<Item = &Unit> {
        self.own_units.iter().filter(|u| u.unit_type.is_army())
    }

    pub fn own_of_type(&self, unit_type: UnitType) -> impl Iterator<Item = &Unit> {
        self.own_units.iter().filter(move |u| u.unit_type == unit_type)
    }

    pub fn own_by_tag(&self, tag: UnitTag) -> Option<&Unit> {
        self.own_units.iter().find(|u| u.tag == tag)
    }

    pub fn enemy_by_tag(&self, tag: UnitTag) -> Option<&Unit> {
        self.enemy_units.iter().find(|u| u.tag == tag)
    }

    /// Enemy units that can actually be shot at this tick
    pub fn valid_enemies(&self) -> impl Iterator<Item = &Unit> {
        self.enemy_units.iter().filter(|u| u.is_valid_target())
    }

    /// Enemies believed to exist (memories included, hallucinations excluded)
    pub fn known_enemies(&self) -> impl Iterator<Item = &Unit> {
        self.enemy_units.iter().filter(|u| !u.is_hallucination)
    }

    pub fn enemies_in_radius(&self, point: Vec2, radius: f32) -> impl Iterator<Item = &Unit> {
        self.valid_enemies()
            .filter(move |u| u.position.distance(point) <= radius)
    }

    pub fn enemy_structures(&self) -> impl Iterator<Item = &Unit> {
        self.known_enemies().filter(|u| u.data().is_structure)
    }
}

//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game-assigned unit identifier, stable for the unit's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTag(pub u64);

/// Zone identifier (index into the zone map)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

/// Game time in seconds
pub type GameSeconds = f32;

/// Simulation frame counter
pub type Tick = u64;

/// Point `distance` units from `from` in the direction of `to`.
///
/// Returns `from` when the two points coincide.
pub fn towards(from: Vec2, to: Vec2, distance: f32) -> Vec2 {
    from + (to - from).normalize_or_zero() * distance
}

/// Point `distance` units from `from`, directly away from `threat`.
pub fn away_from(from: Vec2, threat: Vec2, distance: f32) -> Vec2 {
    from + (from - threat).normalize_or_zero() * distance
}

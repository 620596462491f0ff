//! Tactical groups: per-tick unit clusters with aggregate state

pub mod cluster;
pub mod group;

pub use cluster::{build_groups, group_units};
pub use group::{geometric_median, UnitGroup};

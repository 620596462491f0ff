//! Unit vocabulary: the representative roster, per-type static data,
//! abilities, and the per-tick unit snapshot the engine reads.

pub mod ability;
pub mod unit;
pub mod unit_type;

pub use ability::AbilityId;
pub use unit::Unit;
pub use unit_type::{UnitType, UnitTypeData};

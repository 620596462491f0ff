//! Power model - scalar/vector combat value estimates
//!
//! Power is a type-weighted, health-scaled proxy for fighting strength,
//! not a literal game statistic. Every layer above compares forces with it.

pub mod vector;

pub use vector::{health_scalar, PowerVector, DEFAULT_ENOUGH_MARGIN, MIN_POWER_FLOOR};

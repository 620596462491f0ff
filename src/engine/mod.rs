//! Engine facade - one call per game tick

pub mod tactical;

pub use tactical::{TacticalEngine, TickReport};

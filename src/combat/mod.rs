//! Group combat layer
//!
//! Takes a target and intent for a set of units, groups them, and asks the
//! registered micro strategies for at most one command per unit.

pub mod action;
pub mod intent;
pub mod manager;

pub use action::{ActionTarget, CombatAction};
pub use intent::MovementIntent;
pub use manager::{CombatManager, CombatOrder};

//! Ability-driven strategies that override the generic combat model
//!
//! Each one keys off the shared cooldown ledger and a fresh local threat
//! snapshot, and hands the unit to an embedded generic model whenever it has
//! nothing better to do.

pub mod beam;
pub mod denial;
pub mod lift;

pub use beam::LancerMicro;
pub use denial::{denial_line, DenialBoard, DenialSpot, SentinelMicro};
pub use lift::{lift_priority, WardenMicro};

//! Zone layer: ownership, threat bookkeeping, defense, and the
//! attack / retreat state machine.

pub mod attack;
pub mod defense;
pub mod targeting;
pub mod zone;

pub use attack::{AttackOrchestrator, AttackPlan, AttackStatus, StatusTransition};
pub use defense::{DefenseOrder, ZoneDefense};
pub use targeting::{select_target, AttackTarget};
pub use zone::{Zone, ZoneMap, ZoneOwner};

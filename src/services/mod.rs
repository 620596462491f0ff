//! Inbound services consumed every tick
//!
//! The engine treats these as collaborators: a world snapshot, a pathing
//! oracle and an ability-cooldown ledger. All are synchronous and in-process.

pub mod cooldowns;
pub mod pathing;
pub mod world;

pub use cooldowns::CooldownTracker;
pub use pathing::{safe_point_air, safe_point_ground, NoPathing, PathingService, ThreatFieldPathing};
pub use world::WorldSnapshot;

//! Vanguard - Combat Decision Engine for Real-Time Strategy Agents
//!
//! Reads one snapshot of the field per tick and returns the unit commands
//! for that tick. The pipeline runs power estimation, grouping, engagement
//! detection, per-type micro, and the attack / retreat state machine.

pub mod combat;
pub mod core;
pub mod engagement;
pub mod engine;
pub mod groups;
pub mod micro;
pub mod power;
pub mod services;
pub mod units;
pub mod zones;

pub use crate::core::{Result, VanguardConfig, VanguardError};
pub use crate::engine::{TacticalEngine, TickReport};

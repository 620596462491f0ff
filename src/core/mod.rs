pub mod config;
pub mod error;
pub mod types;

pub use config::VanguardConfig;
pub use error::{Result, VanguardError};
pub use types::{GameSeconds, Tick, UnitTag, ZoneId};

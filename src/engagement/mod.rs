//! Engagement classification for tactical groups

pub mod context;

pub use context::{build_contexts, EngagementContext};

//! Timestamp-based ability cooldown ledger
//!
//! Every "wait" is `now - last_used < cooldown`. Nothing is scheduled.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{GameSeconds, UnitTag};
use crate::units::AbilityId;

/// Last-use timestamps per (unit, ability)
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    now: GameSeconds,
    last_used: AHashMap<(UnitTag, AbilityId), GameSeconds>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current game time; called once at the start of every tick
    pub fn advance_to(&mut self, now: GameSeconds) {
        self.now = now;
    }

    pub fn now(&self) -> GameSeconds {
        self.now
    }

    /// Has `cooldown` elapsed since `tag` last used `ability`?
    pub fn is_ready(&self, tag: UnitTag, ability: AbilityId, cooldown: GameSeconds) -> bool {
        match self.last_used.get(&(tag, ability)) {
            None => true,
            Some(&at) => self.now - at >= cooldown,
        }
    }

    /// Record that `tag` used `ability` now
    pub fn used(&mut self, tag: UnitTag, ability: AbilityId) {
        self.last_used.insert((tag, ability), self.now);
    }

    pub fn last_used(&self, tag: UnitTag, ability: AbilityId) -> Option<GameSeconds> {
        self.last_used.get(&(tag, ability)).copied()
    }

    /// Did `tag` use `ability` within the last `window` seconds?
    pub fn used_within(&self, tag: UnitTag, ability: AbilityId, window: GameSeconds) -> bool {
        self.last_used(tag, ability)
            .map(|at| self.now - at < window)
            .unwrap_or(false)
    }

    /// Drop entries for units that no longer exist
    pub fn retain_units(&mut self, alive: &AHashSet<UnitTag>) {
        self.last_used.retain(|(tag, _), _| alive.contains(tag));
    }

    pub fn len(&self) -> usize {
        self.last_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_used.is_empty()
    }
}

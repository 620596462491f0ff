//! Movement intent handed down by the orchestrator

use serde::{Deserialize, Serialize};

/// How a group should move toward its assigned target this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementIntent {
    /// Roam and engage whatever is found
    #[default]
    SearchAndDestroy,
    /// Commit to the target
    Assault,
    /// Advance to a forward point, fighting only opportunistically
    Push,
    /// Orderly fallback to the rally point
    DefensiveRetreat,
    /// Disengage at all costs
    PanicRetreat,
    /// Hit and run
    Harass,
    /// Gather at the target before doing anything else
    Regroup,
}

impl MovementIntent {
    pub fn is_retreat(&self) -> bool {
        matches!(self, MovementIntent::DefensiveRetreat | MovementIntent::PanicRetreat)
    }

    /// Does the group command for this intent carry an attack?
    pub fn is_aggressive(&self) -> bool {
        matches!(
            self,
            MovementIntent::SearchAndDestroy
                | MovementIntent::Assault
                | MovementIntent::Push
                | MovementIntent::Harass
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retreat_intents() {
        assert!(MovementIntent::PanicRetreat.is_retreat());
        assert!(MovementIntent::DefensiveRetreat.is_retreat());
        assert!(!MovementIntent::Regroup.is_retreat());
        assert!(!MovementIntent::Regroup.is_aggressive());
    }
}

//! Abilities the specialized strategies can invoke

use serde::{Deserialize, Serialize};

use crate::core::types::GameSeconds;

/// Castable abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    /// Switch the channel weapon on
    BeamOn,
    /// Switch the channel weapon off
    BeamOff,
    /// Lift a ground unit out of the fight
    Lift,
    /// Cheap damage-reduction aura around the caster
    PersonalShield,
    /// Costly impassable field on the ground
    AreaDenial,
}

impl AbilityId {
    /// Energy spent on cast
    pub fn energy_cost(&self) -> f32 {
        match self {
            AbilityId::BeamOn => 25.0,
            AbilityId::BeamOff => 0.0,
            AbilityId::Lift => 50.0,
            AbilityId::PersonalShield => 25.0,
            AbilityId::AreaDenial => 50.0,
        }
    }

    /// Seconds before the same unit may cast again
    pub fn cooldown(&self) -> GameSeconds {
        match self {
            AbilityId::BeamOn | AbilityId::BeamOff => 1.0,
            AbilityId::Lift => 1.5,
            AbilityId::PersonalShield => 11.0,
            AbilityId::AreaDenial => 3.0,
        }
    }

    /// Maximum cast distance (0 = self cast)
    pub fn cast_range(&self) -> f32 {
        match self {
            AbilityId::BeamOn | AbilityId::BeamOff | AbilityId::PersonalShield => 0.0,
            AbilityId::Lift => 4.0,
            AbilityId::AreaDenial => 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shield_cheaper_than_denial() {
        assert!(AbilityId::PersonalShield.energy_cost() < AbilityId::AreaDenial.energy_cost());
    }

    #[test]
    fn test_beam_off_is_free() {
        assert_eq!(AbilityId::BeamOff.energy_cost(), 0.0);
    }
}

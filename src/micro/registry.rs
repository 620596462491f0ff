//! Unit type -> strategy lookup with a mandatory fallback

use ahash::AHashMap;

use crate::core::config::VanguardConfig;
use crate::micro::{GenericCombatModel, LancerMicro, MicroStep, NoMicro, SentinelMicro, WardenMicro};
use crate::units::UnitType;

/// Strategies keyed by unit type
///
/// Types without an entry use the fallback, which is the generic combat
/// model unless replaced.
pub struct MicroRegistry {
    strategies: AHashMap<UnitType, Box<dyn MicroStep>>,
    fallback: Box<dyn MicroStep>,
}

impl MicroRegistry {
    /// Empty registry; everything goes to the generic model
    pub fn new() -> Self {
        Self {
            strategies: AHashMap::new(),
            fallback: Box::new(GenericCombatModel::new()),
        }
    }

    /// Registry with the specialized strategies for the shipped roster
    pub fn with_defaults(config: &VanguardConfig) -> Self {
        let mut registry = Self::new();
        registry.register(UnitType::Lancer, Box::new(LancerMicro::new(config.casters.lancer.clone())));
        registry.register(UnitType::Warden, Box::new(WardenMicro::new(config.casters.warden.clone())));
        registry.register(
            UnitType::Sentinel,
            Box::new(SentinelMicro::new(config.casters.sentinel.clone())),
        );
        registry.register(UnitType::Observer, Box::new(NoMicro));
        registry
    }

    /// Register (or replace) the strategy for `unit_type`
    pub fn register(&mut self, unit_type: UnitType, strategy: Box<dyn MicroStep>) -> Option<Box<dyn MicroStep>> {
        self.strategies.insert(unit_type, strategy)
    }

    pub fn unregister(&mut self, unit_type: UnitType) -> Option<Box<dyn MicroStep>> {
        self.strategies.remove(&unit_type)
    }

    pub fn set_fallback(&mut self, strategy: Box<dyn MicroStep>) {
        self.fallback = strategy;
    }

    pub fn is_registered(&self, unit_type: UnitType) -> bool {
        self.strategies.contains_key(&unit_type)
    }

    /// Strategy for `unit_type`, or the fallback
    pub fn get_mut(&mut self, unit_type: UnitType) -> &mut dyn MicroStep {
        match self.strategies.get_mut(&unit_type) {
            Some(strategy) => strategy.as_mut(),
            None => self.fallback.as_mut(),
        }
    }
}

impl Default for MicroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

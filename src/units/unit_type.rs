//! Unit types and their static properties
//!
//! Power, ranges and feature tags come from one table so every layer
//! (power model, engagement, micro) reads the same numbers.

use serde::{Deserialize, Serialize};

/// Type of unit on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    // Ground
    Worker,     // Gatherer, weak melee
    Rifleman,   // Cheap ranged, hits air and ground
    Brawler,    // Sturdy melee
    Hound,      // Fast melee swarm
    Ranger,     // Mobile ranged, hits air and ground
    Juggernaut, // Armored ground-only gun
    Bombard,    // Long-range siege
    Tracker,    // Applies lock-on
    Shade,      // Cloaked melee
    Sentinel,   // Area-denial / shield caster

    // Air
    Gunship,     // Hits air and ground
    Interceptor, // Air-to-air
    Observer,    // Detector, unarmed
    Lancer,      // Channel beam against light ground
    Warden,      // Lift-and-remove caster

    // Structures
    Turret,   // Static defense, air and ground
    Cannon,   // Static defense, ground, detects
    Townhall, // Base
    Depot,    // Supply
}

/// Static per-type properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitTypeData {
    /// Combat value at full health
    pub power: f32,
    /// Weapon range against ground (0 = cannot hit ground)
    pub ground_range: f32,
    /// Weapon range against air (0 = cannot hit air)
    pub air_range: f32,
    pub speed: f32,
    pub radius: f32,
    pub health_max: f32,
    pub shield_max: f32,
    pub is_flying: bool,
    pub is_melee: bool,
    pub is_siege: bool,
    pub is_detector: bool,
    pub is_cloaked: bool,
    pub is_structure: bool,
    pub is_light: bool,
    /// Too heavy to be lifted
    pub is_massive: bool,
}

const BASE: UnitTypeData = UnitTypeData {
    power: 0.0,
    ground_range: 0.0,
    air_range: 0.0,
    speed: 0.0,
    radius: 0.5,
    health_max: 100.0,
    shield_max: 0.0,
    is_flying: false,
    is_melee: false,
    is_siege: false,
    is_detector: false,
    is_cloaked: false,
    is_structure: false,
    is_light: false,
    is_massive: false,
};

const MELEE_RANGE: f32 = 0.1;

const WORKER: UnitTypeData = UnitTypeData {
    power: 0.25,
    ground_range: MELEE_RANGE,
    speed: 3.94,
    radius: 0.375,
    health_max: 40.0,
    is_melee: true,
    is_light: true,
    ..BASE
};

const RIFLEMAN: UnitTypeData = UnitTypeData {
    power: 0.5,
    ground_range: 5.0,
    air_range: 5.0,
    speed: 3.15,
    radius: 0.375,
    health_max: 45.0,
    is_light: true,
    ..BASE
};

const BRAWLER: UnitTypeData = UnitTypeData {
    power: 1.0,
    ground_range: MELEE_RANGE,
    speed: 3.15,
    health_max: 100.0,
    shield_max: 50.0,
    is_melee: true,
    is_light: true,
    ..BASE
};

const HOUND: UnitTypeData = UnitTypeData {
    power: 0.5,
    ground_range: MELEE_RANGE,
    speed: 4.13,
    radius: 0.375,
    health_max: 35.0,
    is_melee: true,
    is_light: true,
    ..BASE
};

const RANGER: UnitTypeData = UnitTypeData {
    power: 1.25,
    ground_range: 6.0,
    air_range: 6.0,
    speed: 4.13,
    radius: 0.625,
    health_max: 80.0,
    shield_max: 80.0,
    ..BASE
};

const JUGGERNAUT: UnitTypeData = UnitTypeData {
    power: 3.0,
    ground_range: 7.0,
    speed: 3.15,
    radius: 0.875,
    health_max: 175.0,
    ..BASE
};

const BOMBARD: UnitTypeData = UnitTypeData {
    power: 3.0,
    ground_range: 13.0,
    speed: 3.15,
    radius: 0.875,
    health_max: 175.0,
    is_siege: true,
    ..BASE
};

const TRACKER: UnitTypeData = UnitTypeData {
    power: 2.0,
    ground_range: 7.0,
    air_range: 7.0,
    speed: 4.72,
    radius: 0.75,
    health_max: 120.0,
    ..BASE
};

const SHADE: UnitTypeData = UnitTypeData {
    power: 2.0,
    ground_range: MELEE_RANGE,
    speed: 3.85,
    health_max: 40.0,
    shield_max: 80.0,
    is_melee: true,
    is_cloaked: true,
    is_light: true,
    ..BASE
};

const SENTINEL: UnitTypeData = UnitTypeData {
    power: 0.75,
    ground_range: 5.0,
    air_range: 5.0,
    speed: 3.15,
    health_max: 40.0,
    shield_max: 40.0,
    is_light: true,
    ..BASE
};

const GUNSHIP: UnitTypeData = UnitTypeData {
    power: 2.5,
    ground_range: 6.0,
    air_range: 6.0,
    speed: 3.85,
    radius: 1.0,
    health_max: 140.0,
    is_flying: true,
    ..BASE
};

const INTERCEPTOR: UnitTypeData = UnitTypeData {
    power: 1.5,
    air_range: 5.0,
    speed: 5.95,
    radius: 0.75,
    health_max: 120.0,
    shield_max: 60.0,
    is_flying: true,
    is_light: true,
    ..BASE
};

const OBSERVER: UnitTypeData = UnitTypeData {
    speed: 2.63,
    health_max: 40.0,
    shield_max: 20.0,
    is_flying: true,
    is_detector: true,
    is_light: true,
    ..BASE
};

const LANCER: UnitTypeData = UnitTypeData {
    power: 2.0,
    ground_range: 4.0,
    speed: 5.6,
    radius: 0.9,
    health_max: 100.0,
    shield_max: 60.0,
    is_flying: true,
    ..BASE
};

const WARDEN: UnitTypeData = UnitTypeData {
    power: 1.5,
    air_range: 5.0,
    speed: 5.95,
    radius: 0.75,
    health_max: 120.0,
    shield_max: 60.0,
    is_flying: true,
    is_light: true,
    ..BASE
};

const TURRET: UnitTypeData = UnitTypeData {
    power: 2.0,
    ground_range: 7.0,
    air_range: 7.0,
    radius: 1.0,
    health_max: 250.0,
    is_structure: true,
    is_massive: true,
    ..BASE
};

const CANNON: UnitTypeData = UnitTypeData {
    power: 2.0,
    ground_range: 7.0,
    radius: 1.0,
    health_max: 150.0,
    shield_max: 150.0,
    is_structure: true,
    is_detector: true,
    is_massive: true,
    ..BASE
};

const TOWNHALL: UnitTypeData = UnitTypeData {
    radius: 2.5,
    health_max: 1500.0,
    is_structure: true,
    is_massive: true,
    ..BASE
};

const DEPOT: UnitTypeData = UnitTypeData {
    radius: 1.0,
    health_max: 400.0,
    is_structure: true,
    is_massive: true,
    ..BASE
};

impl UnitType {
    /// Static properties for this type
    pub fn data(&self) -> &'static UnitTypeData {
        match self {
            UnitType::Worker => &WORKER,
            UnitType::Rifleman => &RIFLEMAN,
            UnitType::Brawler => &BRAWLER,
            UnitType::Hound => &HOUND,
            UnitType::Ranger => &RANGER,
            UnitType::Juggernaut => &JUGGERNAUT,
            UnitType::Bombard => &BOMBARD,
            UnitType::Tracker => &TRACKER,
            UnitType::Shade => &SHADE,
            UnitType::Sentinel => &SENTINEL,
            UnitType::Gunship => &GUNSHIP,
            UnitType::Interceptor => &INTERCEPTOR,
            UnitType::Observer => &OBSERVER,
            UnitType::Lancer => &LANCER,
            UnitType::Warden => &WARDEN,
            UnitType::Turret => &TURRET,
            UnitType::Cannon => &CANNON,
            UnitType::Townhall => &TOWNHALL,
            UnitType::Depot => &DEPOT,
        }
    }

    pub fn is_worker(&self) -> bool {
        matches!(self, UnitType::Worker)
    }

    /// Mobile army unit (not a worker, not a structure)
    pub fn is_army(&self) -> bool {
        let data = self.data();
        !data.is_structure && !self.is_worker()
    }

    /// Structure with a weapon
    pub fn is_static_defense(&self) -> bool {
        let data = self.data();
        data.is_structure && data.power > 0.0
    }

    pub fn can_attack_air(&self) -> bool {
        self.data().air_range > 0.0
    }

    pub fn can_attack_ground(&self) -> bool {
        self.data().ground_range > 0.0
    }

    /// Weapon range against a target of the given type (0 = cannot hit it)
    pub fn range_vs(&self, target: UnitType) -> f32 {
        let data = self.data();
        if target.data().is_flying {
            data.air_range
        } else {
            data.ground_range
        }
    }

    /// Longest weapon range of this type
    pub fn max_range(&self) -> f32 {
        let data = self.data();
        data.ground_range.max(data.air_range)
    }
}

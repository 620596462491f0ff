//! Zones: spatial partitions used for ownership and threat bookkeeping

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::ZoneId;
use crate::power::PowerVector;
use crate::services::WorldSnapshot;
use crate::units::UnitType;

/// Who holds a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneOwner {
    #[default]
    Neutral,
    Own,
    Enemy,
}

/// One zone and the threat figures refreshed for it this tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub center: Vec2,
    pub radius: f32,
    pub owner: ZoneOwner,
    pub is_enemy_start: bool,

    /// Known enemy mobile power inside the zone (memories included)
    #[serde(skip)]
    pub known_enemy_power: PowerVector,
    /// Visible enemy army power inside an own zone
    #[serde(skip)]
    pub assaulting_enemy_power: PowerVector,
    /// Enemy static defense power inside the zone
    #[serde(skip)]
    pub static_defense_power: PowerVector,
    #[serde(skip)]
    pub enemy_structures: Vec<Vec2>,
}

impl Zone {
    pub fn new(id: ZoneId, center: Vec2, radius: f32) -> Self {
        Self {
            id,
            center,
            radius,
            owner: ZoneOwner::Neutral,
            is_enemy_start: false,
            known_enemy_power: PowerVector::new(),
            assaulting_enemy_power: PowerVector::new(),
            static_defense_power: PowerVector::new(),
            enemy_structures: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: ZoneOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn as_enemy_start(mut self) -> Self {
        self.is_enemy_start = true;
        self.owner = ZoneOwner::Enemy;
        self
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }

    pub fn is_under_assault(&self) -> bool {
        self.owner == ZoneOwner::Own && self.assaulting_enemy_power.total > 0.0
    }

    fn clear_threat(&mut self) {
        self.known_enemy_power.clear();
        self.assaulting_enemy_power.clear();
        self.static_defense_power.clear();
        self.enemy_structures.clear();
    }
}

/// All zones of the map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneMap {
    pub zones: Vec<Zone>,
}

impl ZoneMap {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Zone containing `point`; the nearest center wins on overlap
    pub fn zone_at(&self, point: Vec2) -> Option<&Zone> {
        self.zones
            .iter()
            .filter(|z| z.contains(point))
            .min_by(|a, b| a.center.distance(point).total_cmp(&b.center.distance(point)))
    }

    pub fn own_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.owner == ZoneOwner::Own)
    }

    pub fn enemy_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.owner == ZoneOwner::Enemy)
    }

    pub fn enemy_start(&self) -> Option<&Zone> {
        self.zones.iter().find(|z| z.is_enemy_start)
    }

    /// Enemy zones still holding a base
    pub fn enemy_base_count(&self) -> usize {
        self.enemy_zones().filter(|z| !z.enemy_structures.is_empty()).count()
    }

    /// Recompute ownership and threat figures from the snapshot
    ///
    /// A zone with a base changes hands to whoever holds the base. Units
    /// count toward the zone they stand in.
    pub fn refresh(&mut self, world: &WorldSnapshot) {
        for zone in &mut self.zones {
            zone.clear_threat();
        }

        for zone in &mut self.zones {
            let own_base = world
                .own_units
                .iter()
                .any(|u| u.unit_type == UnitType::Townhall && zone.contains(u.position));
            let enemy_base = world
                .known_enemies()
                .any(|u| u.unit_type == UnitType::Townhall && zone.contains(u.position));
            if own_base {
                zone.owner = ZoneOwner::Own;
            } else if enemy_base {
                zone.owner = ZoneOwner::Enemy;
            }
        }

        for enemy in world.known_enemies() {
            let Some(index) = self.index_at(enemy.position) else {
                continue;
            };
            let zone = &mut self.zones[index];
            let data = enemy.data();
            if data.is_structure {
                zone.enemy_structures.push(enemy.position);
                if enemy.unit_type.is_static_defense() {
                    zone.static_defense_power.add_unit(enemy, 1.0);
                }
                continue;
            }
            zone.known_enemy_power.add_unit(enemy, 1.0);
            if zone.owner == ZoneOwner::Own && enemy.is_valid_target() && enemy.unit_type.is_army() {
                zone.assaulting_enemy_power.add_unit(enemy, 1.0);
            }
        }
    }

    fn index_at(&self, point: Vec2) -> Option<usize> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.contains(point))
            .min_by(|a, b| a.1.center.distance(point).total_cmp(&b.1.center.distance(point)))
            .map(|(i, _)| i)
    }

    /// Enemy static defense power over all zones
    pub fn total_static_defense(&self) -> PowerVector {
        self.zones.iter().map(|z| z.static_defense_power).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitTag;
    use crate::units::Unit;

    fn map() -> ZoneMap {
        ZoneMap::new(vec![
            Zone::new(ZoneId(0), Vec2::ZERO, 15.0).with_owner(ZoneOwner::Own),
            Zone::new(ZoneId(1), Vec2::new(100.0, 0.0), 15.0).as_enemy_start(),
            Zone::new(ZoneId(2), Vec2::new(50.0, 50.0), 15.0),
        ])
    }

    #[test]
    fn test_refresh_tracks_assault_and_defense() {
        let mut zones = map();
        let mut world = WorldSnapshot::new(0.0);
        world.enemy_units = vec![
            Unit::new(UnitTag(1), UnitType::Brawler, Vec2::new(3.0, 0.0)),
            Unit::new(UnitTag(2), UnitType::Turret, Vec2::new(102.0, 0.0)),
            Unit::new(UnitTag(3), UnitType::Townhall, Vec2::new(100.0, 0.0)),
        ];
        zones.refresh(&world);

        let home = zones.get(ZoneId(0)).expect("home zone");
        assert!(home.is_under_assault());
        assert_eq!(home.assaulting_enemy_power.total, 1.0);

        let start = zones.get(ZoneId(1)).expect("enemy start");
        assert_eq!(start.static_defense_power.total, 2.0);
        assert_eq!(start.enemy_structures.len(), 2);
        assert_eq!(zones.enemy_base_count(), 1);
    }

    #[test]
    fn test_memory_counts_as_known_not_assault() {
        let mut zones = map();
        let mut world = WorldSnapshot::new(0.0);
        let mut ghost = Unit::new(UnitTag(1), UnitType::Brawler, Vec2::new(3.0, 0.0));
        ghost.is_memory = true;
        world.enemy_units = vec![ghost];
        zones.refresh(&world);
        let home = zones.get(ZoneId(0)).expect("home zone");
        assert_eq!(home.known_enemy_power.total, 1.0);
        assert!(!home.is_under_assault());
    }

    #[test]
    fn test_enemy_base_flips_owner() {
        let mut zones = map();
        let mut world = WorldSnapshot::new(0.0);
        world.enemy_units = vec![Unit::new(UnitTag(1), UnitType::Townhall, Vec2::new(50.0, 50.0))];
        zones.refresh(&world);
        assert_eq!(zones.get(ZoneId(2)).map(|z| z.owner), Some(ZoneOwner::Enemy));
    }
}

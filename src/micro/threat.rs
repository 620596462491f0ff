//! Local threat snapshot around a point

use glam::Vec2;

use crate::power::PowerVector;
use crate::services::WorldSnapshot;
use crate::units::Unit;

/// Enemies near one point, rebuilt fresh every time it is needed
#[derive(Debug, Clone, Default)]
pub struct ThreatSnapshot<'a> {
    pub enemies: Vec<&'a Unit>,
    pub power: PowerVector,
    /// Enemies that carry power (armed units and static defense)
    pub combat_relevant: Vec<&'a Unit>,
    pub workers_only: bool,
}

impl<'a> ThreatSnapshot<'a> {
    pub fn around(world: &'a WorldSnapshot, point: Vec2, radius: f32) -> Self {
        let enemies: Vec<&Unit> = world.enemies_in_radius(point, radius).collect();
        let power = PowerVector::of_units(enemies.iter().copied());
        let combat_relevant = enemies
            .iter()
            .copied()
            .filter(|u| u.data().power > 0.0)
            .collect();
        let workers_only = !enemies.is_empty() && enemies.iter().all(|u| u.unit_type.is_worker());
        Self {
            enemies,
            power,
            combat_relevant,
            workers_only,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Enemy power able to shoot flying units
    pub fn air_threat(&self) -> f32 {
        self.power.air_power
    }

    /// Enemy power able to shoot ground units
    pub fn ground_threat(&self) -> f32 {
        self.power.ground_power
    }

    /// Relevant enemies that can hit `unit`
    pub fn threats_to<'s>(&'s self, unit: &'s Unit) -> impl Iterator<Item = &'a Unit> + 's {
        self.combat_relevant
            .iter()
            .copied()
            .filter(move |e| e.can_attack(unit))
    }

    pub fn nearest_to(&self, point: Vec2) -> Option<&'a Unit> {
        self.enemies
            .iter()
            .copied()
            .min_by(|a, b| a.position.distance(point).total_cmp(&b.position.distance(point)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitTag;
    use crate::units::UnitType;

    fn world(enemies: Vec<Unit>) -> WorldSnapshot {
        let mut world = WorldSnapshot::new(0.0);
        world.enemy_units = enemies;
        world
    }

    #[test]
    fn test_workers_only_flag() {
        let w = world(vec![
            Unit::new(UnitTag(1), UnitType::Worker, Vec2::new(1.0, 0.0)),
            Unit::new(UnitTag(2), UnitType::Worker, Vec2::new(2.0, 0.0)),
        ]);
        let snapshot = ThreatSnapshot::around(&w, Vec2::ZERO, 5.0);
        assert!(snapshot.workers_only);
        assert_eq!(snapshot.combat_relevant.len(), 2);
    }

    #[test]
    fn test_empty_is_not_workers_only() {
        let w = world(Vec::new());
        let snapshot = ThreatSnapshot::around(&w, Vec2::ZERO, 5.0);
        assert!(snapshot.is_empty());
        assert!(!snapshot.workers_only);
    }

    #[test]
    fn test_air_threat_and_relevance() {
        let w = world(vec![
            Unit::new(UnitTag(1), UnitType::Interceptor, Vec2::new(1.0, 0.0)),
            Unit::new(UnitTag(2), UnitType::Observer, Vec2::new(1.0, 1.0)),
            Unit::new(UnitTag(3), UnitType::Juggernaut, Vec2::new(20.0, 0.0)),
        ]);
        let snapshot = ThreatSnapshot::around(&w, Vec2::ZERO, 5.0);
        assert_eq!(snapshot.enemies.len(), 2);
        assert_eq!(snapshot.combat_relevant.len(), 1);
        assert_eq!(snapshot.air_threat(), 1.5);
        assert_eq!(snapshot.ground_threat(), 0.0);
    }
}

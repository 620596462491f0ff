//! Pathing service - locally safe points and threat-aware steps
//!
//! Contract: every query returns its input point unmodified when it cannot
//! produce an answer. Callers compare the answer with the query to detect
//! that and keep their original command.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::units::Unit;

/// Synchronous pathing / influence queries
pub trait PathingService: Sync {
    /// Lowest-threat ground point within `radius` of `point`
    fn find_low_inside_ground(&self, point: Vec2, radius: f32) -> Vec2;

    /// Lowest-threat air point within `radius` of `point`
    fn find_low_inside_air(&self, point: Vec2, radius: f32) -> Vec2;

    /// Next ground waypoint of at most `distance` from `from` toward `target`
    fn next_step_ground(&self, from: Vec2, target: Vec2, distance: f32) -> Vec2;

    /// Next air waypoint of at most `distance` from `from` toward `target`
    fn next_step_air(&self, from: Vec2, target: Vec2, distance: f32) -> Vec2;

    /// Travel distance between two points, if reachable
    fn path_distance(&self, from: Vec2, to: Vec2) -> Option<f32>;
}

/// Safe ground point, or `None` when the service could not produce one
pub fn safe_point_ground(pathing: &dyn PathingService, point: Vec2, radius: f32) -> Option<Vec2> {
    let answer = pathing.find_low_inside_ground(point, radius);
    (answer != point).then_some(answer)
}

/// Safe air point, or `None` when the service could not produce one
pub fn safe_point_air(pathing: &dyn PathingService, point: Vec2, radius: f32) -> Option<Vec2> {
    let answer = pathing.find_low_inside_air(point, radius);
    (answer != point).then_some(answer)
}

/// Pathing that always fails; positioning falls back to original commands
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPathing;

impl PathingService for NoPathing {
    fn find_low_inside_ground(&self, point: Vec2, _radius: f32) -> Vec2 {
        point
    }

    fn find_low_inside_air(&self, point: Vec2, _radius: f32) -> Vec2 {
        point
    }

    fn next_step_ground(&self, _from: Vec2, target: Vec2, _distance: f32) -> Vec2 {
        target
    }

    fn next_step_air(&self, _from: Vec2, target: Vec2, _distance: f32) -> Vec2 {
        target
    }

    fn path_distance(&self, _from: Vec2, _to: Vec2) -> Option<f32> {
        None
    }
}

const SAMPLE_DIRECTIONS: usize = 12;
const SAMPLE_RINGS: [f32; 3] = [0.34, 0.67, 1.0];
const STEP_DEVIATIONS: [f32; 5] = [0.0, 0.35, -0.35, 0.7, -0.7];
const THREAT_BUFFER: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
struct ThreatSource {
    position: Vec2,
    reach: f32,
    power: f32,
}

/// Open-field threat sampling built from the enemy snapshot
///
/// Treats the map as unobstructed. Good enough for tests and the headless
/// runner; a real deployment plugs in its influence-map service instead.
#[derive(Debug, Clone, Default)]
pub struct ThreatFieldPathing {
    ground: Vec<ThreatSource>,
    air: Vec<ThreatSource>,
}

impl ThreatFieldPathing {
    pub fn from_enemies<'a>(enemies: impl IntoIterator<Item = &'a Unit>) -> Self {
        let mut field = Self::default();
        for enemy in enemies {
            if !enemy.is_valid_target() {
                continue;
            }
            let data = enemy.data();
            if data.power <= 0.0 {
                continue;
            }
            if data.ground_range > 0.0 {
                field.ground.push(ThreatSource {
                    position: enemy.position,
                    reach: data.ground_range + data.radius + THREAT_BUFFER,
                    power: data.power,
                });
            }
            if data.air_range > 0.0 {
                field.air.push(ThreatSource {
                    position: enemy.position,
                    reach: data.air_range + data.radius + THREAT_BUFFER,
                    power: data.power,
                });
            }
        }
        field
    }

    /// Summed power of sources reaching `point`
    pub fn threat_at(&self, point: Vec2, flying: bool) -> f32 {
        let sources = if flying { &self.air } else { &self.ground };
        sources
            .iter()
            .filter(|s| s.position.distance(point) <= s.reach)
            .map(|s| s.power)
            .sum()
    }

    fn find_low_inside(&self, point: Vec2, radius: f32, flying: bool) -> Vec2 {
        if radius <= 0.0 {
            return point;
        }
        let mut best = point;
        let mut best_threat = f32::MAX;
        let mut best_offset = f32::MAX;
        for ring in SAMPLE_RINGS {
            let offset = radius * ring;
            for i in 0..SAMPLE_DIRECTIONS {
                let angle = TAU * i as f32 / SAMPLE_DIRECTIONS as f32;
                let candidate = point + Vec2::from_angle(angle) * offset;
                let threat = self.threat_at(candidate, flying);
                if threat < best_threat || (threat == best_threat && offset < best_offset) {
                    best = candidate;
                    best_threat = threat;
                    best_offset = offset;
                }
            }
        }
        best
    }

    fn next_step(&self, from: Vec2, target: Vec2, distance: f32, flying: bool) -> Vec2 {
        let remaining = from.distance(target);
        if distance <= 0.0 || remaining <= f32::EPSILON {
            return target;
        }
        let step = distance.min(remaining);
        let heading = (target - from).normalize_or_zero();
        let mut best = from + heading * step;
        let mut best_threat = self.threat_at(best, flying);
        for deviation in STEP_DEVIATIONS.iter().skip(1) {
            let candidate = from + Vec2::from_angle(*deviation).rotate(heading) * step;
            let threat = self.threat_at(candidate, flying);
            if threat < best_threat {
                best = candidate;
                best_threat = threat;
            }
        }
        best
    }
}

impl PathingService for ThreatFieldPathing {
    fn find_low_inside_ground(&self, point: Vec2, radius: f32) -> Vec2 {
        self.find_low_inside(point, radius, false)
    }

    fn find_low_inside_air(&self, point: Vec2, radius: f32) -> Vec2 {
        self.find_low_inside(point, radius, true)
    }

    fn next_step_ground(&self, from: Vec2, target: Vec2, distance: f32) -> Vec2 {
        self.next_step(from, target, distance, false)
    }

    fn next_step_air(&self, from: Vec2, target: Vec2, distance: f32) -> Vec2 {
        self.next_step(from, target, distance, true)
    }

    fn path_distance(&self, from: Vec2, to: Vec2) -> Option<f32> {
        Some(from.distance(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitTag;
    use crate::units::UnitType;

    fn enemy(tag: u64, unit_type: UnitType, x: f32, y: f32) -> Unit {
        Unit::new(UnitTag(tag), unit_type, Vec2::new(x, y))
    }

    #[test]
    fn test_no_pathing_returns_input() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(NoPathing.find_low_inside_ground(p, 5.0), p);
        assert!(safe_point_ground(&NoPathing, p, 5.0).is_none());
        assert_eq!(NoPathing.next_step_air(Vec2::ZERO, p, 1.0), p);
        assert!(NoPathing.path_distance(Vec2::ZERO, p).is_none());
    }

    #[test]
    fn test_threat_at_respects_air_ground() {
        let field = ThreatFieldPathing::from_enemies(&[enemy(1, UnitType::Juggernaut, 0.0, 0.0)]);
        assert!(field.threat_at(Vec2::new(3.0, 0.0), false) > 0.0);
        assert_eq!(field.threat_at(Vec2::new(3.0, 0.0), true), 0.0);
    }

    #[test]
    fn test_safe_point_moves_away_from_threat() {
        let field = ThreatFieldPathing::from_enemies(&[enemy(1, UnitType::Rifleman, 0.0, 0.0)]);
        let start = Vec2::new(6.0, 0.0);
        let safe = safe_point_ground(&field, start, 6.0).expect("open field answers");
        assert_eq!(field.threat_at(safe, false), 0.0);
        assert!(safe.distance(Vec2::ZERO) > start.distance(Vec2::ZERO) - 0.01);
    }

    #[test]
    fn test_safe_point_ignores_hallucinations() {
        let mut fake = enemy(1, UnitType::Gunship, 0.0, 0.0);
        fake.is_hallucination = true;
        let field = ThreatFieldPathing::from_enemies(&[fake]);
        assert_eq!(field.threat_at(Vec2::ZERO, true), 0.0);
    }

    #[test]
    fn test_next_step_is_bounded() {
        let field = ThreatFieldPathing::default();
        let step = field.next_step_ground(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        assert!((step - Vec2::new(2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_next_step_sidesteps_threat() {
        let field = ThreatFieldPathing::from_enemies(&[enemy(1, UnitType::Rifleman, 3.0, 0.0)]);
        let direct = Vec2::new(2.0, 0.0);
        let step = field.next_step_ground(Vec2::ZERO, Vec2::new(20.0, 0.0), 2.0);
        assert!(field.threat_at(step, false) <= field.threat_at(direct, false));
    }

    #[test]
    fn test_path_distance_is_euclidean() {
        let field = ThreatFieldPathing::default();
        assert_eq!(field.path_distance(Vec2::ZERO, Vec2::new(3.0, 4.0)), Some(5.0));
    }
}

//! Engine configuration with documented constants
//!
//! All tuning numbers live here, grouped by the layer that reads them.
//! Every section deserializes from TOML with per-field defaults, so a
//! config file only has to mention the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VanguardError};
use crate::units::UnitType;

/// Group geometry and engagement-detection tuning
///
/// The combat band constants are empirically tuned. Keep them as named
/// values; nothing downstream re-derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementTuning {
    /// Center distance beyond which two groups are never in combat
    pub combat_far_distance: f32,

    /// Center distance within which two groups are always in combat
    pub combat_near_distance: f32,

    /// Share of own total power that must be engaged inside the ambiguous band
    ///
    /// A single stray hit should not flip the combat state every tick.
    pub engaged_power_fraction: f32,

    /// Maximum center distance for `closest_target_group`
    pub target_search_radius: f32,

    /// Units closer than this to any group member join that group
    pub group_join_distance: f32,

    /// Upper bound on geometric-median refinement steps
    pub median_iterations: usize,

    /// Mean member distance allowed before a group counts as spread out
    pub spread_base: f32,

    /// Extra spread allowance per sqrt(member count)
    pub spread_per_unit: f32,

    /// Distance beyond weapon range that still counts as "can engage"
    pub can_engage_buffer: f32,

    /// Gap within which an enemy melee unit counts as surrounding one of ours
    pub melee_surround_range: f32,

    /// Extra slack added to exact per-pair range tests
    pub range_margin: f32,
}

impl Default for EngagementTuning {
    fn default() -> Self {
        Self {
            combat_far_distance: 17.0,
            combat_near_distance: 10.0,
            engaged_power_fraction: 0.15,
            target_search_radius: 50.0,
            group_join_distance: 7.0,
            median_iterations: 10,
            spread_base: 4.0,
            spread_per_unit: 0.5,
            can_engage_buffer: 3.0,
            melee_surround_range: 2.5,
            range_margin: 0.5,
        }
    }
}

/// One entry of the focus-fire priority table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPriorityEntry {
    pub unit_type: UnitType,
    pub priority: f32,
}

/// Generic combat model tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Combined health+shield fraction below which a unit pulls out
    pub retreat_health_fraction: f32,

    /// Types that fight to the death and never take the low-health retreat
    pub no_retreat_types: Vec<UnitType>,

    /// Engaged enemy siege share that selects the counter-siege posture
    pub siege_heavy_ratio: f32,

    /// Share of our units touched by enemy melee needed to consider kiting
    pub melee_surround_ratio: f32,

    /// Share of engaged enemy power that must be fast melee to consider kiting
    pub fast_melee_ratio: f32,

    /// Speed at or above which an enemy melee unit counts as fast
    pub fast_melee_speed: f32,

    /// Own group power needed before kiting is worth it
    pub kite_power_threshold: f32,

    /// Engage ratio splitting kite-push from kite-hold
    pub kite_push_engage_ratio: f32,

    /// Search radius for locally safe points while holding ground
    pub safe_point_radius: f32,

    /// How far a low-health unit steps back before asking for a safe point
    pub retreat_step: f32,

    /// Search radius for the low-health retreat safe point
    pub retreat_search_radius: f32,

    /// Distance a lock-on victim tries to put between itself and the source
    pub lock_on_escape_distance: f32,

    /// Range advantage needed to pick the outrange posture
    pub outrange_margin: f32,

    /// Distance to the push target that counts as "arrived"
    pub push_arrival_radius: f32,

    /// How far (0..1) the outrange posture drifts toward the enemy center
    pub soft_merge_factor: f32,

    /// Remaining weapon cooldown still treated as "ready"
    pub ready_cooldown_allowance: f32,

    /// Focus-fire priorities; empty means lowest effective health first
    pub target_priorities: Vec<TargetPriorityEntry>,

    /// Minimum group count before engagement contexts are built in parallel
    pub parallel_group_threshold: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            retreat_health_fraction: 0.3,
            no_retreat_types: vec![UnitType::Hound, UnitType::Worker],
            siege_heavy_ratio: 0.4,
            melee_surround_ratio: 0.35,
            fast_melee_ratio: 0.5,
            fast_melee_speed: 3.8,
            kite_power_threshold: 3.0,
            kite_push_engage_ratio: 0.5,
            safe_point_radius: 4.0,
            retreat_step: 4.0,
            retreat_search_radius: 6.0,
            lock_on_escape_distance: 10.0,
            outrange_margin: 0.5,
            push_arrival_radius: 8.0,
            soft_merge_factor: 0.35,
            ready_cooldown_allowance: 0.0,
            target_priorities: Vec::new(),
            parallel_group_threshold: 4,
        }
    }
}

/// Channel-weapon unit tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LancerConfig {
    /// Distance to a light ground target that turns the beam on
    pub activation_range: f32,
    /// Energy required before the beam is switched on
    pub min_energy: f32,
    /// Local air threat above which the unit drops everything and evades
    pub panic_air_threat: f32,
    /// Local air threat above which the unit alternates firing and kiting
    pub moderate_air_threat: f32,
    /// Radius of the local threat snapshot
    pub threat_scan_radius: f32,
    /// Search radius for the scripted evasion point
    pub evade_radius: f32,
}

impl Default for LancerConfig {
    fn default() -> Self {
        Self {
            activation_range: 5.0,
            min_energy: 40.0,
            panic_air_threat: 4.0,
            moderate_air_threat: 1.5,
            threat_scan_radius: 10.0,
            evade_radius: 8.0,
        }
    }
}

/// Lift-and-remove caster tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Radius in which removal candidates are scored
    pub scan_radius: f32,
    /// Allied casters already channelling the lift before others hold back
    pub max_concurrent_lifts: usize,
    /// Radius of the local threat snapshot
    pub threat_scan_radius: f32,
    /// Search radius when backing away from threats it cannot remove
    pub retreat_radius: f32,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            scan_radius: 10.0,
            max_concurrent_lifts: 3,
            threat_scan_radius: 9.0,
            retreat_radius: 6.0,
        }
    }
}

/// Area-denial / shield caster tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Radius in which a ranged enemy counts as a direct threat
    pub shield_threat_radius: f32,
    /// Window in which an ally's shield use counts as "recent"
    pub shield_recent_window: f32,
    /// Share of allied casters that must not have shielded recently
    pub shield_quorum: f32,
    /// Radius used to cluster enemies around a denial point
    pub denial_cluster_radius: f32,
    /// Enemies needed inside the cluster to justify the denial cost
    pub denial_min_enemies: usize,
    /// Fields planned per placement, laid out in a line across the cluster
    pub denial_line_spots: usize,
    /// Distance between neighbouring fields on that line
    pub denial_spacing: f32,
    /// Window in which a second caster joins a just-placed effect
    pub join_window: f32,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            shield_threat_radius: 6.0,
            shield_recent_window: 5.0,
            shield_quorum: 0.5,
            denial_cluster_radius: 3.0,
            denial_min_enemies: 4,
            denial_line_spots: 3,
            denial_spacing: 2.0,
            join_window: 2.0,
        }
    }
}

/// Specialized caster tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasterConfig {
    pub lancer: LancerConfig,
    pub warden: WardenConfig,
    pub sentinel: SentinelConfig,
}

/// Attack / retreat orchestration tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Inflation applied to the known enemy power estimate
    pub enemy_power_margin: f32,
    /// Margin passed to `is_enough_for` when deciding to attack
    pub enough_margin: f32,
    /// Supply count at which the force attacks regardless of power
    pub supply_cap_fallback: f32,
    /// Retreat when local enemy power times this exceeds local own power
    pub retreat_multiplier: f32,
    /// Radius around the lead attacker used for local power
    pub local_power_radius: f32,
    /// Local enemy/own ratio above which the retreat is a panic retreat
    pub panic_ratio: f32,
    /// Seconds a retreat lasts before returning to inactive
    pub retreat_duration: f32,
    /// Distance to the rally point that ends a retreat
    pub rally_radius: f32,
    /// Enemy structures this close to home are treated as proxies
    pub proxy_radius: f32,
    /// Path-distance penalty per unit of static defense power
    pub static_defense_penalty: f32,
    /// Enemy base count at or below which static defenses join the estimate
    pub max_bases_for_static_defense: usize,
    /// Distance to the expansion site that counts as arrived
    pub expansion_arrival_radius: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            enemy_power_margin: 1.25,
            enough_margin: 1.1,
            supply_cap_fallback: 190.0,
            retreat_multiplier: 0.8,
            local_power_radius: 15.0,
            panic_ratio: 2.0,
            retreat_duration: 20.0,
            rally_radius: 6.0,
            proxy_radius: 50.0,
            static_defense_penalty: 10.0,
            max_bases_for_static_defense: 2,
            expansion_arrival_radius: 10.0,
        }
    }
}

/// Zone defense tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseConfig {
    /// Seconds a zone must stay quiet before defenders are released
    pub clear_debounce: f32,
    /// Margin passed to `is_enough_for` when sizing a defense
    pub defend_margin: f32,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            clear_debounce: 3.0,
            defend_margin: 1.1,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VanguardConfig {
    pub engagement: EngagementTuning,
    pub combat: CombatConfig,
    pub casters: CasterConfig,
    pub attack: AttackConfig,
    pub defense: DefenseConfig,
}

impl VanguardConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: VanguardConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Reject settings the engine cannot run with.
    ///
    /// Bad configuration is a setup failure; the tick path never checks again.
    pub fn validate(&self) -> Result<()> {
        let e = &self.engagement;
        if e.combat_near_distance < 0.0 || e.combat_near_distance >= e.combat_far_distance {
            return Err(invalid(format!(
                "combat_near_distance ({}) must be in [0, combat_far_distance ({}))",
                e.combat_near_distance, e.combat_far_distance
            )));
        }
        if !(e.engaged_power_fraction > 0.0 && e.engaged_power_fraction <= 1.0) {
            return Err(invalid("engaged_power_fraction must be in (0, 1]"));
        }
        if e.median_iterations == 0 {
            return Err(invalid("median_iterations must be at least 1"));
        }
        if e.group_join_distance <= 0.0 {
            return Err(invalid("group_join_distance must be positive"));
        }

        let c = &self.combat;
        if !(0.0..=1.0).contains(&c.retreat_health_fraction) {
            return Err(invalid("retreat_health_fraction must be in [0, 1]"));
        }

        let s = &self.casters.sentinel;
        if s.denial_min_enemies == 0 {
            return Err(invalid("denial_min_enemies must be at least 1"));
        }
        if s.denial_line_spots == 0 {
            return Err(invalid("denial_line_spots must be at least 1"));
        }
        if !(0.0..=1.0).contains(&s.shield_quorum) {
            return Err(invalid("shield_quorum must be in [0, 1]"));
        }
        if self.casters.warden.max_concurrent_lifts == 0 {
            return Err(invalid("max_concurrent_lifts must be at least 1"));
        }

        let a = &self.attack;
        if a.retreat_multiplier <= 0.0 {
            return Err(invalid("retreat_multiplier must be positive"));
        }
        if a.enough_margin <= 0.0 || a.enemy_power_margin <= 0.0 {
            return Err(invalid("power margins must be positive"));
        }
        if a.supply_cap_fallback <= 0.0 {
            return Err(invalid("supply_cap_fallback must be positive"));
        }
        if a.retreat_duration <= 0.0 {
            return Err(invalid("retreat_duration must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> VanguardError {
    VanguardError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(VanguardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_combat_band_defaults() {
        let tuning = EngagementTuning::default();
        assert_eq!(tuning.combat_far_distance, 17.0);
        assert_eq!(tuning.combat_near_distance, 10.0);
        assert_eq!(tuning.engaged_power_fraction, 0.15);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = VanguardConfig::from_toml_str(
            r#"
            [attack]
            retreat_multiplier = 0.6
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.attack.retreat_multiplier, 0.6);
        assert_eq!(config.attack.retreat_duration, 20.0);
        assert_eq!(config.engagement.combat_far_distance, 17.0);
    }

    #[test]
    fn test_priority_table_from_toml() {
        let config = VanguardConfig::from_toml_str(
            r#"
            [[combat.target_priorities]]
            unit_type = "Bombard"
            priority = 10.0
            "#,
        )
        .expect("priority table should parse");
        assert_eq!(config.combat.target_priorities.len(), 1);
        assert_eq!(config.combat.target_priorities[0].unit_type, UnitType::Bombard);
    }

    #[test]
    fn test_zero_denial_threshold_rejected() {
        let mut config = VanguardConfig::default();
        config.casters.sentinel.denial_min_enemies = 0;
        assert!(matches!(
            config.validate(),
            Err(VanguardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_combat_band_rejected() {
        let mut config = VanguardConfig::default();
        config.engagement.combat_near_distance = 20.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nonpositive_retreat_multiplier_rejected() {
        let result = VanguardConfig::from_toml_str("[attack]\nretreat_multiplier = 0.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_shipped_config() {
        let config = VanguardConfig::load("data/vanguard.toml").expect("shipped config loads");
        assert!(config.attack.retreat_multiplier > 0.0);
    }
}

//! Weapon configuration.
//!
//! [`WeaponConfig`] is the external, partial configuration document: every
//! section and every field is optional. [`WeaponConfig::resolve`] turns it into
//! a fully concrete [`WeaponTuning`], substituting the hardcoded values in
//! [`defaults`] for anything missing or unusable. Per-shot math only ever reads
//! the resolved tuning.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::types::{FirePattern, UpgradeKind};

/// Hardcoded fallbacks used when the configuration omits a value.
pub mod defaults {
    use crate::types::FirePattern;

    pub const BASE_DAMAGE: f32 = 12.0;
    pub const DAMAGE_PER_LEVEL: f32 = 0.1;
    pub const BASE_FIRE_INTERVAL: f32 = 0.2;
    pub const FIRE_INTERVAL_PER_LEVEL: f32 = 0.008;
    pub const MIN_FIRE_INTERVAL: f32 = 0.06;
    pub const MAX_POWER_LEVEL: u32 = 20;
    pub const AUTO_UPGRADE_PATTERN: bool = false;
    pub const PATTERN: FirePattern = FirePattern::Single;

    pub const MAX_HEAT: f32 = 100.0;
    pub const HEAT_PER_SHOT: f32 = 0.8;
    pub const MULTI_SHOT_HEAT_MULTIPLIER: f32 = 0.5;
    pub const HEAT_DECAY_RATE: f32 = 25.0;
    pub const OVERHEAT_DECAY_RATE: f32 = 50.0;
    pub const OVERHEAT_COOLDOWN: f32 = 1.5;

    pub const DOUBLE_SPREAD_DEG: f32 = 15.0;
    pub const TRIPLE_SPREAD_DEG: f32 = 15.0;
    pub const QUAD_SPREAD_DEG: f32 = 12.0;
    pub const X5_SPREAD_DEG: f32 = 10.0;
    pub const DOUBLE_LEVEL: u32 = 3;
    pub const TRIPLE_LEVEL: u32 = 6;
    pub const QUAD_LEVEL: u32 = 10;
    pub const X5_LEVEL: u32 = 15;

    pub const PROJECTILE_SPEED: f32 = 18.0;
    pub const PROJECTILE_LIFETIME: f32 = 2.5;
    pub const PROJECTILE_RADIUS: f32 = 0.15;
    pub const RADIUS_PER_LEVEL: f32 = 0.01;
    pub const HOMING_RANGE: f32 = 8.0;
    pub const HOMING_TURN_RATE: f32 = 4.0;
    pub const MAX_PIERCE: u32 = 3;
    pub const SPAWN_OFFSET: f32 = 0.5;

    pub const REAR_ENABLED: bool = false;
    pub const REAR_SYNCHRONIZED: bool = true;
    pub const REAR_DAMAGE_FRACTION: f32 = 0.5;
    pub const REAR_HEAT_FRACTION: f32 = 0.5;
    pub const REAR_FIRE_INTERVAL: f32 = 0.4;

    pub const BEAM_DAMAGE_PER_SECOND: f32 = 30.0;
    pub const BEAM_WIDTH: f32 = 0.6;
    pub const BEAM_MAX_RANGE: f32 = 14.0;
    pub const BEAM_MAX_TARGETS: usize = 32;
    pub const BEAM_DAMAGE_THROUGH_OBSTACLES: bool = false;

    pub const RAPID_FIRE_MULTIPLIER: f32 = 1.5;
    pub const RAPID_FIRE_DURATION: f32 = 5.0;
    pub const DAMAGE_BOOST_MULTIPLIER: f32 = 2.0;
    pub const DAMAGE_BOOST_DURATION: f32 = 5.0;
    pub const UPGRADE_RAPID_FIRE_MULTIPLIER: f32 = 1.5;

    pub const SPREAD_SHOT_DURATION: f32 = 10.0;
    pub const PIERCING_DURATION: f32 = 10.0;
    pub const RAPID_FIRE_UPGRADE_DURATION: f32 = 8.0;
    pub const HOMING_DURATION: f32 = 12.0;

    pub const SMART_BOMB_BASE_CHARGES: u32 = 1;
    pub const SMART_BOMB_MAX_CHARGES: u32 = 5;
    pub const SMART_BOMB_RADIUS: f32 = 12.0;

    pub const POOL_PREWARM: usize = 64;
    pub const AUTO_COLLIDE: bool = true;
    pub const MAX_QUERY_RESULTS: usize = 32;
    pub const RNG_SEED: u64 = 0x5EED;
}

/// Forward weapon firing parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiringConfig {
    pub base_damage: Option<f32>,
    pub damage_per_level: Option<f32>,
    /// Seconds between volleys at power level 0
    pub base_fire_interval: Option<f32>,
    /// Seconds shaved off the interval per power level
    pub fire_interval_per_level: Option<f32>,
    /// Floor for the level-adjusted interval
    pub min_fire_interval: Option<f32>,
    pub max_power_level: Option<u32>,
    /// Derive the pattern from power level instead of using `pattern`
    pub auto_upgrade_pattern: Option<bool>,
    pub pattern: Option<FirePattern>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    pub max_heat: Option<f32>,
    pub heat_per_shot: Option<f32>,
    pub multi_shot_heat_multiplier: Option<f32>,
    /// Heat lost per second while not firing
    pub decay_rate: Option<f32>,
    /// Heat lost per second while overheated
    pub overheat_decay_rate: Option<f32>,
    /// Minimum lockout in seconds once overheated
    pub overheat_cooldown: Option<f32>,
}

/// Angle between adjacent projectiles per pattern, and auto-upgrade thresholds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub double_spread_deg: Option<f32>,
    pub triple_spread_deg: Option<f32>,
    pub quad_spread_deg: Option<f32>,
    pub x5_spread_deg: Option<f32>,
    pub double_level: Option<u32>,
    pub triple_level: Option<u32>,
    pub quad_level: Option<u32>,
    pub x5_level: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: Option<f32>,
    pub lifetime: Option<f32>,
    pub base_radius: Option<f32>,
    pub radius_per_level: Option<f32>,
    pub homing_range: Option<f32>,
    pub homing_turn_rate: Option<f32>,
    pub max_pierce: Option<u32>,
    /// Distance in front of the muzzle where shots appear
    pub spawn_offset: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RearWeaponConfig {
    pub enabled: Option<bool>,
    /// Fire with every forward volley instead of on an own timer
    pub synchronized: Option<bool>,
    pub damage_fraction: Option<f32>,
    pub heat_fraction: Option<f32>,
    pub fire_interval: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    pub damage_per_second: Option<f32>,
    pub width: Option<f32>,
    pub max_range: Option<f32>,
    pub max_targets: Option<usize>,
    /// Size the damage box by max range instead of the ray-cast length
    pub damage_through_obstacles: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub rapid_fire_multiplier: Option<f32>,
    pub rapid_fire_duration: Option<f32>,
    pub damage_boost_multiplier: Option<f32>,
    pub damage_boost_duration: Option<f32>,
    /// Multiplier applied while the RapidFire timed upgrade is active
    pub upgrade_rapid_fire_multiplier: Option<f32>,
}

/// Default durations for timed upgrades, in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    pub spread_shot_duration: Option<f32>,
    pub piercing_duration: Option<f32>,
    pub rapid_fire_duration: Option<f32>,
    pub homing_duration: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartBombConfig {
    pub base_charges: Option<u32>,
    pub max_charges: Option<u32>,
    pub radius: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Instances created up front in each projectile pool
    pub pool_prewarm: Option<usize>,
    /// Detect projectile contacts with circle overlaps every tick
    pub auto_collide: Option<bool>,
    /// Bound on ids returned by one spatial query
    pub max_query_results: Option<usize>,
    pub rng_seed: Option<u64>,
}

/// Partial weapon configuration as supplied by the game.
///
/// Every section and field may be absent. Nothing here is read directly by the
/// firing code; call [`WeaponConfig::resolve`].
///
/// # Example
/// ```
/// use neural_break_weapons::config::WeaponConfig;
///
/// let config = WeaponConfig::from_toml_str("[firing]\nbase_damage = 20.0\n").unwrap();
/// let tuning = config.resolve();
/// assert_eq!(tuning.firing.base_damage, 20.0);
/// // Everything else falls back
/// assert_eq!(tuning.heat.max_heat, 100.0);
/// ```
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub firing: Option<FiringConfig>,
    pub heat: Option<HeatConfig>,
    pub patterns: Option<PatternConfig>,
    pub projectile: Option<ProjectileConfig>,
    pub rear: Option<RearWeaponConfig>,
    pub beam: Option<BeamConfig>,
    pub boosts: Option<BoostConfig>,
    pub upgrades: Option<UpgradeConfig>,
    pub smart_bomb: Option<SmartBombConfig>,
    pub simulation: Option<SimulationConfig>,
}

impl WeaponConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: WeaponConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values that can never be meaningful.
    ///
    /// Missing values are fine; present values must be finite and non-negative,
    /// and `max_heat` must be strictly positive.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.float_fields() {
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: f64::from(value),
                    reason: "must be finite",
                });
            }
            if value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: f64::from(value),
                    reason: "must not be negative",
                });
            }
        }
        if let Some(max_heat) = self.heat.as_ref().and_then(|h| h.max_heat) {
            if max_heat <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "heat.max_heat",
                    value: f64::from(max_heat),
                    reason: "must be positive",
                });
            }
        }
        Ok(())
    }

    fn float_fields(&self) -> Vec<(&'static str, Option<f32>)> {
        let firing = section(&self.firing);
        let heat = section(&self.heat);
        let patterns = section(&self.patterns);
        let projectile = section(&self.projectile);
        let rear = section(&self.rear);
        let beam = section(&self.beam);
        let boosts = section(&self.boosts);
        let upgrades = section(&self.upgrades);
        let smart_bomb = section(&self.smart_bomb);

        vec![
            ("firing.base_damage", firing.base_damage),
            ("firing.damage_per_level", firing.damage_per_level),
            ("firing.base_fire_interval", firing.base_fire_interval),
            ("firing.fire_interval_per_level", firing.fire_interval_per_level),
            ("firing.min_fire_interval", firing.min_fire_interval),
            ("heat.max_heat", heat.max_heat),
            ("heat.heat_per_shot", heat.heat_per_shot),
            ("heat.multi_shot_heat_multiplier", heat.multi_shot_heat_multiplier),
            ("heat.decay_rate", heat.decay_rate),
            ("heat.overheat_decay_rate", heat.overheat_decay_rate),
            ("heat.overheat_cooldown", heat.overheat_cooldown),
            ("patterns.double_spread_deg", patterns.double_spread_deg),
            ("patterns.triple_spread_deg", patterns.triple_spread_deg),
            ("patterns.quad_spread_deg", patterns.quad_spread_deg),
            ("patterns.x5_spread_deg", patterns.x5_spread_deg),
            ("projectile.speed", projectile.speed),
            ("projectile.lifetime", projectile.lifetime),
            ("projectile.base_radius", projectile.base_radius),
            ("projectile.radius_per_level", projectile.radius_per_level),
            ("projectile.homing_range", projectile.homing_range),
            ("projectile.homing_turn_rate", projectile.homing_turn_rate),
            ("projectile.spawn_offset", projectile.spawn_offset),
            ("rear.damage_fraction", rear.damage_fraction),
            ("rear.heat_fraction", rear.heat_fraction),
            ("rear.fire_interval", rear.fire_interval),
            ("beam.damage_per_second", beam.damage_per_second),
            ("beam.width", beam.width),
            ("beam.max_range", beam.max_range),
            ("boosts.rapid_fire_multiplier", boosts.rapid_fire_multiplier),
            ("boosts.rapid_fire_duration", boosts.rapid_fire_duration),
            ("boosts.damage_boost_multiplier", boosts.damage_boost_multiplier),
            ("boosts.damage_boost_duration", boosts.damage_boost_duration),
            ("boosts.upgrade_rapid_fire_multiplier", boosts.upgrade_rapid_fire_multiplier),
            ("upgrades.spread_shot_duration", upgrades.spread_shot_duration),
            ("upgrades.piercing_duration", upgrades.piercing_duration),
            ("upgrades.rapid_fire_duration", upgrades.rapid_fire_duration),
            ("upgrades.homing_duration", upgrades.homing_duration),
            ("smart_bomb.radius", smart_bomb.radius),
        ]
    }

    /// Resolve into concrete tuning, falling back to [`defaults`] field by field.
    ///
    /// Present-but-unusable values (negative, NaN) are logged and replaced by the
    /// fallback rather than rejected; a game must never stop firing because of a
    /// bad tuning file.
    pub fn resolve(&self) -> WeaponTuning {
        let firing = section(&self.firing);
        let heat = section(&self.heat);
        let patterns = section(&self.patterns);
        let projectile = section(&self.projectile);
        let rear = section(&self.rear);
        let beam = section(&self.beam);
        let boosts = section(&self.boosts);
        let upgrades = section(&self.upgrades);
        let smart_bomb = section(&self.smart_bomb);
        let simulation = section(&self.simulation);

        WeaponTuning {
            firing: FiringTuning {
                base_damage: pick(firing.base_damage, defaults::BASE_DAMAGE, "firing.base_damage"),
                damage_per_level: pick(
                    firing.damage_per_level,
                    defaults::DAMAGE_PER_LEVEL,
                    "firing.damage_per_level",
                ),
                base_fire_interval: pick_positive(
                    firing.base_fire_interval,
                    defaults::BASE_FIRE_INTERVAL,
                    "firing.base_fire_interval",
                ),
                fire_interval_per_level: pick(
                    firing.fire_interval_per_level,
                    defaults::FIRE_INTERVAL_PER_LEVEL,
                    "firing.fire_interval_per_level",
                ),
                min_fire_interval: pick_positive(
                    firing.min_fire_interval,
                    defaults::MIN_FIRE_INTERVAL,
                    "firing.min_fire_interval",
                ),
                max_power_level: firing.max_power_level.unwrap_or(defaults::MAX_POWER_LEVEL),
                auto_upgrade_pattern: firing
                    .auto_upgrade_pattern
                    .unwrap_or(defaults::AUTO_UPGRADE_PATTERN),
                pattern: firing.pattern.unwrap_or(defaults::PATTERN),
            },
            heat: HeatTuning {
                max_heat: pick_positive(heat.max_heat, defaults::MAX_HEAT, "heat.max_heat"),
                heat_per_shot: pick(heat.heat_per_shot, defaults::HEAT_PER_SHOT, "heat.heat_per_shot"),
                multi_shot_heat_multiplier: pick(
                    heat.multi_shot_heat_multiplier,
                    defaults::MULTI_SHOT_HEAT_MULTIPLIER,
                    "heat.multi_shot_heat_multiplier",
                ),
                decay_rate: pick(heat.decay_rate, defaults::HEAT_DECAY_RATE, "heat.decay_rate"),
                overheat_decay_rate: pick(
                    heat.overheat_decay_rate,
                    defaults::OVERHEAT_DECAY_RATE,
                    "heat.overheat_decay_rate",
                ),
                overheat_cooldown: pick(
                    heat.overheat_cooldown,
                    defaults::OVERHEAT_COOLDOWN,
                    "heat.overheat_cooldown",
                ),
            },
            patterns: PatternTuning {
                double_spread: pick(
                    patterns.double_spread_deg,
                    defaults::DOUBLE_SPREAD_DEG,
                    "patterns.double_spread_deg",
                )
                .to_radians(),
                triple_spread: pick(
                    patterns.triple_spread_deg,
                    defaults::TRIPLE_SPREAD_DEG,
                    "patterns.triple_spread_deg",
                )
                .to_radians(),
                quad_spread: pick(
                    patterns.quad_spread_deg,
                    defaults::QUAD_SPREAD_DEG,
                    "patterns.quad_spread_deg",
                )
                .to_radians(),
                x5_spread: pick(patterns.x5_spread_deg, defaults::X5_SPREAD_DEG, "patterns.x5_spread_deg")
                    .to_radians(),
                double_level: patterns.double_level.unwrap_or(defaults::DOUBLE_LEVEL),
                triple_level: patterns.triple_level.unwrap_or(defaults::TRIPLE_LEVEL),
                quad_level: patterns.quad_level.unwrap_or(defaults::QUAD_LEVEL),
                x5_level: patterns.x5_level.unwrap_or(defaults::X5_LEVEL),
            },
            projectile: ProjectileTuning {
                speed: pick(projectile.speed, defaults::PROJECTILE_SPEED, "projectile.speed"),
                lifetime: pick(projectile.lifetime, defaults::PROJECTILE_LIFETIME, "projectile.lifetime"),
                base_radius: pick(
                    projectile.base_radius,
                    defaults::PROJECTILE_RADIUS,
                    "projectile.base_radius",
                ),
                radius_per_level: pick(
                    projectile.radius_per_level,
                    defaults::RADIUS_PER_LEVEL,
                    "projectile.radius_per_level",
                ),
                homing_range: pick(
                    projectile.homing_range,
                    defaults::HOMING_RANGE,
                    "projectile.homing_range",
                ),
                homing_turn_rate: pick(
                    projectile.homing_turn_rate,
                    defaults::HOMING_TURN_RATE,
                    "projectile.homing_turn_rate",
                ),
                max_pierce: projectile.max_pierce.unwrap_or(defaults::MAX_PIERCE).max(1),
                spawn_offset: pick(
                    projectile.spawn_offset,
                    defaults::SPAWN_OFFSET,
                    "projectile.spawn_offset",
                ),
            },
            rear: RearTuning {
                enabled: rear.enabled.unwrap_or(defaults::REAR_ENABLED),
                synchronized: rear.synchronized.unwrap_or(defaults::REAR_SYNCHRONIZED),
                damage_fraction: pick(
                    rear.damage_fraction,
                    defaults::REAR_DAMAGE_FRACTION,
                    "rear.damage_fraction",
                ),
                heat_fraction: pick(rear.heat_fraction, defaults::REAR_HEAT_FRACTION, "rear.heat_fraction"),
                fire_interval: pick_positive(
                    rear.fire_interval,
                    defaults::REAR_FIRE_INTERVAL,
                    "rear.fire_interval",
                ),
            },
            beam: BeamTuning {
                damage_per_second: pick(
                    beam.damage_per_second,
                    defaults::BEAM_DAMAGE_PER_SECOND,
                    "beam.damage_per_second",
                ),
                width: pick(beam.width, defaults::BEAM_WIDTH, "beam.width"),
                max_range: pick(beam.max_range, defaults::BEAM_MAX_RANGE, "beam.max_range"),
                max_targets: beam.max_targets.unwrap_or(defaults::BEAM_MAX_TARGETS).max(1),
                damage_through_obstacles: beam
                    .damage_through_obstacles
                    .unwrap_or(defaults::BEAM_DAMAGE_THROUGH_OBSTACLES),
            },
            boosts: BoostTuning {
                rapid_fire_multiplier: pick_positive(
                    boosts.rapid_fire_multiplier,
                    defaults::RAPID_FIRE_MULTIPLIER,
                    "boosts.rapid_fire_multiplier",
                ),
                rapid_fire_duration: pick(
                    boosts.rapid_fire_duration,
                    defaults::RAPID_FIRE_DURATION,
                    "boosts.rapid_fire_duration",
                ),
                damage_boost_multiplier: pick(
                    boosts.damage_boost_multiplier,
                    defaults::DAMAGE_BOOST_MULTIPLIER,
                    "boosts.damage_boost_multiplier",
                ),
                damage_boost_duration: pick(
                    boosts.damage_boost_duration,
                    defaults::DAMAGE_BOOST_DURATION,
                    "boosts.damage_boost_duration",
                ),
                upgrade_rapid_fire_multiplier: pick_positive(
                    boosts.upgrade_rapid_fire_multiplier,
                    defaults::UPGRADE_RAPID_FIRE_MULTIPLIER,
                    "boosts.upgrade_rapid_fire_multiplier",
                ),
            },
            upgrades: UpgradeDurations {
                spread_shot: pick(
                    upgrades.spread_shot_duration,
                    defaults::SPREAD_SHOT_DURATION,
                    "upgrades.spread_shot_duration",
                ),
                piercing: pick(
                    upgrades.piercing_duration,
                    defaults::PIERCING_DURATION,
                    "upgrades.piercing_duration",
                ),
                rapid_fire: pick(
                    upgrades.rapid_fire_duration,
                    defaults::RAPID_FIRE_UPGRADE_DURATION,
                    "upgrades.rapid_fire_duration",
                ),
                homing: pick(upgrades.homing_duration, defaults::HOMING_DURATION, "upgrades.homing_duration"),
            },
            smart_bomb: SmartBombTuning {
                base_charges: smart_bomb.base_charges.unwrap_or(defaults::SMART_BOMB_BASE_CHARGES),
                max_charges: smart_bomb.max_charges.unwrap_or(defaults::SMART_BOMB_MAX_CHARGES),
                radius: pick(smart_bomb.radius, defaults::SMART_BOMB_RADIUS, "smart_bomb.radius"),
            },
            simulation: SimulationTuning {
                pool_prewarm: simulation.pool_prewarm.unwrap_or(defaults::POOL_PREWARM),
                auto_collide: simulation.auto_collide.unwrap_or(defaults::AUTO_COLLIDE),
                max_query_results: simulation
                    .max_query_results
                    .unwrap_or(defaults::MAX_QUERY_RESULTS)
                    .max(1),
                rng_seed: simulation.rng_seed.unwrap_or(defaults::RNG_SEED),
            },
        }
    }
}

fn section<S: Clone + Default>(section: &Option<S>) -> S {
    section.clone().unwrap_or_default()
}

fn pick(value: Option<f32>, fallback: f32, field: &'static str) -> f32 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            warn!("weapon config `{field}` = {v} is unusable, falling back to {fallback}");
            fallback
        }
        None => fallback,
    }
}

fn pick_positive(value: Option<f32>, fallback: f32, field: &'static str) -> f32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            warn!("weapon config `{field}` = {v} must be positive, falling back to {fallback}");
            fallback
        }
        None => fallback,
    }
}

/// Fully resolved weapon tuning. Every field is concrete.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponTuning {
    pub firing: FiringTuning,
    pub heat: HeatTuning,
    pub patterns: PatternTuning,
    pub projectile: ProjectileTuning,
    pub rear: RearTuning,
    pub beam: BeamTuning,
    pub boosts: BoostTuning,
    pub upgrades: UpgradeDurations,
    pub smart_bomb: SmartBombTuning,
    pub simulation: SimulationTuning,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        WeaponConfig::default().resolve()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FiringTuning {
    pub base_damage: f32,
    pub damage_per_level: f32,
    pub base_fire_interval: f32,
    pub fire_interval_per_level: f32,
    pub min_fire_interval: f32,
    pub max_power_level: u32,
    pub auto_upgrade_pattern: bool,
    pub pattern: FirePattern,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatTuning {
    pub max_heat: f32,
    pub heat_per_shot: f32,
    pub multi_shot_heat_multiplier: f32,
    pub decay_rate: f32,
    pub overheat_decay_rate: f32,
    pub overheat_cooldown: f32,
}

/// Spreads are stored in radians.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternTuning {
    pub double_spread: f32,
    pub triple_spread: f32,
    pub quad_spread: f32,
    pub x5_spread: f32,
    pub double_level: u32,
    pub triple_level: u32,
    pub quad_level: u32,
    pub x5_level: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub lifetime: f32,
    pub base_radius: f32,
    pub radius_per_level: f32,
    pub homing_range: f32,
    pub homing_turn_rate: f32,
    pub max_pierce: u32,
    pub spawn_offset: f32,
}

impl ProjectileTuning {
    /// Collision radius grows with power level.
    pub fn radius_for_level(&self, power_level: u32) -> f32 {
        self.base_radius + self.radius_per_level * power_level as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RearTuning {
    pub enabled: bool,
    pub synchronized: bool,
    pub damage_fraction: f32,
    pub heat_fraction: f32,
    pub fire_interval: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BeamTuning {
    pub damage_per_second: f32,
    pub width: f32,
    pub max_range: f32,
    pub max_targets: usize,
    pub damage_through_obstacles: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoostTuning {
    pub rapid_fire_multiplier: f32,
    pub rapid_fire_duration: f32,
    pub damage_boost_multiplier: f32,
    pub damage_boost_duration: f32,
    pub upgrade_rapid_fire_multiplier: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDurations {
    pub spread_shot: f32,
    pub piercing: f32,
    pub rapid_fire: f32,
    pub homing: f32,
}

impl UpgradeDurations {
    /// Default duration for a timed upgrade kind.
    pub fn for_kind(&self, kind: UpgradeKind) -> f32 {
        match kind {
            UpgradeKind::SpreadShot => self.spread_shot,
            UpgradeKind::Piercing => self.piercing,
            UpgradeKind::RapidFire => self.rapid_fire,
            UpgradeKind::Homing => self.homing,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmartBombTuning {
    pub base_charges: u32,
    pub max_charges: u32,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationTuning {
    pub pool_prewarm: usize,
    pub auto_collide: bool,
    pub max_query_results: usize,
    pub rng_seed: u64,
}

//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures mapping to `config.toml`. Every game-balance
//! value the core consumes lives here or in the species trait table; none
//! are hardcoded in the systems.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 400.0
//! height = 300.0
//! max_depth = 30.0
//! seed = 42
//!
//! [angling]
//! break_threshold = 92.0
//!
//! [[species]]
//! name = "northern_pike"
//! style = "ambush"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tightline_data::SpeciesTraits;

/// World-level simulation configuration.
///
/// Distances are world units, speeds are world units per tick, durations
/// are ticks.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub max_depth: f64,
    pub seed: Option<u64>,
    pub tick_hz: u32,
    /// Cap on live predators plus school members; excess spawns are dropped.
    pub max_organisms: usize,
    /// Cap on live plankton items.
    pub max_food: usize,
    pub initial_food_clusters: usize,
    /// How far past the playable bounds a migrating fish must travel before
    /// it is removed.
    pub despawn_margin: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            max_depth: 30.0,
            seed: None,
            tick_hz: 30,
            max_organisms: 512,
            max_food: 256,
            initial_food_clusters: 4,
            despawn_margin: 12.0,
        }
    }
}

/// Predator decision-machine tuning.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Weight of lure-speed closeness in the interest score.
    pub interest_speed_weight: f64,
    /// Weight of the depth-zone bonus in the interest score.
    pub interest_depth_weight: f64,
    /// Weight of the per-tick random draw in the interest score.
    pub interest_noise_weight: f64,
    /// Interest lost per tick when the lure mismatches or leaves range.
    pub interest_decay: f64,
    /// Detection-range multiplier when the lure sits inside the species'
    /// preferred depth band, and when it does not.
    pub depth_zone_bonus: f64,
    pub depth_zone_penalty: f64,
    /// Hunger gained per tick.
    pub hunger_rate: f64,
    /// Minimum ticks a predator stays committed to a hunting target.
    pub commit_ticks: u32,
    /// Cooldown before an abandoned school may be re-targeted.
    pub abandon_cooldown_ticks: u32,
    /// Ticks without a prey sighting before migration begins.
    pub migration_timeout_ticks: u32,
    pub migration_speed_mult: f64,
    pub feeding_ticks: u32,
    pub strike_window_ticks: u32,
    /// Wariness duration after an escape, and the interest-threshold
    /// multiplier applied while it lasts.
    pub wary_ticks: u32,
    pub wary_threshold_mult: f64,
    /// Strike-distance multiplier for ambush-style species.
    pub ambush_strike_mult: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            interest_speed_weight: 0.5,
            interest_depth_weight: 0.3,
            interest_noise_weight: 0.2,
            interest_decay: 0.35,
            depth_zone_bonus: 1.25,
            depth_zone_penalty: 0.8,
            hunger_rate: 0.02,
            commit_ticks: 90,
            abandon_cooldown_ticks: 240,
            migration_timeout_ticks: 600,
            migration_speed_mult: 1.4,
            feeding_ticks: 45,
            strike_window_ticks: 10,
            wary_ticks: 300,
            wary_threshold_mult: 1.6,
            ambush_strike_mult: 1.8,
        }
    }
}

/// Flock steering tuning shared by all schooling species; per-species radii
/// and weights come from the trait table.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FlockingConfig {
    /// Steering is recomputed every `steering_stride` ticks per member
    /// (panic recomputes immediately); velocity integrates every tick.
    pub steering_stride: u32,
    pub panic_separation_mult: f64,
    pub panic_cohesion_mult: f64,
    pub flee_weight: f64,
    pub food_attraction_weight: f64,
    pub edge_margin: f64,
    pub edge_turn_weight: f64,
    /// Fraction of cruise speed a member never drops below.
    pub min_speed_fraction: f64,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            steering_stride: 2,
            panic_separation_mult: 2.5,
            panic_cohesion_mult: 0.15,
            flee_weight: 2.0,
            food_attraction_weight: 0.4,
            edge_margin: 8.0,
            edge_turn_weight: 0.6,
            min_speed_fraction: 0.25,
        }
    }
}

/// Line/reel contest tuning.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AnglingConfig {
    /// Tension added per accepted reel action at intensity 1.0.
    pub reel_increment: f64,
    /// Tension added per tick by fish resistance at full stamina.
    pub resistance_gain: f64,
    /// Tension shed per tick when the player is not reeling.
    pub slack_decay: f64,
    /// Inclusive tension level that snaps the line. Kept below 100 so the
    /// clamp never masks a break.
    pub break_threshold: f64,
    /// Stamina drained per tick at tension 100.
    pub stamina_drain_rate: f64,
    /// Reel actions closer together than this many ticks are ignored.
    pub reel_min_interval_ticks: u32,
    /// World units a reeled fish is dragged toward the lure per tick.
    pub reel_pull: f64,
    /// Run speed of a resisting fish at full stamina.
    pub run_speed: f64,
}

impl Default for AnglingConfig {
    fn default() -> Self {
        Self {
            reel_increment: 6.0,
            resistance_gain: 2.0,
            slack_decay: 3.0,
            break_threshold: 92.0,
            stamina_drain_rate: 0.9,
            reel_min_interval_ticks: 3,
            reel_pull: 1.2,
            run_speed: 0.8,
        }
    }
}

/// Plankton-tier food spawning and consumption.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodWebConfig {
    /// Chance per tick of spawning one new plankton cluster.
    pub cluster_spawn_chance: f64,
    pub cluster_size: usize,
    pub cluster_radius: f64,
    pub plankton_lifespan_ticks: u32,
    pub plankton_nutrition: f64,
    /// Range at which a school member can graze a plankton item.
    pub member_consumption_range: f64,
    /// How far a school can sight a food resource.
    pub food_sight_range: f64,
}

impl Default for FoodWebConfig {
    fn default() -> Self {
        Self {
            cluster_spawn_chance: 0.04,
            cluster_size: 6,
            cluster_radius: 3.0,
            plankton_lifespan_ticks: 900,
            plankton_nutrition: 8.0,
            member_consumption_range: 1.0,
            food_sight_range: 14.0,
        }
    }
}

/// Root configuration: world, tuning sections, and an optional species
/// table overriding the built-in catalog.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub behavior: BehaviorConfig,
    pub flocking: FlockingConfig,
    pub angling: AnglingConfig,
    pub foodweb: FoodWebConfig,
    pub species: Vec<SpeciesTraits>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str::<Self>(&content)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults when the file is
    /// absent. Parse errors are still surfaced.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

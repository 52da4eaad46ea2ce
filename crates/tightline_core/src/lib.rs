//! # Tightline Core
//!
//! The behavioral and resolution engine of an arcade angling game: a
//! deterministic, single-threaded predator/prey simulation under the
//! player's lure.
//!
//! This crate contains:
//! - Per-predator decision state machine (investigate / chase / strike /
//!   hunt / migrate)
//! - Emergent flocking for schooling prey
//! - Food-chain bookkeeping connecting predators, prey, and the plankton
//!   tier
//! - Tension/stamina fight resolution once a fish is hooked
//! - Organism registry with deferred lifecycle mutation and spatial
//!   indexing
//!
//! ## Architecture
//!
//! One `World` advances in fixed-order passes each tick (registry →
//! flocking → food chain → predators → fight), iterating organisms in
//! spawn order with a per-tick reseeded rng, so identical inputs and seed
//! replay identically.
//!
//! ## Example
//!
//! ```
//! use tightline_core::config::SimConfig;
//! use tightline_core::world::World;
//! use tightline_data::SizeClass;
//!
//! let mut config = SimConfig::default();
//! config.world.seed = Some(42);
//! let mut world = World::new(config).unwrap();
//! world.spawn_school("golden_shiner", 30, (120.0, 80.0, 2.0));
//! world.spawn_predator("northern_pike", SizeClass::Large, (100.0, 80.0, 3.0));
//! for _ in 0..10 {
//!     world.update();
//! }
//! assert!(world.population() > 0);
//! ```

/// Species trait catalog with the symmetric eat-legality matrix
pub mod catalog;
/// Configuration management for simulation parameters
pub mod config;
/// Error types for configuration loading
pub mod error;
/// Outbound notification queue
pub mod events;
/// The player's lure abstraction
pub mod lure;
/// Metrics collection and structured logging
pub mod metrics;
/// Live-organism registry with deferred spawn/despawn
pub mod registry;
/// Spatial hashing for proximity queries
pub mod spatial;
/// Core simulation systems (flocking, food chain, predators, fight)
pub mod systems;
/// The simulation world and tick loop
pub mod world;

pub use catalog::SpeciesCatalog;
pub use config::SimConfig;
pub use error::ConfigError;
pub use metrics::{init_logging, Metrics};
pub use systems::fight::{FightOutcome, FightSession};
pub use world::World;

//! Tightline: behavioral and resolution core for an arcade angling game.
//!
//! Re-exports the library crates; the simulation itself lives in
//! `tightline_core`, pure data types in `tightline_data`.

pub use tightline_core as core;
pub use tightline_data as data;

pub use tightline_core::{ConfigError, FightOutcome, FightSession, SimConfig, World};

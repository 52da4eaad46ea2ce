use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a hooked fish got away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeReason {
    /// Tension reached the break threshold.
    LineBroken,
    /// The bound predator no longer existed when the fight was stepped.
    PredatorLost,
}

/// Discrete outbound notification, pushed to a queue drained once per tick
/// by the scoring/display collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SimEvent {
    Catch {
        id: Uuid,
        species: String,
        weight_kg: f64,
        fight_ticks: u32,
        tick: u64,
        timestamp: String,
    },
    Escape {
        id: Uuid,
        species: String,
        reason: EscapeReason,
        tick: u64,
        timestamp: String,
    },
    Feeding {
        eater: Uuid,
        prey: Uuid,
        tick: u64,
        timestamp: String,
    },
    Migration {
        id: Uuid,
        species: String,
        tick: u64,
        timestamp: String,
    },
}

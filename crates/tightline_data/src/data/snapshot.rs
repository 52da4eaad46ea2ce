use super::organism::{Behavior, Body, Identity, Vitals};
use super::species::SpeciesId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One visible organism as seen by the sonar/rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarContact {
    pub id: Uuid,
    pub species: SpeciesId,
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub state: String,
    /// Flash/attention intensity in [0, 1].
    pub interest: f32,
}

/// Read-only per-tick view of every visible organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarFrame {
    pub tick: u64,
    pub contacts: Vec<SonarContact>,
}

/// Complete serializable state of one predator. Reconstructing a predator
/// from its record yields identical subsequent behavior under the same seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredatorRecord {
    pub identity: Identity,
    pub body: Body,
    pub vitals: Vitals,
    pub behavior: Behavior,
}

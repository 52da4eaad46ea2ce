//! Core data structures for the tightline simulation.
//!
//! Pure data: organism components, species trait records, outbound events,
//! and snapshot types. No simulation logic lives here.

pub mod data;

pub use data::events::{EscapeReason, SimEvent};
pub use data::organism::{
    Behavior, BehaviorState, Body, FoodResource, Identity, SchoolId, SchoolMember, Target, Vitals,
};
pub use data::snapshot::{PredatorRecord, SonarContact, SonarFrame};
pub use data::species::{
    BehaviorStyle, DetectionProfile, DietProfile, PreyCategory, SchoolingParams, SizeClass,
    SpeciesId, SpeciesTraits, StaminaClass,
};

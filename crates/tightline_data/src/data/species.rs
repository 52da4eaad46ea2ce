use serde::{Deserialize, Serialize};

/// Index of a species in the catalog's trait table.
///
/// `SpeciesId::FALLBACK` addresses the conservative default record used when
/// trait data is missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

impl SpeciesId {
    pub const FALLBACK: SpeciesId = SpeciesId(u16::MAX);
}

/// Broad trophic category used by the diet rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreyCategory {
    Plankton,
    Baitfish,
    Panfish,
    GameFish,
}

/// Hunting/decision style tag; selects parameter defaults, never a subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorStyle {
    Ambush,
    Pursuit,
    Opportunistic,
    Schooling,
}

/// Fight endurance class of a hooked fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaminaClass {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl StaminaClass {
    /// Multiplier applied to health-derived stamina at hookset.
    pub fn multiplier(self) -> f64 {
        match self {
            StaminaClass::Low => 0.6,
            StaminaClass::Medium => 1.0,
            StaminaClass::High => 1.5,
            StaminaClass::VeryHigh => 2.2,
        }
    }
}

/// Requested size bracket for a spawned predator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    Trophy,
}

impl SizeClass {
    pub fn weight_multiplier(self) -> f64 {
        match self {
            SizeClass::Small => 0.5,
            SizeClass::Medium => 1.0,
            SizeClass::Large => 1.6,
            SizeClass::Trophy => 2.5,
        }
    }
}

/// Detection envelope: horizontal range by vertical range, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionProfile {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            horizontal: 18.0,
            vertical: 5.0,
        }
    }
}

/// Flocking parameters for schooling species.
///
/// Radii are in world units; weights scale the steering contributions.
/// `enabled = false` marks a solitary species that skips the flock pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolingParams {
    pub enabled: bool,
    pub separation_radius: f64,
    pub separation_weight: f64,
    pub alignment_radius: f64,
    pub alignment_weight: f64,
    pub cohesion_radius: f64,
    pub cohesion_weight: f64,
    pub panic_radius: f64,
    pub panic_speed_mult: f64,
}

impl Default for SchoolingParams {
    fn default() -> Self {
        Self {
            enabled: false,
            separation_radius: 1.2,
            separation_weight: 1.6,
            alignment_radius: 4.0,
            alignment_weight: 0.8,
            cohesion_radius: 8.0,
            cohesion_weight: 0.5,
            panic_radius: 10.0,
            panic_speed_mult: 1.8,
        }
    }
}

/// Diet declaration. The eat relation is treated as symmetric truth: it is
/// permitted if either the eater declares the prey's category in `eats` or
/// the prey declares the eater's species name in `eaten_by`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DietProfile {
    pub eats: Vec<PreyCategory>,
    pub eaten_by: Vec<String>,
}

/// Per-species trait record. Pure data, consumed by every core component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTraits {
    pub name: String,
    pub category: PreyCategory,
    pub style: BehaviorStyle,
    /// Sustained swimming speed, world units per tick.
    pub cruise_speed: f64,
    /// Burst speed used while chasing, fleeing, or fighting.
    pub burst_speed: f64,
    pub detection: DetectionProfile,
    /// Retrieve speed that maximizes lure interest.
    pub optimal_lure_speed: f64,
    /// 0.0..=1.0; scales interest gain toward the lure.
    pub aggressiveness: f64,
    /// Accumulated interest needed before committing to a chase.
    pub interest_threshold: f64,
    pub strike_distance: f64,
    /// Hunger must strictly exceed this before prey-hunting begins.
    pub feeding_threshold: f64,
    pub consumption_range: f64,
    /// Hunger restored to whoever eats this species.
    pub nutrition: f64,
    pub stamina: StaminaClass,
    /// Preferred depth band (shallow bound, deep bound).
    pub depth_band: (f64, f64),
    /// Nominal adult weight in kilograms.
    pub weight_kg: f64,
    pub schooling: SchoolingParams,
    pub diet: DietProfile,
}

impl Default for SpeciesTraits {
    /// The conservative fallback record: slow, timid, eats nothing, solitary.
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Opportunistic,
            cruise_speed: 0.4,
            burst_speed: 0.8,
            detection: DetectionProfile::default(),
            optimal_lure_speed: 0.6,
            aggressiveness: 0.2,
            interest_threshold: 4.0,
            strike_distance: 1.5,
            feeding_threshold: 70.0,
            consumption_range: 1.0,
            nutrition: 10.0,
            stamina: StaminaClass::Medium,
            depth_band: (2.0, 10.0),
            weight_kg: 1.0,
            schooling: SchoolingParams::default(),
            diet: DietProfile::default(),
        }
    }
}

//! Species trait catalog.
//!
//! Per-species behavior is data, not subclasses: a single generic organism
//! is parameterized by the trait record looked up here. Missing or
//! malformed records degrade to a conservative fallback instead of failing.

use crate::error::ConfigError;
use std::collections::HashMap;
use tightline_data::{
    BehaviorStyle, DetectionProfile, DietProfile, PreyCategory, SchoolingParams, SpeciesId,
    SpeciesTraits, StaminaClass,
};

/// Read-only trait table with a precomputed eat-legality matrix.
///
/// The eat relation is symmetric truth: `can_eat(a, b)` holds when species
/// `a` declares `b`'s category in `eats` OR species `b` declares `a`'s name
/// in `eaten_by`, so the check is idempotent regardless of which side asks.
pub struct SpeciesCatalog {
    traits: Vec<SpeciesTraits>,
    by_name: HashMap<String, SpeciesId>,
    eat_matrix: Vec<bool>,
    plankton_eater: Vec<bool>,
    fallback: SpeciesTraits,
}

impl SpeciesCatalog {
    /// Builds a catalog from a trait table, sanitizing each record.
    pub fn from_traits(mut table: Vec<SpeciesTraits>) -> Result<Self, ConfigError> {
        if table.is_empty() {
            return Err(ConfigError::EmptySpeciesTable);
        }
        for traits in &mut table {
            sanitize(traits);
        }

        let mut by_name = HashMap::new();
        for (idx, traits) in table.iter().enumerate() {
            by_name.insert(traits.name.clone(), SpeciesId(idx as u16));
        }

        let n = table.len();
        let mut eat_matrix = vec![false; n * n];
        let mut plankton_eater = vec![false; n];
        for (a, eater) in table.iter().enumerate() {
            plankton_eater[a] = eater.diet.eats.contains(&PreyCategory::Plankton);
            for (b, prey) in table.iter().enumerate() {
                if a == b {
                    continue;
                }
                let declared_by_eater = eater.diet.eats.contains(&prey.category)
                    && prey.category != PreyCategory::Plankton;
                let declared_by_prey = prey.diet.eaten_by.iter().any(|name| {
                    if by_name.contains_key(name) {
                        *name == eater.name
                    } else {
                        tracing::warn!(species = %prey.name, unknown = %name,
                            "eaten_by references an unknown species, ignoring");
                        false
                    }
                });
                eat_matrix[a * n + b] = declared_by_eater || declared_by_prey;
            }
        }

        Ok(Self {
            traits: table,
            by_name,
            eat_matrix,
            plankton_eater,
            fallback: SpeciesTraits::default(),
        })
    }

    /// The built-in freshwater species table used when no override is
    /// configured.
    pub fn builtin() -> Self {
        Self::from_traits(builtin_species()).expect("builtin species table is non-empty")
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Trait lookup. Unknown ids resolve to the conservative fallback.
    pub fn get(&self, id: SpeciesId) -> &SpeciesTraits {
        self.traits.get(id.0 as usize).unwrap_or(&self.fallback)
    }

    pub fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.by_name.get(name).copied()
    }

    /// Resolves a species name, degrading to the fallback record when the
    /// name is unknown (logged, never fatal).
    pub fn id_or_fallback(&self, name: &str) -> SpeciesId {
        match self.by_name.get(name) {
            Some(id) => *id,
            None => {
                tracing::warn!(species = name, "unknown species, using fallback traits");
                SpeciesId::FALLBACK
            }
        }
    }

    /// Whether `eater` may consume an organism of species `prey`.
    pub fn can_eat(&self, eater: SpeciesId, prey: SpeciesId) -> bool {
        let n = self.traits.len();
        let (a, b) = (eater.0 as usize, prey.0 as usize);
        if a >= n || b >= n {
            return false;
        }
        self.eat_matrix[a * n + b]
    }

    /// Whether this species grazes the background plankton tier.
    pub fn eats_plankton(&self, id: SpeciesId) -> bool {
        self.plankton_eater.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Whether this species has any eligible prey species in the catalog.
    pub fn has_prey(&self, id: SpeciesId) -> bool {
        let n = self.traits.len();
        let a = id.0 as usize;
        if a >= n {
            return false;
        }
        self.eat_matrix[a * n..(a + 1) * n].iter().any(|&x| x)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesTraits)> {
        self.traits
            .iter()
            .enumerate()
            .map(|(i, t)| (SpeciesId(i as u16), t))
    }
}

/// Clamps out-of-range trait values back to usable ones, warning once per
/// field. A record that is broken beyond repair is replaced wholesale.
fn sanitize(traits: &mut SpeciesTraits) {
    if !traits.cruise_speed.is_finite()
        || traits.cruise_speed <= 0.0
        || !traits.burst_speed.is_finite()
        || traits.burst_speed <= 0.0
    {
        tracing::warn!(species = %traits.name, "unusable speed traits, substituting defaults");
        let name = traits.name.clone();
        *traits = SpeciesTraits {
            name,
            ..SpeciesTraits::default()
        };
        return;
    }
    if !(0.0..=1.0).contains(&traits.aggressiveness) {
        tracing::warn!(species = %traits.name, value = traits.aggressiveness,
            "aggressiveness outside [0, 1], clamping");
        traits.aggressiveness = traits.aggressiveness.clamp(0.0, 1.0);
    }
    if traits.depth_band.0 > traits.depth_band.1 {
        traits.depth_band = (traits.depth_band.1, traits.depth_band.0);
    }
    if traits.burst_speed < traits.cruise_speed {
        traits.burst_speed = traits.cruise_speed;
    }
}

fn builtin_species() -> Vec<SpeciesTraits> {
    vec![
        SpeciesTraits {
            name: "largemouth_bass".into(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Opportunistic,
            cruise_speed: 0.6,
            burst_speed: 1.5,
            detection: DetectionProfile {
                horizontal: 20.0,
                vertical: 6.0,
            },
            optimal_lure_speed: 0.9,
            aggressiveness: 0.8,
            interest_threshold: 3.0,
            strike_distance: 2.0,
            feeding_threshold: 55.0,
            consumption_range: 1.2,
            nutrition: 40.0,
            stamina: StaminaClass::High,
            depth_band: (1.0, 8.0),
            weight_kg: 2.5,
            schooling: SchoolingParams::default(),
            diet: DietProfile {
                eats: vec![PreyCategory::Baitfish, PreyCategory::Panfish],
                eaten_by: vec![],
            },
        },
        SpeciesTraits {
            name: "northern_pike".into(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Ambush,
            cruise_speed: 0.5,
            burst_speed: 1.9,
            detection: DetectionProfile {
                horizontal: 24.0,
                vertical: 5.0,
            },
            optimal_lure_speed: 1.1,
            aggressiveness: 0.9,
            interest_threshold: 2.5,
            strike_distance: 1.6,
            feeding_threshold: 50.0,
            consumption_range: 1.4,
            nutrition: 55.0,
            stamina: StaminaClass::Medium,
            depth_band: (2.0, 6.0),
            weight_kg: 4.0,
            schooling: SchoolingParams::default(),
            diet: DietProfile {
                eats: vec![PreyCategory::Baitfish, PreyCategory::Panfish],
                eaten_by: vec![],
            },
        },
        SpeciesTraits {
            name: "muskellunge".into(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Ambush,
            cruise_speed: 0.5,
            burst_speed: 2.1,
            detection: DetectionProfile {
                horizontal: 26.0,
                vertical: 6.0,
            },
            optimal_lure_speed: 1.3,
            aggressiveness: 0.65,
            interest_threshold: 4.5,
            strike_distance: 1.8,
            feeding_threshold: 60.0,
            consumption_range: 1.6,
            nutrition: 70.0,
            stamina: StaminaClass::VeryHigh,
            depth_band: (3.0, 9.0),
            weight_kg: 9.0,
            schooling: SchoolingParams::default(),
            diet: DietProfile {
                eats: vec![
                    PreyCategory::Baitfish,
                    PreyCategory::Panfish,
                    PreyCategory::GameFish,
                ],
                eaten_by: vec![],
            },
        },
        SpeciesTraits {
            name: "walleye".into(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Pursuit,
            cruise_speed: 0.7,
            burst_speed: 1.4,
            detection: DetectionProfile {
                horizontal: 22.0,
                vertical: 8.0,
            },
            optimal_lure_speed: 0.7,
            aggressiveness: 0.7,
            interest_threshold: 3.5,
            strike_distance: 1.3,
            feeding_threshold: 50.0,
            consumption_range: 1.1,
            nutrition: 35.0,
            stamina: StaminaClass::Medium,
            depth_band: (6.0, 18.0),
            weight_kg: 2.0,
            schooling: SchoolingParams::default(),
            diet: DietProfile {
                eats: vec![PreyCategory::Baitfish],
                eaten_by: vec!["muskellunge".into()],
            },
        },
        SpeciesTraits {
            name: "yellow_perch".into(),
            category: PreyCategory::Panfish,
            style: BehaviorStyle::Schooling,
            cruise_speed: 0.5,
            burst_speed: 1.0,
            detection: DetectionProfile {
                horizontal: 10.0,
                vertical: 4.0,
            },
            optimal_lure_speed: 0.4,
            aggressiveness: 0.4,
            interest_threshold: 5.0,
            strike_distance: 0.8,
            feeding_threshold: 40.0,
            consumption_range: 0.8,
            nutrition: 18.0,
            stamina: StaminaClass::Low,
            depth_band: (2.0, 12.0),
            weight_kg: 0.3,
            schooling: SchoolingParams {
                enabled: true,
                separation_radius: 1.5,
                separation_weight: 1.4,
                alignment_radius: 5.0,
                alignment_weight: 0.7,
                cohesion_radius: 10.0,
                cohesion_weight: 0.45,
                panic_radius: 9.0,
                panic_speed_mult: 1.7,
            },
            diet: DietProfile {
                eats: vec![PreyCategory::Plankton],
                eaten_by: vec![
                    "largemouth_bass".into(),
                    "northern_pike".into(),
                    "muskellunge".into(),
                ],
            },
        },
        SpeciesTraits {
            name: "golden_shiner".into(),
            category: PreyCategory::Baitfish,
            style: BehaviorStyle::Schooling,
            cruise_speed: 0.55,
            burst_speed: 1.1,
            detection: DetectionProfile {
                horizontal: 8.0,
                vertical: 3.0,
            },
            optimal_lure_speed: 0.3,
            aggressiveness: 0.2,
            interest_threshold: 6.0,
            strike_distance: 0.5,
            feeding_threshold: 35.0,
            consumption_range: 0.6,
            nutrition: 12.0,
            stamina: StaminaClass::Low,
            depth_band: (0.5, 5.0),
            weight_kg: 0.1,
            schooling: SchoolingParams {
                enabled: true,
                separation_radius: 0.9,
                separation_weight: 1.8,
                alignment_radius: 3.5,
                alignment_weight: 0.9,
                cohesion_radius: 7.0,
                cohesion_weight: 0.6,
                panic_radius: 10.0,
                panic_speed_mult: 2.0,
            },
            diet: DietProfile {
                eats: vec![PreyCategory::Plankton],
                eaten_by: vec![
                    "largemouth_bass".into(),
                    "northern_pike".into(),
                    "muskellunge".into(),
                    "walleye".into(),
                ],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_resolves() {
        let catalog = SpeciesCatalog::builtin();
        assert!(catalog.id_of("northern_pike").is_some());
        assert!(catalog.id_of("kraken").is_none());
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_eat_relation_is_symmetric_truth() {
        let catalog = SpeciesCatalog::builtin();
        let pike = catalog.id_of("northern_pike").unwrap();
        let shiner = catalog.id_of("golden_shiner").unwrap();
        let walleye = catalog.id_of("walleye").unwrap();
        let musky = catalog.id_of("muskellunge").unwrap();

        // declared from the eater side (pike eats baitfish)
        assert!(catalog.can_eat(pike, shiner));
        // declared only from the prey side (walleye lists muskellunge)
        assert!(catalog.can_eat(musky, walleye));
        // never the other way around
        assert!(!catalog.can_eat(shiner, pike));
        assert!(!catalog.can_eat(walleye, musky));
    }

    #[test]
    fn test_plankton_is_not_an_organism_relation() {
        let catalog = SpeciesCatalog::builtin();
        let perch = catalog.id_of("yellow_perch").unwrap();
        assert!(catalog.eats_plankton(perch));
        // eating plankton gives no license to eat other organisms
        let shiner = catalog.id_of("golden_shiner").unwrap();
        assert!(!catalog.can_eat(perch, shiner));
    }

    #[test]
    fn test_unknown_species_falls_back() {
        let catalog = SpeciesCatalog::builtin();
        let id = catalog.id_or_fallback("loch_ness_monster");
        assert_eq!(id, SpeciesId::FALLBACK);
        let traits = catalog.get(id);
        assert_eq!(traits.name, "unknown");
        assert!(traits.aggressiveness <= 0.3);
        assert!(!catalog.has_prey(id));
    }

    #[test]
    fn test_sanitize_replaces_broken_record() {
        let mut broken = SpeciesTraits {
            name: "broken".into(),
            cruise_speed: f64::NAN,
            ..SpeciesTraits::default()
        };
        sanitize(&mut broken);
        assert_eq!(broken.name, "broken");
        assert!(broken.cruise_speed > 0.0);
    }

    #[test]
    fn test_empty_table_is_an_error() {
        assert!(SpeciesCatalog::from_traits(vec![]).is_err());
    }
}

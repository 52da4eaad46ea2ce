//! Shared test scaffolding: a seeded world builder plus surgical accessors
//! for placing organisms and reading machine state mid-scenario.

use tightline_core::{SimConfig, World};
use tightline_data::{
    Behavior, BehaviorState, BehaviorStyle, Body, DetectionProfile, DietProfile, Identity,
    PreyCategory, SchoolingParams, SchoolMember, SpeciesTraits, StaminaClass, Vitals,
};
use uuid::Uuid;

/// Two-species table with wide detection and a low interest threshold, so
/// scenario tests stay short and controllable.
#[allow(dead_code)]
pub fn test_species() -> Vec<SpeciesTraits> {
    vec![
        SpeciesTraits {
            name: "test_pike".into(),
            category: PreyCategory::GameFish,
            style: BehaviorStyle::Pursuit,
            cruise_speed: 0.6,
            burst_speed: 1.5,
            detection: DetectionProfile {
                horizontal: 40.0,
                vertical: 15.0,
            },
            optimal_lure_speed: 1.0,
            aggressiveness: 0.9,
            interest_threshold: 0.3,
            strike_distance: 3.0,
            feeding_threshold: 50.0,
            consumption_range: 1.5,
            nutrition: 50.0,
            stamina: StaminaClass::VeryHigh,
            depth_band: (0.0, 30.0),
            weight_kg: 4.0,
            schooling: SchoolingParams::default(),
            diet: DietProfile {
                eats: vec![PreyCategory::Baitfish],
                eaten_by: vec![],
            },
        },
        SpeciesTraits {
            name: "test_shiner".into(),
            category: PreyCategory::Baitfish,
            style: BehaviorStyle::Schooling,
            cruise_speed: 0.5,
            burst_speed: 1.0,
            detection: DetectionProfile {
                horizontal: 8.0,
                vertical: 3.0,
            },
            optimal_lure_speed: 0.3,
            aggressiveness: 0.1,
            interest_threshold: 9.0,
            strike_distance: 0.5,
            feeding_threshold: 35.0,
            consumption_range: 0.6,
            nutrition: 20.0,
            stamina: StaminaClass::Low,
            depth_band: (0.5, 10.0),
            weight_kg: 0.1,
            schooling: SchoolingParams {
                enabled: true,
                separation_radius: 1.0,
                separation_weight: 1.5,
                alignment_radius: 4.0,
                alignment_weight: 0.8,
                cohesion_radius: 8.0,
                cohesion_weight: 0.5,
                panic_radius: 9.0,
                panic_speed_mult: 2.0,
            },
            diet: DietProfile {
                eats: vec![PreyCategory::Plankton],
                eaten_by: vec!["test_pike".into()],
            },
        },
    ]
}

#[allow(dead_code)]
pub struct WorldBuilder {
    config: SimConfig,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// Deterministic world with ambient food spawning disabled, so tests
    /// control every organism explicitly.
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.world.seed = Some(42);
        config.world.initial_food_clusters = 0;
        config.foodweb.cluster_spawn_chance = 0.0;
        Self { config }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn build(self) -> World {
        World::new(self.config).expect("test world construction")
    }
}

/// Predator ids in registry (spawn-sequence) order.
#[allow(dead_code)]
pub fn predator_ids(world: &World) -> Vec<Uuid> {
    let mut ids: Vec<(u64, Uuid)> = world
        .registry
        .ecs
        .query::<(&Identity, &Behavior)>()
        .iter()
        .map(|(_, (identity, _))| (identity.seq, identity.id))
        .collect();
    ids.sort();
    ids.into_iter().map(|(_, id)| id).collect()
}

/// School-member ids in registry order.
#[allow(dead_code)]
pub fn member_ids(world: &World) -> Vec<Uuid> {
    let mut ids: Vec<(u64, Uuid)> = world
        .registry
        .ecs
        .query::<(&Identity, &SchoolMember)>()
        .iter()
        .map(|(_, (identity, _))| (identity.seq, identity.id))
        .collect();
    ids.sort();
    ids.into_iter().map(|(_, id)| id).collect()
}

#[allow(dead_code)]
pub fn state_of(world: &World, id: Uuid) -> BehaviorState {
    behavior_of(world, id).state
}

#[allow(dead_code)]
pub fn behavior_of(world: &World, id: Uuid) -> Behavior {
    for (_, (identity, behavior)) in world.registry.ecs.query::<(&Identity, &Behavior)>().iter() {
        if identity.id == id {
            return behavior.clone();
        }
    }
    panic!("no predator {id}");
}

#[allow(dead_code)]
pub fn body_of(world: &World, id: Uuid) -> Body {
    for (_, (identity, body)) in world.registry.ecs.query::<(&Identity, &Body)>().iter() {
        if identity.id == id {
            return *body;
        }
    }
    panic!("no organism {id}");
}

#[allow(dead_code)]
pub fn vitals_of(world: &World, id: Uuid) -> Vitals {
    for (_, (identity, vitals)) in world.registry.ecs.query::<(&Identity, &Vitals)>().iter() {
        if identity.id == id {
            return *vitals;
        }
    }
    panic!("no predator {id}");
}

#[allow(dead_code)]
pub fn set_state(world: &mut World, id: Uuid, state: BehaviorState) {
    for (_, (identity, behavior)) in world
        .registry
        .ecs
        .query_mut::<(&Identity, &mut Behavior)>()
    {
        if identity.id == id {
            behavior.state = state;
            return;
        }
    }
    panic!("no predator {id}");
}

#[allow(dead_code)]
pub fn set_hunger(world: &mut World, id: Uuid, hunger: f64) {
    for (_, (identity, vitals)) in world.registry.ecs.query_mut::<(&Identity, &mut Vitals)>() {
        if identity.id == id {
            vitals.hunger = hunger;
            return;
        }
    }
    panic!("no predator {id}");
}

/// Teleports an organism and zeroes its velocity.
#[allow(dead_code)]
pub fn place(world: &mut World, id: Uuid, x: f64, y: f64, depth: f64) {
    for (_, (identity, body)) in world.registry.ecs.query_mut::<(&Identity, &mut Body)>() {
        if identity.id == id {
            body.x = x;
            body.y = y;
            body.depth = depth;
            body.vx = 0.0;
            body.vy = 0.0;
            body.vd = 0.0;
            return;
        }
    }
    panic!("no organism {id}");
}

#[allow(dead_code)]
pub fn set_wary(world: &mut World, id: Uuid, ticks: u32) {
    for (_, (identity, behavior)) in world
        .registry
        .ecs
        .query_mut::<(&Identity, &mut Behavior)>()
    {
        if identity.id == id {
            behavior.wary_ticks = ticks;
            return;
        }
    }
    panic!("no predator {id}");
}

#[allow(dead_code)]
pub fn set_commit(world: &mut World, id: Uuid, ticks: u32) {
    for (_, (identity, behavior)) in world
        .registry
        .ecs
        .query_mut::<(&Identity, &mut Behavior)>()
    {
        if identity.id == id {
            behavior.commit_ticks = ticks;
            return;
        }
    }
    panic!("no predator {id}");
}

#[allow(dead_code)]
pub fn member_panic(world: &World, id: Uuid) -> bool {
    for (_, (identity, member)) in world
        .registry
        .ecs
        .query::<(&Identity, &SchoolMember)>()
        .iter()
    {
        if identity.id == id {
            return member.panic;
        }
    }
    panic!("no member {id}");
}

#[allow(dead_code)]
pub fn school_of(world: &World, id: Uuid) -> tightline_data::SchoolId {
    for (_, (identity, member)) in world
        .registry
        .ecs
        .query::<(&Identity, &SchoolMember)>()
        .iter()
    {
        if identity.id == id {
            return member.school;
        }
    }
    panic!("no member {id}");
}

/// Plankton items as (id, x, y, depth), registry order.
#[allow(dead_code)]
pub fn food_items(world: &World) -> Vec<(Uuid, f64, f64, f64)> {
    let mut rows: Vec<(u64, (Uuid, f64, f64, f64))> = world
        .registry
        .ecs
        .query::<(&Identity, &Body, &tightline_data::FoodResource)>()
        .iter()
        .map(|(_, (identity, body, _))| {
            (identity.seq, (identity.id, body.x, body.y, body.depth))
        })
        .collect();
    rows.sort_by_key(|(seq, _)| *seq);
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Full comparable state of every organism, sorted by registry order.
#[allow(dead_code)]
pub fn organism_states(world: &World) -> Vec<(Uuid, f64, f64, f64, Option<(f64, f64)>)> {
    let mut rows: Vec<(u64, (Uuid, f64, f64, f64, Option<(f64, f64)>))> = world
        .registry
        .ecs
        .query::<(&Identity, &Body, Option<&Vitals>)>()
        .iter()
        .map(|(_, (identity, body, vitals))| {
            (
                identity.seq,
                (
                    identity.id,
                    body.x,
                    body.y,
                    body.depth,
                    vitals.map(|v| (v.hunger, v.health)),
                ),
            )
        })
        .collect();
    rows.sort_by_key(|(seq, _)| *seq);
    rows.into_iter().map(|(_, row)| row).collect()
}

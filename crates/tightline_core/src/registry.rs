//! Live-organism registry.
//!
//! All organisms live in a hecs world: a generational arena with stable
//! handles and reused slots. Spawns and despawns are never applied
//! mid-iteration; they queue here and are applied at the safe points
//! between component passes, so no pass ever observes a half-removed
//! organism.

use crate::catalog::SpeciesCatalog;
use crate::config::SimConfig;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tightline_data::{
    Behavior, Body, FoodResource, Identity, SchoolId, SchoolMember, SizeClass, SpeciesId, Vitals,
};
use uuid::Uuid;

/// Why an organism left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    Caught,
    Consumed,
    Migrated,
    Expired,
}

/// Bookkeeping for one live school.
#[derive(Debug, Clone)]
pub struct SchoolInfo {
    pub species: SpeciesId,
    pub members: usize,
}

struct PendingPredator {
    species: SpeciesId,
    size: SizeClass,
    origin: (f64, f64, f64),
}

struct PendingSchool {
    species: SpeciesId,
    count: usize,
    origin: (f64, f64, f64),
}

/// Registry of live organisms with deferred lifecycle mutation.
pub struct Registry {
    pub ecs: hecs::World,
    next_seq: u64,
    next_school: u32,
    schools: HashMap<SchoolId, SchoolInfo>,
    organism_count: usize,
    food_count: usize,
    pending_predators: Vec<PendingPredator>,
    pending_schools: Vec<PendingSchool>,
    pending_clusters: Vec<(f64, f64, f64)>,
    pending_despawns: Vec<(Uuid, DespawnReason)>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            ecs: hecs::World::new(),
            next_seq: 0,
            next_school: 0,
            schools: HashMap::new(),
            organism_count: 0,
            food_count: 0,
            pending_predators: Vec::new(),
            pending_schools: Vec::new(),
            pending_clusters: Vec::new(),
            pending_despawns: Vec::new(),
        }
    }

    /// Live predators plus school members (food excluded).
    pub fn population(&self) -> usize {
        self.organism_count
    }

    pub fn food_count(&self) -> usize {
        self.food_count
    }

    pub fn school(&self, id: SchoolId) -> Option<&SchoolInfo> {
        self.schools.get(&id)
    }

    pub fn schools(&self) -> &HashMap<SchoolId, SchoolInfo> {
        &self.schools
    }

    pub fn request_predator(&mut self, species: SpeciesId, size: SizeClass, origin: (f64, f64, f64)) {
        self.pending_predators.push(PendingPredator {
            species,
            size,
            origin,
        });
    }

    pub fn request_school(&mut self, species: SpeciesId, count: usize, origin: (f64, f64, f64)) {
        self.pending_schools.push(PendingSchool {
            species,
            count,
            origin,
        });
    }

    pub fn request_food_cluster(&mut self, origin: (f64, f64, f64)) {
        self.pending_clusters.push(origin);
    }

    /// Marks an organism for removal at the next safe point. Duplicate
    /// requests for the same organism are collapsed; the first reason wins.
    pub fn queue_despawn(&mut self, id: Uuid, reason: DespawnReason) {
        self.pending_despawns.push((id, reason));
    }

    /// Inserts a fully-formed predator (snapshot restore path). The spawn
    /// sequence counter is advanced past the record's `seq` so future
    /// spawns keep strictly increasing registry order.
    pub fn insert_predator(
        &mut self,
        identity: Identity,
        body: Body,
        vitals: Vitals,
        behavior: Behavior,
    ) -> hecs::Entity {
        self.next_seq = self.next_seq.max(identity.seq + 1);
        self.organism_count += 1;
        self.ecs.spawn((identity, body, vitals, behavior))
    }

    fn alloc_identity<R: Rng>(&mut self, species: SpeciesId, rng: &mut R) -> Identity {
        let seq = self.next_seq;
        self.next_seq += 1;
        Identity {
            id: Uuid::from_u128(rng.gen()),
            seq,
            species,
        }
    }

    /// Applies every queued spawn. Requests beyond the population caps are
    /// dropped silently (debug-logged), never surfaced as errors.
    pub fn apply_spawns<R: Rng>(
        &mut self,
        catalog: &SpeciesCatalog,
        config: &SimConfig,
        tick: u64,
        rng: &mut R,
    ) {
        let world = &config.world;

        for req in std::mem::take(&mut self.pending_schools) {
            let traits = catalog.get(req.species);
            if !traits.schooling.enabled {
                tracing::warn!(species = %traits.name, "spawn_school for a non-schooling species, dropped");
                continue;
            }
            let school = SchoolId(self.next_school);
            self.next_school += 1;
            let spread = traits.schooling.cohesion_radius.max(1.0);
            let mut spawned = 0usize;
            for _ in 0..req.count {
                if self.organism_count >= world.max_organisms {
                    tracing::debug!("organism cap reached, dropping school spawn remainder");
                    break;
                }
                let identity = self.alloc_identity(req.species, rng);
                let x = (req.origin.0 + rng.gen_range(-spread..=spread)).clamp(0.0, world.width);
                let y = (req.origin.1 + rng.gen_range(-spread..=spread)).clamp(0.0, world.height);
                let depth = (req.origin.2 + rng.gen_range(-1.0..=1.0))
                    .clamp(traits.depth_band.0.min(world.max_depth), world.max_depth);
                let mut body = Body::at(x, y, depth, traits.weight_kg, tick);
                body.vx = rng.gen_range(-0.5..=0.5) * traits.cruise_speed;
                body.vy = rng.gen_range(-0.5..=0.5) * traits.cruise_speed;
                self.ecs.spawn((
                    identity,
                    body,
                    SchoolMember {
                        school,
                        panic: false,
                    },
                ));
                self.organism_count += 1;
                spawned += 1;
            }
            if spawned > 0 {
                self.schools.insert(
                    school,
                    SchoolInfo {
                        species: req.species,
                        members: spawned,
                    },
                );
            }
        }

        for req in std::mem::take(&mut self.pending_predators) {
            if self.organism_count >= world.max_organisms {
                tracing::debug!("organism cap reached, dropping predator spawn");
                continue;
            }
            let traits = catalog.get(req.species);
            let identity = self.alloc_identity(req.species, rng);
            let weight =
                traits.weight_kg * req.size.weight_multiplier() * rng.gen_range(0.85..=1.15);
            let x = req.origin.0.clamp(0.0, world.width);
            let y = req.origin.1.clamp(0.0, world.height);
            let depth = req.origin.2.clamp(0.0, world.max_depth);
            let body = Body::at(x, y, depth, weight, tick);
            let vitals = Vitals::new(rng.gen_range(20.0..=60.0), 100.0);
            self.ecs
                .spawn((identity, body, vitals, Behavior::new(tick)));
            self.organism_count += 1;
        }

        for origin in std::mem::take(&mut self.pending_clusters) {
            for _ in 0..config.foodweb.cluster_size {
                if self.food_count >= world.max_food {
                    tracing::debug!("food cap reached, dropping cluster remainder");
                    break;
                }
                let identity = self.alloc_identity(SpeciesId::FALLBACK, rng);
                let r = config.foodweb.cluster_radius;
                let x = (origin.0 + rng.gen_range(-r..=r)).clamp(0.0, world.width);
                let y = (origin.1 + rng.gen_range(-r..=r)).clamp(0.0, world.height);
                let depth = (origin.2 + rng.gen_range(-1.0..=1.0)).clamp(0.0, world.max_depth);
                let mut body = Body::at(x, y, depth, 0.0, tick);
                body.visible = false;
                self.ecs.spawn((
                    identity,
                    body,
                    FoodResource {
                        remaining_life: config.foodweb.plankton_lifespan_ticks,
                        consumed: false,
                    },
                ));
                self.food_count += 1;
            }
        }
    }

    /// Ages the plankton tier; expired items queue for removal.
    pub fn expire_food(&mut self) {
        let mut expired = Vec::new();
        for (_, (identity, food)) in self.ecs.query_mut::<(&Identity, &mut FoodResource)>() {
            if food.consumed {
                continue;
            }
            food.remaining_life = food.remaining_life.saturating_sub(1);
            if food.remaining_life == 0 {
                expired.push(identity.id);
            }
        }
        for id in expired {
            self.queue_despawn(id, DespawnReason::Expired);
        }
    }

    /// Applies every queued despawn and returns what was removed. Schools
    /// whose last member is removed disappear with it.
    pub fn apply_despawns(
        &mut self,
        id_index: &HashMap<Uuid, hecs::Entity>,
    ) -> Vec<(Uuid, DespawnReason, SpeciesId)> {
        let mut removed = Vec::new();
        let mut seen = HashSet::new();
        for (id, reason) in std::mem::take(&mut self.pending_despawns) {
            if !seen.insert(id) {
                continue;
            }
            let Some(&entity) = id_index.get(&id) else {
                continue;
            };
            if !self.ecs.contains(entity) {
                continue;
            }
            let species = match self.ecs.get::<&Identity>(entity) {
                Ok(identity) => identity.species,
                Err(_) => continue,
            };
            let school = self
                .ecs
                .get::<&SchoolMember>(entity)
                .map(|m| m.school)
                .ok();
            let is_food = self.ecs.get::<&FoodResource>(entity).is_ok();

            if self.ecs.despawn(entity).is_err() {
                continue;
            }
            if is_food {
                self.food_count = self.food_count.saturating_sub(1);
            } else {
                self.organism_count = self.organism_count.saturating_sub(1);
            }
            if let Some(school_id) = school {
                if let Some(info) = self.schools.get_mut(&school_id) {
                    info.members = info.members.saturating_sub(1);
                    if info.members == 0 {
                        self.schools.remove(&school_id);
                        tracing::debug!(school = school_id.0, "last member removed, school disbanded");
                    }
                }
            }
            removed.push((id, reason, species));
        }
        removed
    }
}

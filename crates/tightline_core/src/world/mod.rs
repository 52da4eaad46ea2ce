//! The simulation world: owns the registry, catalog, lure, fight session,
//! and outbound event queue, and exposes the abstract contracts consumed
//! by the input, spawning, sonar, and scoring collaborators.

mod update;

use crate::catalog::SpeciesCatalog;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::events::EventQueue;
use crate::lure::Lure;
use crate::metrics::Metrics;
use crate::registry::Registry;
use crate::spatial::SpatialGrid;
use crate::systems::fight::FightSession;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use tightline_data::{
    Behavior, BehaviorState, Body, Identity, PredatorRecord, SchoolMember, SimEvent, SizeClass,
    SonarContact, SonarFrame, Vitals,
};
use uuid::Uuid;

pub struct World {
    pub config: SimConfig,
    pub catalog: SpeciesCatalog,
    pub tick: u64,
    pub registry: Registry,
    pub lure: Lure,
    pub metrics: Metrics,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) fight: Option<FightSession>,
    pub(crate) events: EventQueue,
    pub(crate) member_grid: SpatialGrid,
    pub(crate) food_grid: SpatialGrid,
    pub(crate) id_index: HashMap<Uuid, hecs::Entity>,
    pub(crate) consumed_this_tick: HashSet<Uuid>,
}

impl World {
    /// Builds a world from configuration. The species table comes from the
    /// config override when present, otherwise the built-in catalog.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let catalog = if config.species.is_empty() {
            SpeciesCatalog::builtin()
        } else {
            SpeciesCatalog::from_traits(config.species.clone())?
        };
        let seed = config.world.seed.unwrap_or(0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let lure = Lure::new(config.world.width * 0.5, config.world.height * 0.5, 1.0);
        let member_grid = SpatialGrid::new(8.0, config.world.width, config.world.height);
        let food_grid = SpatialGrid::new(8.0, config.world.width, config.world.height);

        let mut world = Self {
            registry: Registry::new(),
            catalog,
            tick: 0,
            lure,
            metrics: Metrics::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            fight: None,
            events: EventQueue::new(),
            member_grid,
            food_grid,
            id_index: HashMap::new(),
            consumed_this_tick: HashSet::new(),
            config,
        };
        for _ in 0..world.config.world.initial_food_clusters {
            let x = rng.gen_range(0.0..world.config.world.width);
            let y = rng.gen_range(0.0..world.config.world.height);
            let depth = rng.gen_range(0.0..world.config.world.max_depth * 0.6);
            world.registry.request_food_cluster((x, y, depth));
        }
        Ok(world)
    }

    // ---- spawning collaborator ------------------------------------------

    /// Requests a school of `count` members around `origin`; applied at the
    /// next registry safe point. Over-cap requests are dropped.
    pub fn spawn_school(&mut self, species: &str, count: usize, origin: (f64, f64, f64)) {
        let id = self.catalog.id_or_fallback(species);
        self.registry.request_school(id, count, origin);
    }

    /// Requests one predator of the given size class at `origin`.
    pub fn spawn_predator(&mut self, species: &str, size: SizeClass, origin: (f64, f64, f64)) {
        let id = self.catalog.id_or_fallback(species);
        self.registry.request_predator(id, size, origin);
    }

    // ---- input collaborator ---------------------------------------------

    /// Sets the lure retrieve direction and speed.
    pub fn retrieve_lure(&mut self, direction: (f64, f64, f64), speed: f64) {
        self.lure.retrieve(direction, speed);
    }

    /// One discrete reel action. Ignored when no fight is active or when it
    /// arrives faster than the configured minimum interval.
    pub fn reel(&mut self, intensity: f64) {
        let min_interval = self.config.angling.reel_min_interval_ticks;
        let tick = self.tick;
        if let Some(session) = self.fight.as_mut() {
            if !session.queue_reel(intensity, tick, min_interval) {
                tracing::trace!("reel ignored by rate limit");
            }
        }
    }

    /// Converts a strike into a hookset. The first predator in registry
    /// order with an open strike window hooks; a signal with no striking
    /// predator, or while a fight already owns the line, is a no-op.
    /// Returns whether a fight started.
    pub fn attempt_hookset(&mut self) -> bool {
        if self.fight.is_some() {
            tracing::debug!("hookset ignored, fight already active");
            return false;
        }
        let mut candidate: Option<(u64, hecs::Entity, Uuid)> = None;
        for (entity, (identity, behavior)) in
            self.registry.ecs.query::<(&Identity, &Behavior)>().iter()
        {
            if let BehaviorState::Striking { window } = behavior.state {
                if window > 0 && candidate.map_or(true, |(seq, ..)| identity.seq < seq) {
                    candidate = Some((identity.seq, entity, identity.id));
                }
            }
        }
        let Some((_, entity, id)) = candidate else {
            return false;
        };

        let (species, weight, health) = {
            let Ok((identity, body, vitals, behavior)) = self
                .registry
                .ecs
                .query_one_mut::<(&Identity, &Body, &Vitals, &mut Behavior)>(entity)
            else {
                return false;
            };
            behavior.state = BehaviorState::Hooked;
            behavior.target = tightline_data::Target::Lure;
            (identity.species, body.weight_kg, vitals.health)
        };
        let traits = self.catalog.get(species);
        self.fight = Some(FightSession::new(
            id,
            traits.name.clone(),
            weight,
            health,
            traits.stamina,
        ));
        tracing::info!(predator = %id, species = %traits.name, "hookset, fight started");
        true
    }

    // ---- sonar / scoring collaborators ----------------------------------

    /// Read-only snapshot of every visible organism for the sonar display.
    pub fn sonar_frame(&self) -> SonarFrame {
        let mut contacts: Vec<(u64, SonarContact)> = Vec::new();
        for (_, (identity, body, behavior, member)) in self
            .registry
            .ecs
            .query::<(&Identity, &Body, Option<&Behavior>, Option<&SchoolMember>)>()
            .iter()
        {
            if !body.visible {
                continue;
            }
            let (state, interest) = match (behavior, member) {
                (Some(b), _) => (b.state.label().to_string(), b.state.visual_interest()),
                (None, Some(m)) => {
                    if m.panic {
                        ("panicking".to_string(), 0.6)
                    } else {
                        ("schooling".to_string(), 0.2)
                    }
                }
                (None, None) => continue,
            };
            contacts.push((
                identity.seq,
                SonarContact {
                    id: identity.id,
                    species: identity.species,
                    x: body.x,
                    y: body.y,
                    depth: body.depth,
                    state,
                    interest,
                },
            ));
        }
        contacts.sort_by_key(|(seq, _)| *seq);
        SonarFrame {
            tick: self.tick,
            contacts: contacts.into_iter().map(|(_, c)| c).collect(),
        }
    }

    /// Drains the outbound event queue (catches, escapes, feedings,
    /// migrations), oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// The active fight session, if any.
    pub fn fight(&self) -> Option<&FightSession> {
        self.fight.as_ref()
    }

    pub fn population(&self) -> usize {
        self.registry.population()
    }

    // ---- snapshot round-trip --------------------------------------------

    /// Serializable snapshot of one predator's complete state.
    pub fn predator_record(&self, id: Uuid) -> Option<PredatorRecord> {
        for (_, (identity, body, vitals, behavior)) in self
            .registry
            .ecs
            .query::<(&Identity, &Body, &Vitals, &Behavior)>()
            .iter()
        {
            if identity.id == id {
                return Some(PredatorRecord {
                    identity: *identity,
                    body: *body,
                    vitals: *vitals,
                    behavior: behavior.clone(),
                });
            }
        }
        None
    }

    /// Reconstructs a predator from a record: overwrites the live organism
    /// with the same id, or inserts it if absent. Subsequent tick behavior
    /// is identical to the snapshotted original under the same seed.
    pub fn apply_predator_record(&mut self, record: PredatorRecord) {
        let mut existing = None;
        for (entity, identity) in self.registry.ecs.query::<&Identity>().iter() {
            if identity.id == record.identity.id {
                existing = Some(entity);
                break;
            }
        }
        match existing {
            Some(entity) => {
                let _ = self.registry.ecs.insert(
                    entity,
                    (
                        record.identity,
                        record.body,
                        record.vitals,
                        record.behavior,
                    ),
                );
            }
            None => {
                self.registry.insert_predator(
                    record.identity,
                    record.body,
                    record.vitals,
                    record.behavior,
                );
            }
        }
    }
}

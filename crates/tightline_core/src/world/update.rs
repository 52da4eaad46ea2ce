//! The per-tick update loop.
//!
//! Fixed component order, single-threaded: registry spawn safe point →
//! flocking → food chain → predator decisions → fight resolution →
//! registry despawn safe point. Structural mutation only happens at the
//! two safe points, so no pass iterates a collection it is changing.
//!
//! Determinism: the rng is reseeded from `seed + tick` every tick and every
//! pass iterates organisms in spawn-sequence order, so identical inputs and
//! seed produce identical tick-by-tick state.

use crate::events::timestamp;
use crate::registry::DespawnReason;
use crate::systems::{
    fight, flocking, food_chain, predator, FoodView, LureView, MemberView, PredatorView,
    SchoolSummary,
};
use crate::world::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::time::Instant;
use tightline_data::{
    Behavior, BehaviorState, Body, FoodResource, Identity, SchoolId, SchoolMember, SimEvent,
    Vitals,
};

struct TickViews {
    members: Vec<MemberView>,
    predators: Vec<PredatorView>,
    food: Vec<FoodView>,
    predator_order: Vec<hecs::Entity>,
    schools: Vec<(SchoolId, SchoolSummary)>,
}

impl World {
    /// Advances the simulation by one tick.
    pub fn update(&mut self) {
        let started = Instant::now();
        self.tick += 1;
        let seed = self.config.world.seed.unwrap_or(0);
        self.rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(self.tick).wrapping_add(0x5EED));
        self.consumed_this_tick.clear();

        self.lure.integrate(&self.config.world);

        // Registry safe point: new organisms in, expired plankton queued.
        self.maybe_spawn_plankton();
        self.registry.expire_food();
        self.registry
            .apply_spawns(&self.catalog, &self.config, self.tick, &mut self.rng);

        let mut views = self.collect_views();
        self.rebuild_indices(&views);

        let lure_view = LureView {
            x: self.lure.x,
            y: self.lure.y,
            depth: self.lure.depth,
            speed: self.lure.speed(),
        };

        // Flocking moves schooling prey first, so consumption below always
        // sees this tick's prey positions (predators last moved at the end
        // of the previous tick and have not moved since).
        let flock_ctx = flocking::FlockContext {
            config: &self.config,
            catalog: &self.catalog,
            tick: self.tick,
            members: &views.members,
            member_grid: &self.member_grid,
            predators: &views.predators,
            food: &views.food,
        };
        flocking::run(&mut self.registry.ecs, &flock_ctx);

        // Prey just moved; refresh their view positions so consumption is
        // evaluated against this tick's positions, never stale ones. The
        // grids stay as built; scans inflate radii and re-check exactly.
        self.refresh_member_positions(&mut views.members);

        // Food chain: scan on current positions, apply with the per-tick
        // consumed set, then sighting/migration bookkeeping.
        let chain_ctx = food_chain::ChainContext {
            config: &self.config,
            catalog: &self.catalog,
            tick: self.tick,
            members: &views.members,
            member_grid: &self.member_grid,
            predators: &views.predators,
            food: &views.food,
            food_grid: &self.food_grid,
        };
        let (commands, sighted) = food_chain::scan(&chain_ctx);
        food_chain::apply(
            &mut self.registry,
            &self.id_index,
            commands,
            &mut self.consumed_this_tick,
            &mut self.events,
            &self.config,
            &self.catalog,
            self.tick,
        );
        food_chain::update_sightings(
            &mut self.registry,
            &views.predators,
            &sighted,
            &self.config,
            self.tick,
        );

        // Predator decisions and movement.
        let decision_ctx = predator::DecisionContext {
            config: &self.config,
            catalog: &self.catalog,
            tick: self.tick,
            lure: lure_view,
            fight_active: self.fight.is_some(),
            members: &views.members,
            member_grid: &self.member_grid,
            predators: &views.predators,
            schools: &views.schools,
        };
        let migrated = predator::run(
            &mut self.registry.ecs,
            &decision_ctx,
            &mut self.rng,
            &views.predator_order,
        );
        for id in migrated {
            self.registry.queue_despawn(id, DespawnReason::Migrated);
        }

        // Fight resolution last, so a hookset taken this tick is honored
        // immediately.
        if let Some(mut session) = self.fight.take() {
            let terminal = fight::step(
                &mut self.registry,
                &self.id_index,
                &mut session,
                &self.config,
                &lure_view,
                self.tick,
                &mut self.events,
            );
            if terminal {
                match session.outcome {
                    fight::FightOutcome::Caught => self.metrics.increment("catches"),
                    fight::FightOutcome::LineBroken | fight::FightOutcome::Escaped => {
                        self.metrics.increment("escapes")
                    }
                    fight::FightOutcome::Pending => {}
                }
            } else {
                self.fight = Some(session);
            }
        }

        // Registry safe point: removals out, empty schools dropped.
        let removed = self.registry.apply_despawns(&self.id_index);
        for (id, reason, species) in removed {
            match reason {
                DespawnReason::Migrated => {
                    let name = self.catalog.get(species).name.clone();
                    self.events.push(SimEvent::Migration {
                        id,
                        species: name,
                        tick: self.tick,
                        timestamp: timestamp(),
                    });
                    self.metrics.increment("migrations");
                }
                DespawnReason::Consumed => self.metrics.increment("feedings"),
                DespawnReason::Caught | DespawnReason::Expired => {}
            }
        }

        self.metrics.record_tick(
            started.elapsed(),
            self.registry.population(),
            self.registry.food_count(),
        );
    }

    fn maybe_spawn_plankton(&mut self) {
        if self.registry.food_count() >= self.config.world.max_food {
            return;
        }
        if self.rng.gen::<f64>() >= self.config.foodweb.cluster_spawn_chance {
            return;
        }
        let x = self.rng.gen_range(0.0..self.config.world.width);
        let y = self.rng.gen_range(0.0..self.config.world.height);
        let depth = self.rng.gen_range(0.0..self.config.world.max_depth * 0.6);
        self.registry.request_food_cluster((x, y, depth));
    }

    fn collect_views(&self) -> TickViews {
        let mut members = Vec::new();
        for (entity, (identity, body, member)) in self
            .registry
            .ecs
            .query::<(&Identity, &Body, &SchoolMember)>()
            .iter()
        {
            members.push(MemberView {
                entity,
                id: identity.id,
                seq: identity.seq,
                school: member.school,
                species: identity.species,
                x: body.x,
                y: body.y,
                depth: body.depth,
                vx: body.vx,
                vy: body.vy,
                vd: body.vd,
            });
        }
        members.sort_by_key(|m| m.seq);

        let mut predators = Vec::new();
        for (entity, (identity, body, vitals, behavior)) in self
            .registry
            .ecs
            .query::<(&Identity, &Body, &Vitals, &Behavior)>()
            .iter()
        {
            predators.push(PredatorView {
                entity,
                id: identity.id,
                seq: identity.seq,
                species: identity.species,
                x: body.x,
                y: body.y,
                depth: body.depth,
                hooked: matches!(behavior.state, BehaviorState::Hooked),
                hunting: matches!(behavior.state, BehaviorState::HuntingPrey),
                hunger: vitals.hunger,
            });
        }
        predators.sort_by_key(|p| p.seq);
        let predator_order = predators.iter().map(|p| p.entity).collect();

        let mut food = Vec::new();
        let mut food_seqs = Vec::new();
        for (entity, (identity, body, resource)) in self
            .registry
            .ecs
            .query::<(&Identity, &Body, &FoodResource)>()
            .iter()
        {
            food_seqs.push((identity.seq, food.len()));
            food.push(FoodView {
                entity,
                id: identity.id,
                x: body.x,
                y: body.y,
                depth: body.depth,
                consumed: resource.consumed,
            });
        }
        food_seqs.sort_by_key(|(seq, _)| *seq);
        let food: Vec<FoodView> = {
            let unsorted = food;
            food_seqs.into_iter().map(|(_, i)| unsorted[i]).collect()
        };

        // Aggregate school centroids for target selection, keyed and sorted
        // by school id for deterministic iteration.
        let mut accum: HashMap<SchoolId, (f64, f64, f64, usize)> = HashMap::new();
        for m in &members {
            let entry = accum.entry(m.school).or_insert((0.0, 0.0, 0.0, 0));
            entry.0 += m.x;
            entry.1 += m.y;
            entry.2 += m.depth;
            entry.3 += 1;
        }
        let mut schools: Vec<(SchoolId, SchoolSummary)> = accum
            .into_iter()
            .map(|(id, (sx, sy, sd, count))| {
                let inv = 1.0 / count.max(1) as f64;
                let species = self
                    .registry
                    .school(id)
                    .map(|info| info.species)
                    .unwrap_or_else(|| {
                        members
                            .iter()
                            .find(|m| m.school == id)
                            .map(|m| m.species)
                            .unwrap_or(tightline_data::SpeciesId::FALLBACK)
                    });
                (
                    id,
                    SchoolSummary {
                        species,
                        centroid: (sx * inv, sy * inv, sd * inv),
                        members: count,
                    },
                )
            })
            .collect();
        schools.sort_by_key(|(id, _)| id.0);

        TickViews {
            members,
            predators,
            food,
            predator_order,
            schools,
        }
    }

    fn refresh_member_positions(&self, members: &mut [MemberView]) {
        for view in members.iter_mut() {
            if let Ok(body) = self.registry.ecs.get::<&Body>(view.entity) {
                view.x = body.x;
                view.y = body.y;
                view.depth = body.depth;
                view.vx = body.vx;
                view.vy = body.vy;
                view.vd = body.vd;
            }
        }
    }

    fn rebuild_indices(&mut self, views: &TickViews) {
        let mut positions: Vec<(f64, f64)> = Vec::with_capacity(views.members.len());
        positions.extend(views.members.iter().map(|m| (m.x, m.y)));
        self.member_grid.rebuild(&positions);

        positions.clear();
        positions.extend(views.food.iter().map(|f| (f.x, f.y)));
        self.food_grid.rebuild(&positions);

        self.id_index.clear();
        for (entity, identity) in self.registry.ecs.query::<&Identity>().iter() {
            self.id_index.insert(identity.id, entity);
        }
    }
}

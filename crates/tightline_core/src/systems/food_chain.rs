//! Food-chain resolution.
//!
//! A scan pass walks every predator-capable organism in registry order and
//! emits consumption commands; an apply pass enforces diet legality and
//! marks each prey item consumed at most once per tick, so resolving a
//! command for an already-consumed item is a no-op regardless of how many
//! eaters queued it.
//!
//! The resolver also owns prey-sighting bookkeeping: a predator that has
//! seen no eligible prey for the configured timeout is flipped to
//! `Migrating`, the single coupling point into the decision engine.

use crate::catalog::SpeciesCatalog;
use crate::config::SimConfig;
use crate::events::{timestamp, EventQueue};
use crate::registry::{DespawnReason, Registry};
use crate::spatial::SpatialGrid;
use crate::systems::{dist3, FoodView, MemberView, PredatorView};
use std::collections::{HashMap, HashSet};
use tightline_data::{Behavior, BehaviorState, FoodResource, SimEvent, Vitals};
use uuid::Uuid;

pub struct ChainContext<'a> {
    pub config: &'a SimConfig,
    pub catalog: &'a SpeciesCatalog,
    pub tick: u64,
    pub members: &'a [MemberView],
    pub member_grid: &'a SpatialGrid,
    pub predators: &'a [PredatorView],
    pub food: &'a [FoodView],
    pub food_grid: &'a SpatialGrid,
}

/// One requested consumption, produced by the scan pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainCommand {
    EatOrganism {
        eater: Uuid,
        prey: Uuid,
        nutrition: f64,
    },
    EatPlankton {
        eater: Uuid,
        food: Uuid,
    },
}

/// Scans for consumption opportunities and prey sightings.
///
/// Returns the command list plus the set of predators that sighted any
/// eligible prey this tick.
pub fn scan(ctx: &ChainContext) -> (Vec<ChainCommand>, HashSet<Uuid>) {
    let mut commands = Vec::new();
    let mut sighted = HashSet::new();
    let mut buf = Vec::new();

    for p in ctx.predators {
        if p.hooked {
            continue;
        }
        let traits = ctx.catalog.get(p.species);
        let mut saw_prey = false;
        let mut best: Option<(Uuid, f64, f64)> = None; // (id, dist, nutrition)

        let reach = traits.detection.horizontal + traits.burst_speed;
        ctx.member_grid.query_into(p.x, p.y, reach, &mut buf);
        for &j in buf.iter() {
            let m = &ctx.members[j];
            if !ctx.catalog.can_eat(p.species, m.species) {
                continue;
            }
            let horizontal = ((p.x - m.x).powi(2) + (p.y - m.y).powi(2)).sqrt();
            if horizontal <= traits.detection.horizontal
                && (p.depth - m.depth).abs() <= traits.detection.vertical
            {
                saw_prey = true;
            }
            if p.hunting {
                let d = dist3(p.x, p.y, p.depth, m.x, m.y, m.depth);
                if d <= traits.consumption_range && best.map_or(true, |(_, bd, _)| d < bd) {
                    best = Some((m.id, d, ctx.catalog.get(m.species).nutrition));
                }
            }
        }

        // Predators can themselves be prey (the rule table decides); a
        // hooked fish is off the menu while the fight owns it.
        for q in ctx.predators {
            if q.id == p.id || q.hooked || !ctx.catalog.can_eat(p.species, q.species) {
                continue;
            }
            let horizontal = ((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt();
            if horizontal <= traits.detection.horizontal
                && (p.depth - q.depth).abs() <= traits.detection.vertical
            {
                saw_prey = true;
            }
            if p.hunting {
                let d = dist3(p.x, p.y, p.depth, q.x, q.y, q.depth);
                if d <= traits.consumption_range && best.map_or(true, |(_, bd, _)| d < bd) {
                    best = Some((q.id, d, ctx.catalog.get(q.species).nutrition));
                }
            }
        }

        if saw_prey {
            sighted.insert(p.id);
        }
        if let Some((prey, _, nutrition)) = best {
            commands.push(ChainCommand::EatOrganism {
                eater: p.id,
                prey,
                nutrition,
            });
        }
    }

    // Schooling prey graze the plankton tier.
    let graze_range = ctx.config.foodweb.member_consumption_range;
    for m in ctx.members {
        if !ctx.catalog.eats_plankton(m.species) {
            continue;
        }
        ctx.food_grid.query_into(m.x, m.y, graze_range + 1.0, &mut buf);
        let mut best: Option<(Uuid, f64)> = None;
        for &j in buf.iter() {
            let f = &ctx.food[j];
            if f.consumed {
                continue;
            }
            let d = dist3(m.x, m.y, m.depth, f.x, f.y, f.depth);
            if d <= graze_range && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((f.id, d));
            }
        }
        if let Some((food, _)) = best {
            commands.push(ChainCommand::EatPlankton { eater: m.id, food });
        }
    }

    (commands, sighted)
}

/// Applies consumption commands. `consumed` carries the tick's dedupe set;
/// re-applying a command whose prey is already in it does nothing.
pub fn apply(
    registry: &mut Registry,
    id_index: &HashMap<Uuid, hecs::Entity>,
    commands: Vec<ChainCommand>,
    consumed: &mut HashSet<Uuid>,
    events: &mut EventQueue,
    config: &SimConfig,
    catalog: &SpeciesCatalog,
    tick: u64,
) {
    for command in commands {
        match command {
            ChainCommand::EatOrganism {
                eater,
                prey,
                nutrition,
            } => {
                if consumed.contains(&prey) {
                    continue;
                }
                let (Some(&prey_entity), Some(&eater_entity)) =
                    (id_index.get(&prey), id_index.get(&eater))
                else {
                    continue;
                };
                if !registry.ecs.contains(prey_entity) || !registry.ecs.contains(eater_entity) {
                    continue;
                }
                // Legality re-check against live identities; a stale or
                // illegal command is dropped, not an error.
                let eater_species = match registry.ecs.get::<&tightline_data::Identity>(eater_entity)
                {
                    Ok(i) => i.species,
                    Err(_) => continue,
                };
                let prey_species = match registry.ecs.get::<&tightline_data::Identity>(prey_entity) {
                    Ok(i) => i.species,
                    Err(_) => continue,
                };
                if !catalog.can_eat(eater_species, prey_species) {
                    continue;
                }

                consumed.insert(prey);
                registry.queue_despawn(prey, DespawnReason::Consumed);

                if let Ok((vitals, behavior)) = registry
                    .ecs
                    .query_one_mut::<(&mut Vitals, &mut Behavior)>(eater_entity)
                {
                    vitals.feed(nutrition);
                    vitals.clamp();
                    if matches!(behavior.state, BehaviorState::HuntingPrey) {
                        behavior.state = BehaviorState::Feeding {
                            ticks: config.behavior.feeding_ticks,
                        };
                    }
                }
                events.push(SimEvent::Feeding {
                    eater,
                    prey,
                    tick,
                    timestamp: timestamp(),
                });
            }
            ChainCommand::EatPlankton { eater, food } => {
                if consumed.contains(&food) {
                    continue;
                }
                let Some(&food_entity) = id_index.get(&food) else {
                    continue;
                };
                match registry.ecs.query_one_mut::<&mut FoodResource>(food_entity) {
                    Ok(resource) => {
                        if resource.consumed {
                            continue;
                        }
                        resource.consumed = true;
                    }
                    Err(_) => continue,
                }
                consumed.insert(food);
                registry.queue_despawn(food, DespawnReason::Consumed);
                events.push(SimEvent::Feeding {
                    eater,
                    prey: food,
                    tick,
                    timestamp: timestamp(),
                });
            }
        }
    }
}

/// Updates sighting timestamps and fires the migration signal for
/// predators that have gone too long without seeing prey.
pub fn update_sightings(
    registry: &mut Registry,
    predators: &[PredatorView],
    sighted: &HashSet<Uuid>,
    config: &SimConfig,
    tick: u64,
) {
    let timeout = config.behavior.migration_timeout_ticks as u64;
    for p in predators {
        if p.hooked {
            continue;
        }
        let Ok(behavior) = registry.ecs.query_one_mut::<&mut Behavior>(p.entity) else {
            continue;
        };
        if sighted.contains(&p.id) {
            behavior.last_prey_sighting = tick;
        } else if tick.saturating_sub(behavior.last_prey_sighting) >= timeout
            && !matches!(behavior.state, BehaviorState::Migrating | BehaviorState::Hooked)
        {
            tracing::debug!(predator = %p.id, "no prey sighted for timeout, migrating");
            behavior.state = BehaviorState::Migrating;
            behavior.target = tightline_data::Target::None;
        }
    }
}

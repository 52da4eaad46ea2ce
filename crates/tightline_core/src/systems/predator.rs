//! Per-predator decision state machine.
//!
//! Converts world state (lure position and speed, nearby prey, depth,
//! elapsed time) into a behavioral state and movement each tick:
//!
//! `Idle → Investigating → Chasing → Striking → Hooked` (fight handoff),
//! `Idle → HuntingPrey → Feeding → Idle`, `any → Migrating → removed`.
//!
//! A hooked predator is excluded from this pass entirely; fight physics own
//! it. When both the lure and a prey school are in range, prey-hunting wins
//! only while hunger strictly exceeds the species' feeding threshold;
//! otherwise lure aggression wins.

use crate::catalog::SpeciesCatalog;
use crate::config::{BehaviorConfig, SimConfig};
use crate::spatial::SpatialGrid;
use crate::systems::{dist3, LureView, MemberView, PredatorView, SchoolSummary};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tightline_data::{
    Behavior, BehaviorState, BehaviorStyle, Body, Identity, SchoolId, SpeciesTraits, Target, Vitals,
};
use uuid::Uuid;

pub struct DecisionContext<'a> {
    pub config: &'a SimConfig,
    pub catalog: &'a SpeciesCatalog,
    pub tick: u64,
    pub lure: LureView,
    /// While a fight session holds the line, no other predator may hook.
    pub fight_active: bool,
    pub members: &'a [MemberView],
    pub member_grid: &'a SpatialGrid,
    pub predators: &'a [PredatorView],
    /// Sorted by school id for deterministic target selection.
    pub schools: &'a [(SchoolId, SchoolSummary)],
}

/// Runs the decision pass over `order` (predator entities in registry
/// order). Returns the ids of predators that migrated off the playable
/// area and must be removed.
pub fn run(
    ecs: &mut hecs::World,
    ctx: &DecisionContext,
    rng: &mut ChaCha8Rng,
    order: &[hecs::Entity],
) -> Vec<Uuid> {
    let mut migrated = Vec::new();
    let mut scratch = Vec::new();

    for &entity in order {
        let Ok((identity, body, vitals, behavior)) = ecs
            .query_one_mut::<(&Identity, &mut Body, &mut Vitals, &mut Behavior)>(entity)
        else {
            continue;
        };
        if matches!(behavior.state, BehaviorState::Hooked) {
            continue;
        }

        let traits = ctx.catalog.get(identity.species);
        vitals.starve(ctx.config.behavior.hunger_rate);
        vitals.clamp();
        behavior.tick_timers();
        validate_target(behavior, ctx);

        match behavior.state {
            BehaviorState::Idle => {
                wander(body, traits, rng);
                let hungry = vitals.hunger > traits.feeding_threshold;
                let prey_target = if hungry {
                    select_prey_target(identity, body, traits, behavior, ctx)
                } else {
                    None
                };
                if let Some(target) = prey_target {
                    behavior.target = target;
                    behavior.commit_ticks = ctx.config.behavior.commit_ticks;
                    behavior.state = BehaviorState::HuntingPrey;
                } else if lure_in_envelope(traits, body, &ctx.lure, &ctx.config.behavior) {
                    behavior.target = Target::Lure;
                    behavior.state = BehaviorState::Investigating { interest: 0.0 };
                }
            }
            BehaviorState::Investigating { interest } => {
                let cfg = &ctx.config.behavior;
                let mut interest = interest;
                if lure_in_envelope(traits, body, &ctx.lure, cfg) {
                    interest += interest_gain(traits, &ctx.lure, cfg, rng);
                    interest -= cfg.interest_decay;
                } else {
                    interest -= cfg.interest_decay * 2.0;
                }

                let threshold = traits.interest_threshold * wary_mult(behavior, cfg);
                if interest > threshold {
                    behavior.state = BehaviorState::Chasing;
                } else if interest <= 0.0 {
                    reset_to_idle(behavior);
                } else {
                    behavior.state = BehaviorState::Investigating { interest };
                    match traits.style {
                        // Ambush hunters hold and wait for the lure to come
                        // to them; pursuers close immediately.
                        BehaviorStyle::Ambush => hold_position(body),
                        BehaviorStyle::Pursuit | BehaviorStyle::Schooling => {
                            move_towards(body, lure_pos(&ctx.lure), traits.cruise_speed)
                        }
                        BehaviorStyle::Opportunistic => {
                            move_towards(body, lure_pos(&ctx.lure), traits.cruise_speed * 0.6)
                        }
                    }
                }
            }
            BehaviorState::Chasing => {
                let cfg = &ctx.config.behavior;
                if !lure_in_envelope(traits, body, &ctx.lure, cfg) {
                    reset_to_idle(behavior);
                } else {
                    move_towards(body, lure_pos(&ctx.lure), traits.burst_speed);
                    if lure_distance(body, &ctx.lure) <= strike_distance(traits, cfg) {
                        behavior.state = BehaviorState::Striking {
                            window: strike_window(behavior, cfg),
                        };
                    }
                }
            }
            BehaviorState::Striking { window } => {
                let cfg = &ctx.config.behavior;
                if ctx.fight_active {
                    // Line is occupied; back off rather than queue.
                    reset_to_idle(behavior);
                } else if window == 0
                    || lure_distance(body, &ctx.lure) > strike_distance(traits, cfg) * 2.0
                {
                    reset_to_idle(behavior);
                } else {
                    behavior.state = BehaviorState::Striking { window: window - 1 };
                    move_towards(body, lure_pos(&ctx.lure), traits.cruise_speed * 0.3);
                }
            }
            BehaviorState::HuntingPrey => {
                hunt(body, traits, behavior, ctx, &mut scratch);
            }
            BehaviorState::Feeding { ticks } => {
                if ticks == 0 {
                    reset_to_idle(behavior);
                } else {
                    behavior.state = BehaviorState::Feeding { ticks: ticks - 1 };
                    hold_position(body);
                }
            }
            BehaviorState::Migrating => {
                migrate_move(body, traits, ctx.config);
                let world = &ctx.config.world;
                let m = world.despawn_margin;
                if body.x < -m || body.x > world.width + m || body.y < -m || body.y > world.height + m
                {
                    migrated.push(identity.id);
                }
            }
            BehaviorState::Hooked => unreachable!("hooked predators are filtered above"),
        }

        // One integration step for whatever the handler decided.
        body.x += body.vx;
        body.y += body.vy;
        body.depth = (body.depth + body.vd).clamp(0.0, ctx.config.world.max_depth);
        if !matches!(behavior.state, BehaviorState::Migrating) {
            body.x = body.x.clamp(0.0, ctx.config.world.width);
            body.y = body.y.clamp(0.0, ctx.config.world.height);
        }
    }

    migrated
}

/// A target whose referent vanished resets the machine instead of crashing.
fn validate_target(behavior: &mut Behavior, ctx: &DecisionContext) {
    let dangling = match behavior.target {
        Target::School(id) => ctx.schools.binary_search_by_key(&id.0, |(s, _)| s.0).is_err(),
        Target::Prey(id) => !ctx
            .predators
            .iter()
            .any(|p| p.id == id && !p.hooked),
        Target::Lure | Target::None => false,
    };
    if dangling {
        if let Target::School(id) = behavior.target {
            behavior.abandon_school(id, ctx.config.behavior.abandon_cooldown_ticks);
        }
        behavior.target = Target::None;
        behavior.commit_ticks = 0;
        if matches!(behavior.state, BehaviorState::HuntingPrey) {
            behavior.state = BehaviorState::Idle;
        }
    }
}

fn reset_to_idle(behavior: &mut Behavior) {
    behavior.state = BehaviorState::Idle;
    behavior.target = Target::None;
}

fn lure_pos(lure: &LureView) -> (f64, f64, f64) {
    (lure.x, lure.y, lure.depth)
}

fn lure_distance(body: &Body, lure: &LureView) -> f64 {
    dist3(body.x, body.y, body.depth, lure.x, lure.y, lure.depth)
}

/// Detection envelope check: horizontal range by vertical range, both
/// scaled up inside the species' preferred depth band and down outside it.
fn lure_in_envelope(traits: &SpeciesTraits, body: &Body, lure: &LureView, cfg: &BehaviorConfig) -> bool {
    let zone = depth_zone_mult(traits, lure.depth, cfg);
    let horizontal = body.horizontal_distance_to(lure.x, lure.y);
    horizontal <= traits.detection.horizontal * zone
        && (body.depth - lure.depth).abs() <= traits.detection.vertical * zone
}

fn depth_zone_mult(traits: &SpeciesTraits, depth: f64, cfg: &BehaviorConfig) -> f64 {
    if depth >= traits.depth_band.0 && depth <= traits.depth_band.1 {
        cfg.depth_zone_bonus
    } else {
        cfg.depth_zone_penalty
    }
}

/// Weighted interest gain: lure-speed closeness to the species optimum,
/// depth-zone bonus, and a random draw, all scaled by aggressiveness.
fn interest_gain(
    traits: &SpeciesTraits,
    lure: &LureView,
    cfg: &BehaviorConfig,
    rng: &mut ChaCha8Rng,
) -> f64 {
    let speed_closeness = if traits.optimal_lure_speed > f64::EPSILON {
        (1.0 - (lure.speed - traits.optimal_lure_speed).abs() / traits.optimal_lure_speed)
            .clamp(0.0, 1.0)
    } else {
        0.0
    };
    let depth_bonus = if lure.depth >= traits.depth_band.0 && lure.depth <= traits.depth_band.1 {
        1.0
    } else {
        let outside = (lure.depth - traits.depth_band.1)
            .max(traits.depth_band.0 - lure.depth)
            .max(0.0);
        let vertical = traits.detection.vertical.max(f64::EPSILON);
        (1.0 - outside / vertical).clamp(0.0, 1.0)
    };
    let noise = rng.gen::<f64>();
    traits.aggressiveness
        * (cfg.interest_speed_weight * speed_closeness
            + cfg.interest_depth_weight * depth_bonus
            + cfg.interest_noise_weight * noise)
}

fn wary_mult(behavior: &Behavior, cfg: &BehaviorConfig) -> f64 {
    if behavior.wary_ticks > 0 {
        cfg.wary_threshold_mult
    } else {
        1.0
    }
}

fn strike_distance(traits: &SpeciesTraits, cfg: &BehaviorConfig) -> f64 {
    // Ambush species strike from further out to model the explosive burst.
    match traits.style {
        BehaviorStyle::Ambush => traits.strike_distance * cfg.ambush_strike_mult,
        _ => traits.strike_distance,
    }
}

fn strike_window(behavior: &Behavior, cfg: &BehaviorConfig) -> u32 {
    if behavior.wary_ticks > 0 {
        (cfg.strike_window_ticks / 2).max(1)
    } else {
        cfg.strike_window_ticks
    }
}

/// Picks a hunting target: the nearest eligible school first, then the
/// nearest eligible lone organism. Schools on this predator's abandon
/// cooldown are skipped.
fn select_prey_target(
    identity: &Identity,
    body: &Body,
    traits: &SpeciesTraits,
    behavior: &Behavior,
    ctx: &DecisionContext,
) -> Option<Target> {
    let cfg = &ctx.config.behavior;
    let mut best_school: Option<(SchoolId, f64)> = None;
    for &(school_id, summary) in ctx.schools {
        if summary.members == 0
            || !ctx.catalog.can_eat(identity.species, summary.species)
            || behavior.is_on_cooldown(school_id)
        {
            continue;
        }
        let (cx, cy, cd) = summary.centroid;
        let zone = depth_zone_mult(traits, cd, cfg);
        let horizontal = body.horizontal_distance_to(cx, cy);
        if horizontal > traits.detection.horizontal * zone
            || (body.depth - cd).abs() > traits.detection.vertical * zone
        {
            continue;
        }
        let d = dist3(body.x, body.y, body.depth, cx, cy, cd);
        if best_school.map_or(true, |(_, bd)| d < bd) {
            best_school = Some((school_id, d));
        }
    }
    if let Some((school_id, _)) = best_school {
        return Some(Target::School(school_id));
    }

    let mut best_lone: Option<(Uuid, f64)> = None;
    for q in ctx.predators {
        if q.id == identity.id || q.hooked || !ctx.catalog.can_eat(identity.species, q.species) {
            continue;
        }
        let zone = depth_zone_mult(traits, q.depth, cfg);
        let horizontal = body.horizontal_distance_to(q.x, q.y);
        if horizontal > traits.detection.horizontal * zone
            || (body.depth - q.depth).abs() > traits.detection.vertical * zone
        {
            continue;
        }
        let d = dist3(body.x, body.y, body.depth, q.x, q.y, q.depth);
        if best_lone.map_or(true, |(_, bd)| d < bd) {
            best_lone = Some((q.id, d));
        }
    }
    best_lone.map(|(id, _)| Target::Prey(id))
}

fn hunt(
    body: &mut Body,
    traits: &SpeciesTraits,
    behavior: &mut Behavior,
    ctx: &DecisionContext,
    scratch: &mut Vec<usize>,
) {
    let cooldown = ctx.config.behavior.abandon_cooldown_ticks;
    match behavior.target {
        Target::School(school_id) => {
            let Ok(pos) = ctx.schools.binary_search_by_key(&school_id.0, |(s, _)| s.0) else {
                behavior.abandon_school(school_id, cooldown);
                behavior.state = BehaviorState::Idle;
                return;
            };
            let summary = ctx.schools[pos].1;
            let goal = nearest_member_of_school(body, school_id, ctx, scratch)
                .unwrap_or(summary.centroid);
            move_towards(body, goal, traits.burst_speed);

            // Commitment pins the target; once it lapses, a school that
            // drifted well out of sensing range is abandoned and put on
            // cooldown so the predator does not thrash between schools.
            if behavior.commit_ticks == 0 {
                let (cx, cy, _) = summary.centroid;
                if body.horizontal_distance_to(cx, cy) > traits.detection.horizontal * 1.5 {
                    behavior.abandon_school(school_id, cooldown);
                    behavior.state = BehaviorState::Idle;
                }
            }
        }
        Target::Prey(prey_id) => {
            match ctx.predators.iter().find(|p| p.id == prey_id && !p.hooked) {
                Some(q) => move_towards(body, (q.x, q.y, q.depth), traits.burst_speed),
                None => {
                    behavior.target = Target::None;
                    behavior.state = BehaviorState::Idle;
                }
            }
        }
        Target::Lure | Target::None => {
            // Hunting with no prey target is inconsistent; reset.
            behavior.target = Target::None;
            behavior.state = BehaviorState::Idle;
        }
    }
}

fn nearest_member_of_school(
    body: &Body,
    school: SchoolId,
    ctx: &DecisionContext,
    scratch: &mut Vec<usize>,
) -> Option<(f64, f64, f64)> {
    let traits_reach = ctx
        .catalog
        .get(ctx.schools.iter().find(|(s, _)| *s == school)?.1.species)
        .schooling
        .cohesion_radius;
    let reach = traits_reach.max(8.0) * 2.0;
    ctx.member_grid.query_into(body.x, body.y, reach, scratch);
    let mut best: Option<((f64, f64, f64), f64)> = None;
    for &j in scratch.iter() {
        let m = &ctx.members[j];
        if m.school != school {
            continue;
        }
        let d = dist3(body.x, body.y, body.depth, m.x, m.y, m.depth);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some(((m.x, m.y, m.depth), d));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Aimless cruising inside the preferred depth band.
fn wander(body: &mut Body, traits: &SpeciesTraits, rng: &mut ChaCha8Rng) {
    let heading = if body.speed() > 1e-9 {
        body.heading()
    } else {
        0.0
    };
    let turn: f64 = rng.gen_range(-0.3..=0.3);
    let speed = traits.cruise_speed * 0.4;
    body.vx = (heading + turn).cos() * speed;
    body.vy = (heading + turn).sin() * speed;
    let mid_band = (traits.depth_band.0 + traits.depth_band.1) * 0.5;
    body.vd = (mid_band - body.depth).clamp(-0.05, 0.05);
}

fn hold_position(body: &mut Body) {
    body.vx *= 0.2;
    body.vy *= 0.2;
    body.vd *= 0.2;
}

fn move_towards(body: &mut Body, goal: (f64, f64, f64), speed: f64) {
    let dx = goal.0 - body.x;
    let dy = goal.1 - body.y;
    let dd = goal.2 - body.depth;
    let d = (dx * dx + dy * dy + dd * dd).sqrt();
    if d <= f64::EPSILON {
        body.vx = 0.0;
        body.vy = 0.0;
        body.vd = 0.0;
        return;
    }
    let step = speed.min(d);
    body.vx = dx / d * step;
    body.vy = dy / d * step;
    body.vd = dd / d * step;
}

/// Heads for the nearest map edge at elevated speed until off-area.
fn migrate_move(body: &mut Body, traits: &SpeciesTraits, config: &SimConfig) {
    let world = &config.world;
    let to_left = body.x;
    let to_right = world.width - body.x;
    let to_near = body.y;
    let to_far = world.height - body.y;
    let min = to_left.min(to_right).min(to_near).min(to_far);
    let dir = if min == to_left {
        (-1.0, 0.0)
    } else if min == to_right {
        (1.0, 0.0)
    } else if min == to_near {
        (0.0, -1.0)
    } else {
        (0.0, 1.0)
    };
    let speed = traits.cruise_speed * config.behavior.migration_speed_mult;
    body.vx = dir.0 * speed;
    body.vy = dir.1 * speed;
    body.vd = 0.0;
}

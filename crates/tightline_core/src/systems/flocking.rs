//! Emergent flocking for schooling prey.
//!
//! Each member combines four weighted steering contributions computed over
//! neighbors of the same school: separation, alignment, cohesion, and a
//! panic override that loosens the school into a faster, scattering
//! formation whenever a predator is inside the threat radius. A mild
//! attraction toward sighted food sits below panic and above alignment.
//!
//! Steering is recomputed every `steering_stride` ticks per member; panic
//! recomputes immediately so a threatened member reacts the same tick.
//! Velocity integrates every tick regardless.

use crate::catalog::SpeciesCatalog;
use crate::config::SimConfig;
use crate::spatial::SpatialGrid;
use crate::systems::{dist3, FoodView, MemberView, PredatorView};
use tightline_data::{Body, SchoolMember};

pub struct FlockContext<'a> {
    pub config: &'a SimConfig,
    pub catalog: &'a SpeciesCatalog,
    pub tick: u64,
    pub members: &'a [MemberView],
    pub member_grid: &'a SpatialGrid,
    pub predators: &'a [PredatorView],
    pub food: &'a [FoodView],
}

struct Steering {
    vx: f64,
    vy: f64,
    vd: f64,
    panic: bool,
}

/// Runs the flock pass: computes new velocities, then applies them and
/// integrates positions clamped to the water column.
pub fn run(ecs: &mut hecs::World, ctx: &FlockContext) {
    let mut updates: Vec<(hecs::Entity, Steering)> = Vec::with_capacity(ctx.members.len());
    let mut neighbors = Vec::new();

    for (idx, member) in ctx.members.iter().enumerate() {
        let traits = ctx.catalog.get(member.species);
        if !traits.schooling.enabled {
            continue;
        }

        let panic = nearest_threat(member, ctx.predators, traits.schooling.panic_radius).is_some();
        let stride = ctx.config.flocking.steering_stride.max(1) as u64;
        let due = panic || (ctx.tick + member.seq) % stride == 0;

        let steering = if due {
            steer(idx, member, panic, ctx, &mut neighbors)
        } else {
            Steering {
                vx: member.vx,
                vy: member.vy,
                vd: member.vd,
                panic,
            }
        };
        updates.push((member.entity, steering));
    }

    let world = &ctx.config.world;
    for (entity, steering) in updates {
        if let Ok((body, member)) = ecs.query_one_mut::<(&mut Body, &mut SchoolMember)>(entity) {
            body.vx = steering.vx;
            body.vy = steering.vy;
            body.vd = steering.vd;
            member.panic = steering.panic;

            body.x = (body.x + body.vx).clamp(0.0, world.width);
            body.y = (body.y + body.vy).clamp(0.0, world.height);
            body.depth = (body.depth + body.vd).clamp(0.0, world.max_depth);
        }
    }
}

/// Position of the nearest predator inside the threat radius, if any.
fn nearest_threat(
    member: &MemberView,
    predators: &[PredatorView],
    radius: f64,
) -> Option<(f64, f64, f64)> {
    let mut best: Option<((f64, f64, f64), f64)> = None;
    for p in predators {
        let d = dist3(member.x, member.y, member.depth, p.x, p.y, p.depth);
        if d <= radius && best.map_or(true, |(_, bd)| d < bd) {
            best = Some(((p.x, p.y, p.depth), d));
        }
    }
    best.map(|(pos, _)| pos)
}

fn steer(
    idx: usize,
    member: &MemberView,
    panic: bool,
    ctx: &FlockContext,
    neighbors: &mut Vec<usize>,
) -> Steering {
    let traits = ctx.catalog.get(member.species);
    let school = &traits.schooling;
    let flock = &ctx.config.flocking;

    // Same-school neighbors within the widest radius. The grid was built
    // before this pass moved anyone, so inflate by one tick of travel and
    // re-check exact distances.
    let reach = school.cohesion_radius + traits.burst_speed;
    ctx.member_grid
        .query_into(member.x, member.y, reach, neighbors);

    let mut sep = (0.0f64, 0.0f64, 0.0f64);
    let mut vel_sum = (0.0f64, 0.0f64, 0.0f64);
    let mut align_count = 0usize;
    let mut pos_sum = (0.0f64, 0.0f64, 0.0f64);
    let mut cohesion_count = 0usize;

    for &j in neighbors.iter() {
        if j == idx {
            continue;
        }
        let n = &ctx.members[j];
        if n.school != member.school {
            continue;
        }
        let d = dist3(member.x, member.y, member.depth, n.x, n.y, n.depth);
        if d > school.cohesion_radius {
            continue;
        }
        if d < school.separation_radius && d > 1e-9 {
            let push = (school.separation_radius - d) / school.separation_radius / d;
            sep.0 += (member.x - n.x) * push;
            sep.1 += (member.y - n.y) * push;
            sep.2 += (member.depth - n.depth) * push;
        }
        if d < school.alignment_radius {
            vel_sum.0 += n.vx;
            vel_sum.1 += n.vy;
            vel_sum.2 += n.vd;
            align_count += 1;
        }
        pos_sum.0 += n.x;
        pos_sum.1 += n.y;
        pos_sum.2 += n.depth;
        cohesion_count += 1;
    }

    // Panic reshapes the blend: scatter hard, stop clumping.
    let sep_weight = school.separation_weight * if panic { flock.panic_separation_mult } else { 1.0 };
    let coh_weight = school.cohesion_weight * if panic { flock.panic_cohesion_mult } else { 1.0 };

    let mut ax = sep.0 * sep_weight;
    let mut ay = sep.1 * sep_weight;
    let mut ad = sep.2 * sep_weight;

    if align_count > 0 {
        let inv = 1.0 / align_count as f64;
        ax += (vel_sum.0 * inv - member.vx) * school.alignment_weight;
        ay += (vel_sum.1 * inv - member.vy) * school.alignment_weight;
        ad += (vel_sum.2 * inv - member.vd) * school.alignment_weight;
    }
    if cohesion_count > 0 {
        let inv = 1.0 / cohesion_count as f64;
        let (cx, cy, cd) = (pos_sum.0 * inv, pos_sum.1 * inv, pos_sum.2 * inv);
        let d = dist3(member.x, member.y, member.depth, cx, cy, cd).max(1e-9);
        ax += (cx - member.x) / d * coh_weight;
        ay += (cy - member.y) / d * coh_weight;
        ad += (cd - member.depth) / d * coh_weight;
    }

    if let Some(food) = nearest_food(member, ctx.food, ctx.config.foodweb.food_sight_range) {
        let d = dist3(member.x, member.y, member.depth, food.0, food.1, food.2).max(1e-9);
        ax += (food.0 - member.x) / d * flock.food_attraction_weight;
        ay += (food.1 - member.y) / d * flock.food_attraction_weight;
        ad += (food.2 - member.depth) / d * flock.food_attraction_weight;
    }

    if panic {
        if let Some(threat) = nearest_threat(member, ctx.predators, school.panic_radius) {
            let d = dist3(member.x, member.y, member.depth, threat.0, threat.1, threat.2).max(1e-9);
            ax += (member.x - threat.0) / d * flock.flee_weight;
            ay += (member.y - threat.1) / d * flock.flee_weight;
            ad += (member.depth - threat.2) / d * flock.flee_weight;
        }
    }

    // Soft walls: turn back inside the playable volume.
    let world = &ctx.config.world;
    let margin = flock.edge_margin;
    if member.x < margin {
        ax += flock.edge_turn_weight;
    } else if member.x > world.width - margin {
        ax -= flock.edge_turn_weight;
    }
    if member.y < margin {
        ay += flock.edge_turn_weight;
    } else if member.y > world.height - margin {
        ay -= flock.edge_turn_weight;
    }
    if member.depth < 1.0 {
        ad += flock.edge_turn_weight;
    } else if member.depth > world.max_depth - 1.0 {
        ad -= flock.edge_turn_weight;
    }

    let mut vx = member.vx + ax;
    let mut vy = member.vy + ay;
    let mut vd = member.vd + ad;

    let max_speed = if panic {
        traits.cruise_speed * school.panic_speed_mult
    } else {
        traits.cruise_speed
    };
    let min_speed = traits.cruise_speed * flock.min_speed_fraction;
    let mag = (vx * vx + vy * vy + vd * vd).sqrt();
    if mag > 1e-9 {
        let clamped = mag.clamp(min_speed, max_speed);
        let scale = clamped / mag;
        vx *= scale;
        vy *= scale;
        vd *= scale;
    } else {
        // Stationary member with no neighbors: drift at minimum speed.
        vx = min_speed;
    }

    Steering {
        vx,
        vy,
        vd,
        panic,
    }
}

fn nearest_food(member: &MemberView, food: &[FoodView], range: f64) -> Option<(f64, f64, f64)> {
    let mut best: Option<((f64, f64, f64), f64)> = None;
    for f in food {
        if f.consumed {
            continue;
        }
        let d = dist3(member.x, member.y, member.depth, f.x, f.y, f.depth);
        if d <= range && best.map_or(true, |(_, bd)| d < bd) {
            best = Some(((f.x, f.y, f.depth), d));
        }
    }
    best.map(|(pos, _)| pos)
}

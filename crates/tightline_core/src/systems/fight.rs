//! Hook-fight resolution: the tension/stamina contest between one hooked
//! predator and the player's line.
//!
//! `Hooked → Fighting → {Caught | Escaped | LineBroken}`, all terminal. At
//! most one session exists at a time; it owns the line and the predator's
//! position while it lasts. Reel actions are rate-limited at intake, so
//! tension accrual has a hard ceiling per unit time and every session has
//! an implicit minimum duration.

use crate::config::SimConfig;
use crate::events::{timestamp, EventQueue};
use crate::registry::{DespawnReason, Registry};
use crate::systems::LureView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tightline_data::{Behavior, BehaviorState, Body, EscapeReason, SimEvent, StaminaClass, Target};
use uuid::Uuid;

/// Terminal disposition of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightOutcome {
    Pending,
    Caught,
    Escaped,
    LineBroken,
}

/// Transient binding of one hooked predator to the line/reel resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightSession {
    pub predator: Uuid,
    pub species_name: String,
    pub weight_kg: f64,
    /// Line stress in [0, 100]; the break threshold sits below 100.
    pub tension: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub elapsed: u32,
    pub outcome: FightOutcome,
    last_reel_tick: Option<u64>,
    pending_reel: f64,
}

impl FightSession {
    pub fn new(
        predator: Uuid,
        species_name: String,
        weight_kg: f64,
        health: f64,
        stamina_class: StaminaClass,
    ) -> Self {
        let max_stamina = (health * stamina_class.multiplier()).max(1.0);
        Self {
            predator,
            species_name,
            weight_kg,
            tension: 0.0,
            stamina: max_stamina,
            max_stamina,
            elapsed: 0,
            outcome: FightOutcome::Pending,
            last_reel_tick: None,
            pending_reel: 0.0,
        }
    }

    /// Accepts a reel action unless it arrives faster than the minimum
    /// interval, in which case it is ignored outright (rate limit on the
    /// input, not a tension effect). Returns whether it was accepted.
    pub fn queue_reel(&mut self, intensity: f64, tick: u64, min_interval_ticks: u32) -> bool {
        if self.outcome != FightOutcome::Pending {
            return false;
        }
        if let Some(last) = self.last_reel_tick {
            if tick.saturating_sub(last) < u64::from(min_interval_ticks) {
                return false;
            }
        }
        self.last_reel_tick = Some(tick);
        self.pending_reel += intensity.clamp(0.0, 1.0);
        true
    }
}

/// Steps the active fight by one tick. Returns true when the session
/// reached a terminal outcome and must be dropped.
pub fn step(
    registry: &mut Registry,
    id_index: &HashMap<Uuid, hecs::Entity>,
    session: &mut FightSession,
    config: &SimConfig,
    lure: &LureView,
    tick: u64,
    events: &mut EventQueue,
) -> bool {
    let cfg = &config.angling;
    session.elapsed += 1;
    let reel = std::mem::take(&mut session.pending_reel);
    let reeled = reel > 0.0;

    let entity = id_index
        .get(&session.predator)
        .copied()
        .filter(|e| registry.ecs.contains(*e));
    let Some(entity) = entity else {
        // Defensive: the bound predator no longer exists. Resolve quietly.
        session.outcome = FightOutcome::Escaped;
        events.push(SimEvent::Escape {
            id: session.predator,
            species: session.species_name.clone(),
            reason: EscapeReason::PredatorLost,
            tick,
            timestamp: timestamp(),
        });
        return true;
    };

    if reeled {
        session.tension += cfg.reel_increment * reel;
    } else {
        session.tension -= cfg.slack_decay;
    }
    session.tension += cfg.resistance_gain * (session.stamina / session.max_stamina);
    session.tension = session.tension.clamp(0.0, 100.0);

    // Inclusive break boundary, checked the same tick tension reaches it.
    if session.tension >= cfg.break_threshold {
        session.outcome = FightOutcome::LineBroken;
        if let Ok(behavior) = registry.ecs.query_one_mut::<&mut Behavior>(entity) {
            behavior.state = BehaviorState::Idle;
            behavior.target = Target::None;
            behavior.wary_ticks = config.behavior.wary_ticks;
        }
        events.push(SimEvent::Escape {
            id: session.predator,
            species: session.species_name.clone(),
            reason: EscapeReason::LineBroken,
            tick,
            timestamp: timestamp(),
        });
        return true;
    }

    session.stamina =
        (session.stamina - cfg.stamina_drain_rate * (session.tension / 100.0)).max(0.0);
    if session.stamina <= 0.0 {
        session.outcome = FightOutcome::Caught;
        registry.queue_despawn(session.predator, DespawnReason::Caught);
        events.push(SimEvent::Catch {
            id: session.predator,
            species: session.species_name.clone(),
            weight_kg: session.weight_kg,
            fight_ticks: session.elapsed,
            tick,
            timestamp: timestamp(),
        });
        return true;
    }

    // Fight physics own the position: reeling drags the fish toward the
    // lure, a fresh fish runs against the drag.
    if let Ok(body) = registry.ecs.query_one_mut::<&mut Body>(entity) {
        let dx = lure.x - body.x;
        let dy = lure.y - body.y;
        let dd = lure.depth - body.depth;
        let d = (dx * dx + dy * dy + dd * dd).sqrt();
        if d > 1e-9 {
            let step = if reeled {
                (cfg.reel_pull * reel).min(d)
            } else {
                -cfg.run_speed * (session.stamina / session.max_stamina)
            };
            let world = &config.world;
            body.x = (body.x + dx / d * step).clamp(0.0, world.width);
            body.y = (body.y + dy / d * step).clamp(0.0, world.height);
            body.depth = (body.depth + dd / d * step).clamp(0.0, world.max_depth);
            body.vx = 0.0;
            body.vy = 0.0;
            body.vd = 0.0;
        }
    }

    false
}

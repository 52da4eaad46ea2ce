use super::species::SpeciesId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a prey school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchoolId(pub u32);

/// Unique identification of an organism.
///
/// `seq` is the monotonic spawn sequence number; every pass that must be
/// deterministic iterates organisms in `seq` order ("registry order").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub seq: u64,
    pub species: SpeciesId,
}

/// Physical state of an organism: 3-D position (x, y, depth), velocity,
/// size, and visibility. Heading and current speed derive from velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub vx: f64,
    pub vy: f64,
    pub vd: f64,
    pub weight_kg: f64,
    pub visible: bool,
    pub birth_tick: u64,
}

impl Body {
    pub fn at(x: f64, y: f64, depth: f64, weight_kg: f64, birth_tick: u64) -> Self {
        Self {
            x,
            y,
            depth,
            vx: 0.0,
            vy: 0.0,
            vd: 0.0,
            weight_kg,
            visible: true,
            birth_tick,
        }
    }

    /// Current speed in world units per tick.
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy + self.vd * self.vd).sqrt()
    }

    /// Horizontal heading in radians.
    pub fn heading(&self) -> f64 {
        self.vy.atan2(self.vx)
    }

    pub fn age(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.birth_tick)
    }

    /// Straight-line distance to a point, depth included.
    pub fn distance_to(&self, x: f64, y: f64, depth: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        let dd = self.depth - depth;
        (dx * dx + dy * dy + dd * dd).sqrt()
    }

    /// Horizontal-plane distance to a point.
    pub fn horizontal_distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Hunger and health of a predator, both held in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: f64,
    pub health: f64,
}

impl Vitals {
    pub fn new(hunger: f64, health: f64) -> Self {
        let mut v = Self { hunger, health };
        v.clamp();
        v
    }

    pub fn clamp(&mut self) {
        self.hunger = self.hunger.clamp(0.0, 100.0);
        self.health = self.health.clamp(0.0, 100.0);
    }

    /// Reduces hunger by a meal's nutrition value, floored at zero.
    pub fn feed(&mut self, nutrition: f64) {
        self.hunger = (self.hunger - nutrition).max(0.0);
    }

    /// Raises hunger by the per-tick metabolic cost, capped at 100.
    pub fn starve(&mut self, amount: f64) {
        self.hunger = (self.hunger + amount).min(100.0);
    }
}

/// What a predator is currently pursuing. Exactly one variant holds at a
/// time; "no target" is its own variant rather than a nullable field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Target {
    #[default]
    None,
    Lure,
    Prey(Uuid),
    School(SchoolId),
}

/// Behavioral state of a predator's decision machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BehaviorState {
    Idle,
    Investigating {
        interest: f64,
    },
    Chasing,
    Striking {
        window: u32,
    },
    /// Suspended: position is driven by fight physics, not the machine.
    Hooked,
    HuntingPrey,
    Feeding {
        ticks: u32,
    },
    Migrating,
}

impl BehaviorState {
    pub fn label(&self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Investigating { .. } => "investigating",
            BehaviorState::Chasing => "chasing",
            BehaviorState::Striking { .. } => "striking",
            BehaviorState::Hooked => "hooked",
            BehaviorState::HuntingPrey => "hunting",
            BehaviorState::Feeding { .. } => "feeding",
            BehaviorState::Migrating => "migrating",
        }
    }

    /// Attention intensity for the sonar display.
    pub fn visual_interest(&self) -> f32 {
        match self {
            BehaviorState::Idle => 0.1,
            BehaviorState::Investigating { .. } => 0.5,
            BehaviorState::Chasing => 0.8,
            BehaviorState::Striking { .. } => 1.0,
            BehaviorState::Hooked => 1.0,
            BehaviorState::HuntingPrey => 0.6,
            BehaviorState::Feeding { .. } => 0.4,
            BehaviorState::Migrating => 0.2,
        }
    }
}

/// Full decision-machine state of one predator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub state: BehaviorState,
    pub target: Target,
    /// Ticks remaining before the current hunting target may be switched.
    pub commit_ticks: u32,
    /// Abandoned schools and the ticks left before re-targeting is allowed.
    pub school_cooldowns: Vec<(SchoolId, u32)>,
    /// Tick at which eligible prey was last visible.
    pub last_prey_sighting: u64,
    /// While positive, the fish is wary: interest threshold is raised and
    /// the strike window shortened.
    pub wary_ticks: u32,
}

impl Behavior {
    pub fn new(birth_tick: u64) -> Self {
        Self {
            state: BehaviorState::Idle,
            target: Target::None,
            commit_ticks: 0,
            school_cooldowns: Vec::new(),
            last_prey_sighting: birth_tick,
            wary_ticks: 0,
        }
    }

    pub fn is_on_cooldown(&self, school: SchoolId) -> bool {
        self.school_cooldowns.iter().any(|&(s, t)| s == school && t > 0)
    }

    /// Drops the current target and remembers the school on cooldown.
    pub fn abandon_school(&mut self, school: SchoolId, cooldown: u32) {
        self.school_cooldowns.retain(|&(s, _)| s != school);
        self.school_cooldowns.push((school, cooldown));
        self.target = Target::None;
        self.commit_ticks = 0;
    }

    /// Per-tick timer bookkeeping shared by every state.
    pub fn tick_timers(&mut self) {
        self.commit_ticks = self.commit_ticks.saturating_sub(1);
        self.wary_ticks = self.wary_ticks.saturating_sub(1);
        for entry in &mut self.school_cooldowns {
            entry.1 = entry.1.saturating_sub(1);
        }
        self.school_cooldowns.retain(|&(_, t)| t > 0);
    }
}

/// Membership of one organism in a prey school.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchoolMember {
    pub school: SchoolId,
    pub panic: bool,
}

/// Background plankton-tier food. Never surfaces as a catchable contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodResource {
    pub remaining_life: u32,
    pub consumed: bool,
}

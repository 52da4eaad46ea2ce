//! The player's lure.
//!
//! Input devices are translated to abstract commands before they reach the
//! core; `retrieve` is the only movement command. The lure's line/reel side
//! is owned by the active fight session, if any.

use crate::config::WorldConfig;
use serde::{Deserialize, Serialize};

/// World-space state of the lure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lure {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub vx: f64,
    pub vy: f64,
    pub vd: f64,
}

impl Lure {
    pub fn new(x: f64, y: f64, depth: f64) -> Self {
        Self {
            x,
            y,
            depth,
            vx: 0.0,
            vy: 0.0,
            vd: 0.0,
        }
    }

    /// Sets retrieve velocity from a direction and a speed (units/tick).
    /// A zero direction stops the lure.
    pub fn retrieve(&mut self, direction: (f64, f64, f64), speed: f64) {
        let (dx, dy, dd) = direction;
        let mag = (dx * dx + dy * dy + dd * dd).sqrt();
        if mag <= f64::EPSILON || !mag.is_finite() || !speed.is_finite() {
            self.vx = 0.0;
            self.vy = 0.0;
            self.vd = 0.0;
            return;
        }
        let speed = speed.max(0.0);
        self.vx = dx / mag * speed;
        self.vy = dy / mag * speed;
        self.vd = dd / mag * speed;
    }

    /// Current retrieve speed.
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy + self.vd * self.vd).sqrt()
    }

    /// Advances the lure one tick, clamped to the playable water volume.
    pub(crate) fn integrate(&mut self, world: &WorldConfig) {
        self.x = (self.x + self.vx).clamp(0.0, world.width);
        self.y = (self.y + self.vy).clamp(0.0, world.height);
        self.depth = (self.depth + self.vd).clamp(0.0, world.max_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieve_normalizes_direction() {
        let mut lure = Lure::new(10.0, 10.0, 3.0);
        lure.retrieve((3.0, 4.0, 0.0), 1.0);
        assert!((lure.speed() - 1.0).abs() < 1e-9);
        assert!((lure.vx - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_zero_direction_stops() {
        let mut lure = Lure::new(10.0, 10.0, 3.0);
        lure.retrieve((1.0, 0.0, 0.0), 2.0);
        lure.retrieve((0.0, 0.0, 0.0), 2.0);
        assert_eq!(lure.speed(), 0.0);
    }

    #[test]
    fn test_integrate_clamps_to_water_column() {
        let world = WorldConfig::default();
        let mut lure = Lure::new(1.0, 1.0, 0.5);
        lure.retrieve((-1.0, 0.0, -1.0), 5.0);
        lure.integrate(&world);
        assert!(lure.x >= 0.0);
        assert!(lure.depth >= 0.0);
    }
}

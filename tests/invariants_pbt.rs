//! Property-based invariants: clamped vitals, bounded tension, normalized
//! lure commands, and spatial-grid robustness under arbitrary inputs.

mod common;

use common::{place, predator_ids, set_state, test_species, WorldBuilder};
use proptest::prelude::*;
use tightline_core::lure::Lure;
use tightline_core::spatial::SpatialGrid;
use tightline_data::{BehaviorState, SizeClass, Vitals};

proptest! {
    #[test]
    fn vitals_never_leave_bounds(
        initial in 0.0f64..100.0,
        ops in prop::collection::vec((any::<bool>(), 0.0f64..250.0), 1..60),
    ) {
        let mut vitals = Vitals::new(initial, 100.0);
        for (feed, amount) in ops {
            if feed {
                vitals.feed(amount);
            } else {
                vitals.starve(amount);
            }
            vitals.clamp();
            prop_assert!((0.0..=100.0).contains(&vitals.hunger));
            prop_assert!((0.0..=100.0).contains(&vitals.health));
        }
    }

    #[test]
    fn lure_retrieve_speed_is_bounded(
        dx in -50.0f64..50.0,
        dy in -50.0f64..50.0,
        dd in -50.0f64..50.0,
        speed in 0.0f64..10.0,
    ) {
        let mut lure = Lure::new(10.0, 10.0, 5.0);
        lure.retrieve((dx, dy, dd), speed);
        prop_assert!(lure.speed() <= speed + 1e-9);
    }

    #[test]
    fn spatial_grid_results_are_valid_indices(
        points in prop::collection::vec((-500.0f64..900.0, -500.0f64..900.0), 0..80),
        qx in -200.0f64..600.0,
        qy in -200.0f64..600.0,
        radius in 0.0f64..120.0,
    ) {
        let mut grid = SpatialGrid::new(8.0, 400.0, 300.0);
        grid.rebuild(&points);
        let mut out = Vec::new();
        grid.query_into(qx, qy, radius, &mut out);
        for idx in out {
            prop_assert!(idx < points.len());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Whatever the reel pattern, tension stays in [0, 100] and a pending
    /// session never sits at or beyond the break threshold: reaching it
    /// resolves the fight in the same tick.
    #[test]
    fn fight_tension_stays_bounded(
        pattern in prop::collection::vec(any::<bool>(), 20..100),
        intensity in 0.2f64..1.0,
    ) {
        let mut world = WorldBuilder::new()
            .with_config(|c| {
                c.species = test_species();
            })
            .build();
        world.spawn_predator("test_pike", SizeClass::Large, (200.0, 150.0, 2.0));
        world.update();
        let pike = predator_ids(&world)[0];
        let (lx, ly, ld) = (world.lure.x, world.lure.y, world.lure.depth);
        place(&mut world, pike, lx - 1.0, ly, ld);
        set_state(&mut world, pike, BehaviorState::Striking { window: 5 });
        prop_assert!(world.attempt_hookset());

        for reel in pattern {
            if reel {
                world.reel(intensity);
            }
            world.update();
            match world.fight() {
                Some(session) => {
                    prop_assert!((0.0..=100.0).contains(&session.tension));
                    prop_assert!(session.tension < world.config.angling.break_threshold);
                    prop_assert!(session.stamina >= 0.0);
                }
                None => break,
            }
        }
    }
}

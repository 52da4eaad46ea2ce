//! Decision-machine scenarios: the lure progression to a hookset, the
//! hunger tie-break, wariness, hunting commitment, and defensive resets.

mod common;

use common::{
    behavior_of, member_ids, place, predator_ids, set_commit, set_hunger, set_state, set_wary,
    state_of, test_species, WorldBuilder,
};
use tightline_data::{BehaviorState, SchoolId, SizeClass, Target};

/// Aggressive fish, lure at its optimal speed: expect
/// Idle → Investigating → Chasing → Striking, then a hookset lands.
#[test]
fn test_lure_progression_to_hookset() {
    let mut world = WorldBuilder::new()
        .with_config(|c| {
            c.species = test_species();
            c.behavior.interest_noise_weight = 0.0;
        })
        .build();
    world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
    world.update();

    let pike = predator_ids(&world)[0];
    let (lx, ly, ld) = (world.lure.x, world.lure.y, world.lure.depth);
    place(&mut world, pike, lx - 2.0, ly, ld);
    world.retrieve_lure((1.0, 0.0, 0.0), 1.0);

    let mut seen = vec![state_of(&world, pike).label()];
    for _ in 0..20 {
        world.update();
        let label = state_of(&world, pike).label();
        if seen.last() != Some(&label) {
            seen.push(label);
        }
        if label == "striking" {
            break;
        }
    }
    assert_eq!(seen, vec!["idle", "investigating", "chasing", "striking"]);

    assert!(world.attempt_hookset());
    assert!(matches!(state_of(&world, pike), BehaviorState::Hooked));
    assert!(world.fight().is_some());
}

/// Prey-hunting beats the lure only when hunger strictly exceeds the
/// feeding threshold; at or below it, lure aggression wins.
#[test]
fn test_tie_break_between_lure_and_prey() {
    let run = |hunger: f64| -> BehaviorState {
        let mut world = WorldBuilder::new()
            .with_config(|c| {
                c.species = test_species();
                c.behavior.hunger_rate = 0.0;
            })
            .build();
        world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
        world.spawn_school("test_shiner", 8, (210.0, 150.0, 2.0));
        world.update();

        let pike = predator_ids(&world)[0];
        place(&mut world, pike, 200.0, 150.0, 2.0);
        // The first tick may already have started a hunt (spawn hunger is
        // random); force a clean decision point.
        set_state(&mut world, pike, BehaviorState::Idle);
        set_hunger(&mut world, pike, hunger);
        // Lure sits in range too (world center), moving at optimal speed.
        world.retrieve_lure((0.0, 1.0, 0.0), 1.0);
        world.update();
        state_of(&world, pike)
    };

    // test_pike feeding threshold is 50.0
    assert!(matches!(run(80.0), BehaviorState::HuntingPrey));
    assert!(matches!(run(30.0), BehaviorState::Investigating { .. }));
    // exactly at the threshold: strict inequality, so no hunting
    assert!(matches!(run(50.0), BehaviorState::Investigating { .. }));
}

/// A wary fish (post-escape) needs strictly more ticks of interest to
/// commit to a chase.
#[test]
fn test_wariness_delays_the_chase() {
    let ticks_to_chase = |wary: bool| -> u32 {
        let mut world = WorldBuilder::new()
            .with_config(|c| {
                c.species = {
                    let mut table = test_species();
                    table[0].aggressiveness = 0.5;
                    table[0].interest_threshold = 0.5;
                    table
                };
                c.behavior.interest_noise_weight = 0.0;
                c.behavior.interest_decay = 0.1;
                c.behavior.wary_threshold_mult = 2.0;
            })
            .build();
        world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
        world.update();
        let pike = predator_ids(&world)[0];
        let (lx, ly, ld) = (world.lure.x, world.lure.y, world.lure.depth);
        place(&mut world, pike, lx - 2.0, ly, ld);
        if wary {
            set_wary(&mut world, pike, 10_000);
        }
        world.retrieve_lure((1.0, 0.0, 0.0), 1.0);
        for tick in 1..60 {
            world.update();
            if matches!(
                state_of(&world, pike),
                BehaviorState::Chasing | BehaviorState::Striking { .. }
            ) {
                return tick;
            }
        }
        panic!("never chased");
    };

    let calm = ticks_to_chase(false);
    let wary = ticks_to_chase(true);
    assert!(wary > calm, "wary={wary} should exceed calm={calm}");
}

/// Hunting commitment pins the target school; abandonment puts the school
/// on cooldown before it can be re-targeted.
#[test]
fn test_commitment_and_abandon_cooldown() {
    let mut world = WorldBuilder::new()
        .with_config(|c| {
            c.species = test_species();
            c.behavior.hunger_rate = 0.0;
        })
        .build();
    world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
    world.spawn_school("test_shiner", 6, (215.0, 150.0, 2.0)); // school 0, nearer
    world.spawn_school("test_shiner", 6, (240.0, 150.0, 2.0)); // school 1, farther
    world.update();

    let pike = predator_ids(&world)[0];
    place(&mut world, pike, 200.0, 150.0, 2.0);
    set_hunger(&mut world, pike, 90.0);
    world.update();

    let school_a = SchoolId(0);
    let school_b = SchoolId(1);
    assert!(matches!(state_of(&world, pike), BehaviorState::HuntingPrey));
    assert_eq!(behavior_of(&world, pike).target, Target::School(school_a));

    // Pin both schools: B parks much closer than A (but outside eating
    // range). Committed, the predator must not switch to it.
    let mut k = 0.0;
    for id in member_ids(&world) {
        if common::school_of(&world, id) == school_b {
            place(&mut world, id, 206.0, 148.0 + k, 2.0);
        } else {
            place(&mut world, id, 215.0, 148.0 + k, 2.0);
        }
        k += 1.0;
    }
    for _ in 0..5 {
        world.update();
        assert_eq!(behavior_of(&world, pike).target, Target::School(school_a));
    }

    // Commitment lapses while school A is far out of sensing range: the
    // predator abandons it and the school goes on cooldown.
    for id in member_ids(&world) {
        if common::school_of(&world, id) == school_a {
            place(&mut world, id, 200.0, 280.0, 2.0);
        }
    }
    set_commit(&mut world, pike, 0);
    world.update();
    let behavior = behavior_of(&world, pike);
    assert!(behavior.is_on_cooldown(school_a));
    assert_ne!(behavior.target, Target::School(school_a));

    // Still hungry: the next pick must be school B, never the cooled-down A.
    for _ in 0..3 {
        world.update();
        if behavior_of(&world, pike).target == Target::School(school_b) {
            return;
        }
    }
    panic!("never re-targeted school B");
}

/// A target whose referent despawned resets the machine to Idle.
#[test]
fn test_dangling_target_resets_to_idle() {
    let mut world = WorldBuilder::new()
        .with_config(|c| {
            c.species = test_species();
            c.behavior.hunger_rate = 0.0;
        })
        .build();
    world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
    world.spawn_school("test_shiner", 4, (210.0, 150.0, 2.0));
    world.update();

    let pike = predator_ids(&world)[0];
    place(&mut world, pike, 200.0, 150.0, 2.0);
    set_hunger(&mut world, pike, 90.0);
    world.update();
    assert!(matches!(state_of(&world, pike), BehaviorState::HuntingPrey));

    for id in member_ids(&world) {
        world
            .registry
            .queue_despawn(id, tightline_core::registry::DespawnReason::Expired);
    }
    // Park the predator away from the doomed school so nothing is eaten on
    // the removal tick itself.
    place(&mut world, pike, 100.0, 100.0, 2.0);
    world.update(); // removals applied at the end of this tick
    world.update(); // machine observes the empty world and resets
    assert!(matches!(state_of(&world, pike), BehaviorState::Idle));
    assert!(world.registry.schools().is_empty());
}

/// An unanswered strike window expires back to Idle.
#[test]
fn test_strike_window_expires_without_hookset() {
    let mut world = WorldBuilder::new()
        .with_config(|c| {
            c.species = test_species();
        })
        .build();
    world.spawn_predator("test_pike", SizeClass::Medium, (200.0, 150.0, 2.0));
    world.update();
    let pike = predator_ids(&world)[0];
    let (lx, ly, ld) = (world.lure.x, world.lure.y, world.lure.depth);
    place(&mut world, pike, lx - 1.0, ly, ld);
    set_state(&mut world, pike, BehaviorState::Striking { window: 3 });

    let mut struck = 0;
    for _ in 0..6 {
        world.update();
        match state_of(&world, pike) {
            BehaviorState::Striking { .. } => struck += 1,
            BehaviorState::Idle => {
                assert!(struck > 0);
                return;
            }
            other => panic!("unexpected state {other:?}"),
        }
    }
    panic!("strike window never expired");
}

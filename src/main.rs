use anyhow::Result;
use clap::Parser;
use tightline_core::{init_logging, SimConfig, World};
use tightline_data::{SimEvent, SizeClass};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// Override the world seed
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Headless demo: seeds a small lake, trolls the lure back and forth, and
/// plays a naive angler against the simulation.
fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = SimConfig::load_or_default(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    let (width, height) = (config.world.width, config.world.height);
    let mut world = World::new(config)?;

    world.spawn_school("golden_shiner", 40, (width * 0.3, height * 0.4, 2.0));
    world.spawn_school("yellow_perch", 25, (width * 0.7, height * 0.6, 5.0));
    world.spawn_predator("northern_pike", SizeClass::Large, (width * 0.4, height * 0.5, 3.0));
    world.spawn_predator("largemouth_bass", SizeClass::Medium, (width * 0.6, height * 0.4, 2.0));
    world.spawn_predator("walleye", SizeClass::Medium, (width * 0.5, height * 0.7, 8.0));

    world.retrieve_lure((1.0, 0.2, 0.0), 1.0);

    for tick in 0..args.ticks {
        // Troll a lazy figure: re-aim at the basin center periodically so
        // the lure stays in productive water.
        if tick % 300 == 150 {
            let dx = width * 0.5 - world.lure.x;
            let dy = height * 0.5 - world.lure.y;
            world.retrieve_lure((dx, dy, 0.0), 1.0);
        }

        world.update();

        if let Some(session) = world.fight() {
            // Keep pressure on, but back off before the line snaps.
            if session.tension < 60.0 {
                world.reel(1.0);
            }
        } else {
            let striking = world
                .sonar_frame()
                .contacts
                .iter()
                .any(|c| c.state == "striking");
            if striking {
                world.attempt_hookset();
            }
        }

        for event in world.drain_events() {
            match event {
                SimEvent::Catch {
                    species,
                    weight_kg,
                    fight_ticks,
                    ..
                } => println!("CATCH  {species} {weight_kg:.1} kg after {fight_ticks} ticks"),
                SimEvent::Escape {
                    species, reason, ..
                } => println!("ESCAPE {species} ({reason:?})"),
                SimEvent::Migration { species, .. } => println!("LEFT   {species} migrated away"),
                SimEvent::Feeding { .. } => {}
            }
        }
    }

    println!(
        "done after {} ticks: population {}, {} catches, {} escapes",
        world.tick,
        world.population(),
        world.metrics.counter("catches"),
        world.metrics.counter("escapes"),
    );
    Ok(())
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tightline_core::spatial::SpatialGrid;
use tightline_core::{SimConfig, World};
use tightline_data::SizeClass;

fn bench_spatial_grid(c: &mut Criterion) {
    let positions: Vec<(f64, f64)> = (0..2000)
        .map(|i| {
            let a = i as f64 * 0.618;
            ((a * 137.0) % 400.0, (a * 251.0) % 300.0)
        })
        .collect();

    let mut grid = SpatialGrid::new(8.0, 400.0, 300.0);
    c.bench_function("spatial_rebuild_2000", |b| {
        b.iter(|| grid.rebuild(black_box(&positions)))
    });

    grid.rebuild(&positions);
    let mut out = Vec::new();
    c.bench_function("spatial_query_r12", |b| {
        b.iter(|| {
            grid.query_into(black_box(200.0), black_box(150.0), 12.0, &mut out);
            black_box(out.len())
        })
    });
}

fn bench_world_tick(c: &mut Criterion) {
    let mut config = SimConfig::default();
    config.world.seed = Some(42);
    let mut world = World::new(config).unwrap();
    world.spawn_school("golden_shiner", 120, (120.0, 80.0, 2.0));
    world.spawn_school("yellow_perch", 80, (250.0, 200.0, 5.0));
    for i in 0..6 {
        world.spawn_predator(
            "northern_pike",
            SizeClass::Medium,
            (60.0 + i as f64 * 50.0, 150.0, 3.0),
        );
    }
    world.retrieve_lure((1.0, 0.4, 0.0), 0.9);
    world.update();

    c.bench_function("world_tick_200_organisms", |b| b.iter(|| world.update()));
}

criterion_group!(benches, bench_spatial_grid, bench_world_tick);
criterion_main!(benches);

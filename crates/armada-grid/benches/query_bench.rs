use armada_grid::{scan, Bounds, SpatialEntity, SpatialGrid, TeamId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn population(count: u64) -> Vec<SpatialEntity> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    (0..count)
        .map(|id| {
            let pos = Vec3::new(
                rng.gen_range(0.0..4000.0),
                rng.gen_range(0.0..4000.0),
                rng.gen_range(0.0..4000.0),
            );
            SpatialEntity::new(id, pos, 10.0, TeamId::new((id % 2) as u8))
        })
        .collect()
}

fn bench_neighbor_queries(c: &mut Criterion) {
    // 600 ships in a 4 km cube, queries at separation range
    let entities = population(600);
    let mut grid = SpatialGrid::new(Bounds::from_size(4000.0, 4000.0, 4000.0), 120.0);
    grid.rebuild(&entities);

    c.bench_function("grid_neighbors_600", |b| {
        b.iter(|| {
            for e in &entities {
                black_box(grid.query_neighbors(e.pos, 60.0, e.team, Some(e.id)));
            }
        })
    });

    c.bench_function("scan_neighbors_600", |b| {
        b.iter(|| {
            for e in &entities {
                black_box(scan::neighbors(&entities, e.pos, 60.0, e.team, Some(e.id)));
            }
        })
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let entities = population(600);
    let mut grid = SpatialGrid::new(Bounds::from_size(4000.0, 4000.0, 4000.0), 120.0);

    c.bench_function("grid_rebuild_600", |b| {
        b.iter(|| grid.rebuild(black_box(&entities)))
    });
}

criterion_group!(benches, bench_neighbor_queries, bench_rebuild);
criterion_main!(benches);

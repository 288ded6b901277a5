use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use hexworld::map::{MapConfig, TilePos, generate};
use hexworld::resources::distribute;
use hexworld::sublands::{CoastalHint, RiverHint, generate_sub_land_grid};

fn bench_generate_earth(c: &mut Criterion) {
    // Full 420x220 Earth layout, 92400 tiles
    let config = MapConfig::earth();

    let mut group = c.benchmark_group("world_generation");
    group.sample_size(10);
    group.bench_function("generate_earth", |b| {
        b.iter(|| generate(black_box(42), 1, &config))
    });
    group.finish();
}

fn bench_distribute_resources(c: &mut Criterion) {
    let config = MapConfig::empty(60, 40);
    let Ok(tiles) = generate(7, 6, &config) else {
        return;
    };

    c.bench_function("distribute_resources_2400_tiles", |b| {
        b.iter(|| {
            tiles
                .values()
                .map(|tile| distribute(tile, black_box(7)))
                .filter(|set| !set.is_empty())
                .count()
        })
    });
}

fn bench_sub_lands(c: &mut Criterion) {
    let config = MapConfig::earth();
    let Ok(tiles) = generate(42, 1, &config) else {
        return;
    };
    let Some(parent) = tiles.get(&TilePos::new(140, 93)) else {
        return;
    };
    let coast = [CoastalHint { direction: 0 }, CoastalHint { direction: 1 }];
    let rivers = [RiverHint {
        entry: 3,
        exit: 0,
        flow: 0.9,
    }];

    c.bench_function("generate_sub_land_grid", |b| {
        b.iter(|| generate_sub_land_grid(parent, 140, 93, black_box(&coast), &rivers))
    });
}

criterion_group!(benches, bench_generate_earth, bench_distribute_resources, bench_sub_lands);
criterion_main!(benches);

//! Criterion benches for savestate throughput.
//!
//! A level with a few dozen monsters is played forward a little so the
//! creature list and layer are not trivial, then saved, compressed and
//! restored.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lynx_engine::{
    config::LevelDescription,
    core::position::GRID_CELLS,
    savestate::{compress, read},
    Direction, Level, Position, Tile,
};

fn busy_level() -> Level {
    let mut layer = vec![Tile::Floor.byte(); GRID_CELLS];
    layer[0] = Tile::ChipDown.byte();
    let monsters = [Tile::BugUp, Tile::BlobUp, Tile::WalkerLeft, Tile::TankRight, Tile::BallDown];
    for i in 0..40 {
        if let Some(p) = Position::new(4 + (i % 8) * 3, 4 + (i / 8) * 5) {
            layer[p.index()] = monsters[i as usize % monsters.len()].byte();
        }
    }
    for x in 0..32 {
        if let Some(p) = Position::new(x, 30) {
            layer[p.index()] = Tile::Ice.byte();
        }
    }

    let mut level = Level::new(&LevelDescription {
        layer,
        rng_seed: 99,
        ..LevelDescription::default()
    })
    .unwrap();
    for _ in 0..50 {
        level.tick(Direction::Right);
    }
    level
}

fn bench_savestate(c: &mut Criterion) {
    let level = busy_level();
    let raw = level.save();
    let packed = compress(&raw).unwrap();

    let mut group = c.benchmark_group("savestate");
    group.bench_function("save_v6", |b| b.iter(|| black_box(level.save())));
    group.bench_function("compress_v6_to_v7", |b| b.iter(|| black_box(compress(black_box(&raw)).unwrap())));
    group.bench_function("read_v6", |b| b.iter(|| black_box(read(black_box(&raw)).unwrap())));
    group.bench_function("read_v7", |b| b.iter(|| black_box(read(black_box(&packed)).unwrap())));
    group.bench_function("load_v7", |b| {
        b.iter_batched(
            || level.clone(),
            |mut target| {
                target.load(&packed).unwrap();
                target
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_busy_level", |b| {
        b.iter_batched(busy_level, |mut level| black_box(level.tick(Direction::Left)), BatchSize::SmallInput)
    });
}

criterion_group!(benches, bench_savestate, bench_tick);
criterion_main!(benches);

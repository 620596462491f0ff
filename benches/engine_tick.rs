//! Tick throughput of the tactical engine.
//!
//! Run with: cargo bench --bench engine_tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use vanguard::core::types::{UnitTag, ZoneId};
use vanguard::groups::build_groups;
use vanguard::power::PowerVector;
use vanguard::services::{ThreatFieldPathing, WorldSnapshot};
use vanguard::units::{Unit, UnitType};
use vanguard::zones::{Zone, ZoneMap, ZoneOwner};
use vanguard::{TacticalEngine, VanguardConfig};

const ROSTER: &[UnitType] = &[
    UnitType::Rifleman,
    UnitType::Ranger,
    UnitType::Brawler,
    UnitType::Tracker,
    UnitType::Sentinel,
    UnitType::Lancer,
];

fn army(count: usize, origin: Vec2, first_tag: u64) -> Vec<Unit> {
    (0..count)
        .map(|i| {
            let unit_type = ROSTER[i % ROSTER.len()];
            let offset = Vec2::new((i % 8) as f32 * 1.5, (i / 8) as f32 * 1.5);
            Unit::new(UnitTag(first_tag + i as u64), unit_type, origin + offset).with_energy(100.0)
        })
        .collect()
}

/// Two armies already in contact in the middle of the map
fn battle(size: usize) -> WorldSnapshot {
    let mut world = WorldSnapshot::new(30.0);
    world.own_units = army(size, Vec2::new(40.0, 40.0), 1);
    world.enemy_units = army(size, Vec2::new(50.0, 40.0), 10_000);
    world.enemy_units.push(Unit::new(UnitTag(9_999), UnitType::Townhall, Vec2::new(100.0, 40.0)));
    world.rally_point = Vec2::new(10.0, 40.0);
    world.home = Vec2::new(5.0, 40.0);
    world
}

fn zones() -> ZoneMap {
    ZoneMap::new(vec![
        Zone::new(ZoneId(0), Vec2::new(5.0, 40.0), 15.0).with_owner(ZoneOwner::Own),
        Zone::new(ZoneId(1), Vec2::new(100.0, 40.0), 15.0).as_enemy_start(),
    ])
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");

    for size in [10, 50, 150].iter() {
        let world = battle(*size);
        let pathing = ThreatFieldPathing::from_enemies(&world.enemy_units);

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}_units", size)), size, |b, _| {
            b.iter(|| {
                let mut engine = match TacticalEngine::new(VanguardConfig::default()) {
                    Ok(engine) => engine,
                    Err(e) => panic!("default config rejected: {}", e),
                };
                let mut zones = zones();
                black_box(engine.tick(black_box(&world), &mut zones, &pathing))
            });
        });
    }

    group.finish();
}

fn bench_grouping(c: &mut Criterion) {
    let config = VanguardConfig::default();
    let world = battle(150);

    c.bench_function("build_groups_150", |b| {
        b.iter(|| black_box(build_groups(black_box(&world.own_units), &config.engagement)))
    });

    c.bench_function("power_of_150", |b| {
        b.iter(|| black_box(PowerVector::of_units(black_box(&world.own_units))))
    });
}

criterion_group!(benches, bench_engine_tick, bench_grouping);
criterion_main!(benches);

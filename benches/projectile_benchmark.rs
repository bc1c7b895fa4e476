//! Benchmarks for the hot per-tick paths: pooled projectiles and the beam.

use bevy::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use neural_break_weapons::arena::Arena;
use neural_break_weapons::beam::BeamWeapon;
use neural_break_weapons::config::{WeaponConfig, WeaponTuning};
use neural_break_weapons::events::EventBus;
use neural_break_weapons::pool::ObjectPool;
use neural_break_weapons::projectile::Projectile;
use neural_break_weapons::simulation::WeaponsSimulation;
use neural_break_weapons::weapon::FireInput;

fn populated_arena(targets: usize) -> Arena {
    let mut arena = Arena::default();
    for i in 0..targets {
        let x = (i % 32) as f32 * 1.5 - 24.0;
        let y = (i / 32) as f32 * 1.5 + 4.0;
        arena.spawn_target(Vec2::new(x, y), 0.5, i32::MAX);
    }
    arena
}

fn benchmark_pool_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pool Churn");

    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut pool: ObjectPool<Projectile> = ObjectPool::new(count);
            let mut handles = Vec::with_capacity(count);
            b.iter(|| {
                for _ in 0..count {
                    handles.push(pool.get(Vec2::ZERO, Vec2::Y));
                }
                for handle in handles.drain(..) {
                    pool.return_instance(handle);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_simulation_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simulation Tick");
    let input = FireInput {
        fire_held: true,
        ..Default::default()
    };

    for targets in [16, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(targets), targets, |b, &targets| {
            let mut sim = WeaponsSimulation::new(WeaponConfig::default());
            sim.init();
            let mut arena = populated_arena(targets);
            b.iter(|| {
                sim.tick(1.0 / 60.0, &input, &mut arena);
                sim.drain_events().count()
            });
        });
    }

    group.finish();
}

fn benchmark_beam(c: &mut Criterion) {
    let tuning = WeaponTuning::default().beam;
    let mut arena = populated_arena(256);
    let mut events = EventBus::default();
    let mut beam = BeamWeapon::new();
    beam.fire(Vec2::ZERO, Vec2::Y, 1.0, &mut events);

    c.bench_function("Beam Tick", |b| {
        b.iter(|| {
            let dealt = beam.tick(1.0 / 60.0, &tuning, &mut arena, &mut events);
            events.clear();
            dealt
        });
    });
}

criterion_group!(benches, benchmark_pool_churn, benchmark_simulation_tick, benchmark_beam);
criterion_main!(benches);

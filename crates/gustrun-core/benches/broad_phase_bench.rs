use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use gustrun_core::collision::{CollisionContext, CollisionRegistry};
use gustrun_core::command::{CommandQueue, SpawnRequest};
use gustrun_core::components::Transform;
use gustrun_core::entity::kinds::{Coin, Enemy, Player};
use gustrun_core::entity::{Entity, EntityKind, EntityManager};
use gustrun_core::events::EventBus;
use gustrun_core::input::InputState;
use gustrun_core::{GameConfig, Simulation};

/// Scatters `count` boxes on a grid so roughly a third of neighbors touch.
fn populate(count: usize) -> EntityManager {
    let kinds = [EntityKind::Player, EntityKind::Coin, EntityKind::Enemy];
    let mut entities = EntityManager::new();
    for i in 0..count {
        let x = (i % 32) as f32 * 20.0;
        let y = (i / 32) as f32 * 20.0;
        let mut entity = Entity::new(EntityManager::generate_id(), kinds[i % kinds.len()]);
        entity.add_component(Transform::new(Vec2::new(x, y), Vec2::splat(24.0)));
        entities.add_entity(entity);
    }
    entities
}

fn bench_check_all_collisions(c: &mut Criterion) {
    // Handlers leave entities active so every iteration sees the same overlaps.
    let mut registry = CollisionRegistry::new();
    registry.register::<Player, Coin>(|_, _, ctx| ctx.normal = Vec2::ZERO);
    registry.register::<Player, Enemy>(|_, _, ctx| ctx.normal = Vec2::ZERO);
    let config = GameConfig::default();

    let mut group = c.benchmark_group("check_all_collisions");
    for count in [50, 200, 500] {
        let mut entities = populate(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut commands = CommandQueue::new();
                let mut events = EventBus::new();
                let mut ctx = CollisionContext::new(&mut commands, &mut events, &config);
                black_box(registry.check_all_collisions(&mut entities, &mut ctx))
            });
        });
    }
    group.finish();
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut sim = Simulation::new(GameConfig::default());
    sim.spawn(SpawnRequest::Ground {
        position: Vec2::new(2000.0, 400.0),
        size: Vec2::new(4000.0, 32.0),
    });
    sim.spawn(SpawnRequest::Player {
        position: Vec2::new(64.0, 360.0),
    });
    for i in 0..100 {
        sim.spawn(SpawnRequest::Coin {
            position: Vec2::new(200.0 + i as f32 * 36.0, 300.0),
            value: 10,
        });
    }

    c.bench_function("simulation_step", |b| {
        b.iter(|| black_box(sim.step(black_box(InputState::RIGHT))));
    });
}

criterion_group!(benches, bench_check_all_collisions, bench_simulation_step);
criterion_main!(benches);

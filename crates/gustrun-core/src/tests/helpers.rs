//! Test fixture and accessors.
//!
//! [`TestWorld`] holds the same pieces a [`Simulation`](crate::Simulation)
//! does, but leaves the frame order to the test, so a scenario can drive a
//! single phase (one broad-phase pass, one state update) and inspect the
//! result.

use glam::Vec2;

use crate::collision::{BroadPhaseStats, CollisionContext, CollisionRegistry};
use crate::command::{Command, CommandQueue, SpawnRequest};
use crate::components::{Color, HealthComponent, PhysicsComponent, RenderComponent, ScoreComponent};
use crate::config::GameConfig;
use crate::entity::{EntityId, EntityManager};
use crate::events::EventBus;
use crate::factory::EntityFactory;
use crate::physics::PhysicsWorld;
use crate::player::{PlayerStateComponent, PlayerStateKind, StateContext};

/// Ground strip used by the simulation scenarios: top edge at y = 384.
pub const GROUND_TOP: f32 = 384.0;

/// Everything a frame touches, owned by the test.
pub struct TestWorld {
    pub config: GameConfig,
    pub entities: EntityManager,
    pub physics: PhysicsWorld,
    pub commands: CommandQueue,
    pub events: EventBus,
    pub factory: EntityFactory,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            physics: PhysicsWorld::new(config.physics.gravity),
            factory: EntityFactory::new(&config),
            entities: EntityManager::new(),
            commands: CommandQueue::new(),
            events: EventBus::new(),
            config,
        }
    }

    /// Builds `request` and adds it immediately.
    pub fn spawn(&mut self, request: SpawnRequest) -> EntityId {
        let entity = self.factory.build(&request, &mut self.physics);
        self.entities.add_entity(entity)
    }

    pub fn spawn_player(&mut self, x: f32, y: f32) -> EntityId {
        self.spawn(SpawnRequest::Player {
            position: Vec2::new(x, y),
        })
    }

    pub fn spawn_coin(&mut self, x: f32, y: f32, value: u32) -> EntityId {
        self.spawn(SpawnRequest::Coin {
            position: Vec2::new(x, y),
            value,
        })
    }

    /// State context for `player`.
    pub fn ctx(&mut self, player: EntityId) -> StateContext<'_> {
        StateContext {
            player,
            entities: &mut self.entities,
            physics: &mut self.physics,
            commands: &mut self.commands,
            events: &mut self.events,
            config: &self.config,
        }
    }

    /// One broad-phase pass over the current transforms.
    pub fn broad_phase(&mut self, registry: &CollisionRegistry) -> BroadPhaseStats {
        let mut ctx = CollisionContext::new(&mut self.commands, &mut self.events, &self.config);
        registry.check_all_collisions(&mut self.entities, &mut ctx)
    }

    /// Builds every queued spawn and queues it on the manager; other commands
    /// are dropped. Returns the number of spawns queued.
    pub fn queue_spawns(&mut self) -> usize {
        let mut queued = 0;
        for command in self.commands.take() {
            if let Command::Spawn(request) = command {
                let entity = self.factory.build(&request, &mut self.physics);
                self.entities.queue_spawn(entity);
                queued += 1;
            }
        }
        queued
    }

    pub fn body_velocity(&self, id: EntityId) -> Option<Vec2> {
        let handle = self
            .entities
            .get(id)?
            .get_component::<PhysicsComponent>()?
            .handle();
        self.physics.body(handle).map(|body| body.velocity)
    }

    pub fn set_body_velocity(&mut self, id: EntityId, velocity: Vec2) {
        let handle = self
            .entities
            .get(id)
            .and_then(|e| e.get_component::<PhysicsComponent>())
            .map(PhysicsComponent::handle)
            .expect("entity has a body");
        self.physics.set_velocity(handle, velocity);
    }

    pub fn set_grounded(&mut self, id: EntityId, grounded: bool) {
        let handle = self
            .entities
            .get(id)
            .and_then(|e| e.get_component::<PhysicsComponent>())
            .map(PhysicsComponent::handle)
            .expect("entity has a body");
        if let Some(body) = self.physics.body_mut(handle) {
            body.grounded = grounded;
        }
    }

    pub fn damping(&self, id: EntityId) -> Option<f32> {
        let handle = self
            .entities
            .get(id)?
            .get_component::<PhysicsComponent>()?
            .handle();
        self.physics.body(handle).map(|body| body.linear_damping)
    }

    pub fn state(&self, id: EntityId) -> Option<PlayerStateKind> {
        state_of(&self.entities, id)
    }

    pub fn tint(&self, id: EntityId) -> Option<Color> {
        tint_of(&self.entities, id)
    }

    pub fn set_tint(&mut self, id: EntityId, tint: Color) {
        if let Some(render) = self
            .entities
            .get_mut(id)
            .and_then(|e| e.get_component_mut::<RenderComponent>())
        {
            render.tint = tint;
        }
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| e.is_active())
    }
}

pub fn state_of(entities: &EntityManager, id: EntityId) -> Option<PlayerStateKind> {
    entities
        .get(id)?
        .get_component::<PlayerStateComponent>()
        .map(|s| s.kind)
}

pub fn tint_of(entities: &EntityManager, id: EntityId) -> Option<Color> {
    entities
        .get(id)?
        .get_component::<RenderComponent>()
        .map(|r| r.tint)
}

pub fn score_of(entities: &EntityManager, id: EntityId) -> ScoreComponent {
    entities
        .get(id)
        .and_then(|e| e.get_component::<ScoreComponent>())
        .copied()
        .unwrap_or_default()
}

pub fn health_of(entities: &EntityManager, id: EntityId) -> u32 {
    entities
        .get(id)
        .and_then(|e| e.get_component::<HealthComponent>())
        .map_or(0, HealthComponent::current)
}

/// Asserts two floats are within `1e-4`.
pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

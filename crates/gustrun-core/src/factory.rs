//! Builds fully equipped entities from [`SpawnRequest`]s.
//!
//! Every entity gets a [`Transform`], a [`RenderComponent`], a
//! [`CollisionComponent`] and a body whose owner is the new entity and whose
//! filter matches the collision component. Kind-specific components are
//! listed on [`EntityFactory::build`].

use glam::Vec2;
use tracing::trace;

use crate::command::SpawnRequest;
use crate::components::{
    AiComponent, CollectibleComponent, CollisionComponent, Color, GiftComponent, GoalComponent,
    HealthComponent, MovementComponent, PhysicsComponent, ProjectileComponent, RenderComponent,
    ScoreComponent, Transform,
};
use crate::config::GameConfig;
use crate::entity::{Entity, EntityManager};
use crate::physics::{BodyDef, BodyKind, CollisionCategory, PhysicsWorld};
use crate::player::{EffectTimer, PlayerStateComponent};

/// Player sprite size in pixels.
pub const PLAYER_SIZE: Vec2 = Vec2::new(32.0, 48.0);
/// Coin size in pixels.
pub const COIN_SIZE: Vec2 = Vec2::splat(16.0);
/// Gift box size in pixels.
pub const GIFT_SIZE: Vec2 = Vec2::splat(24.0);
/// Enemy size in pixels.
pub const ENEMY_SIZE: Vec2 = Vec2::splat(32.0);
/// Projectile size in pixels.
pub const PROJECTILE_SIZE: Vec2 = Vec2::splat(8.0);
/// Goal flag size in pixels.
pub const GOAL_SIZE: Vec2 = Vec2::new(32.0, 64.0);

/// Body and filter settings shared by every kind.
struct Shape {
    size: Vec2,
    body: BodyKind,
    sensor: bool,
    category: CollisionCategory,
    mask: CollisionCategory,
    texture: &'static str,
}

/// Builds entities and their bodies from the active configuration.
#[derive(Debug, Clone)]
pub struct EntityFactory {
    config: GameConfig,
}

impl EntityFactory {
    /// Creates a factory using `config` for sizes, speeds and health.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Builds the entity described by `request` and creates its body.
    ///
    /// | kind | body | extra components |
    /// |------|------|------------------|
    /// | Player | dynamic | health, score, movement, state, effect timer |
    /// | Coin | kinematic sensor | collectible |
    /// | Gift | kinematic sensor | gift |
    /// | Enemy | dynamic | health, movement, AI |
    /// | Spike | static sensor | none |
    /// | Projectile | dynamic sensor, no gravity | projectile |
    /// | Ground, Obstacle | static | none |
    /// | Goal | static sensor | goal |
    ///
    /// The entity is not added to any manager.
    pub fn build(&self, request: &SpawnRequest, physics: &mut PhysicsWorld) -> Entity {
        let kind = request.kind();
        let (position, shape) = Self::shape(request);
        let mut entity = Entity::new(EntityManager::generate_id(), kind);

        let ppm = self.config.physics.pixels_per_meter;
        let mut def = BodyDef::new(shape.body, position / ppm, shape.size / (2.0 * ppm))
            .with_owner(entity.id())
            .with_filter(shape.category, shape.mask);
        if shape.sensor {
            def = def.sensor();
        }
        if let SpawnRequest::Projectile { velocity, .. } = *request {
            def = def.with_velocity(velocity).with_gravity_scale(0.0);
        }
        let handle = physics.create_body(def);

        entity.add_component(Transform::new(position, shape.size));
        entity.add_component(RenderComponent::new(shape.texture));
        entity.add_component(CollisionComponent::new(shape.category, shape.mask));
        entity.add_component(PhysicsComponent::new(handle));
        self.equip(&mut entity, request);

        trace!(id = %entity.id(), %kind, x = position.x, y = position.y, "entity built");
        entity
    }

    fn shape(request: &SpawnRequest) -> (Vec2, Shape) {
        use CollisionCategory as C;

        match *request {
            SpawnRequest::Player { position } => (
                position,
                Shape {
                    size: PLAYER_SIZE,
                    body: BodyKind::Dynamic,
                    sensor: false,
                    category: C::PLAYER,
                    mask: C::ENEMY | C::HAZARD | C::COLLECTIBLE | C::GROUND | C::OBSTACLE,
                    texture: "player",
                },
            ),
            SpawnRequest::Coin { position, .. } => (
                position,
                Shape {
                    size: COIN_SIZE,
                    body: BodyKind::Kinematic,
                    sensor: true,
                    category: C::COLLECTIBLE,
                    mask: C::PLAYER,
                    texture: "coin",
                },
            ),
            SpawnRequest::Gift { position, .. } => (
                position,
                Shape {
                    size: GIFT_SIZE,
                    body: BodyKind::Kinematic,
                    sensor: true,
                    category: C::COLLECTIBLE,
                    mask: C::PLAYER,
                    texture: "gift",
                },
            ),
            SpawnRequest::Enemy { position, .. } => (
                position,
                Shape {
                    size: ENEMY_SIZE,
                    body: BodyKind::Dynamic,
                    sensor: false,
                    category: C::ENEMY,
                    mask: C::PLAYER | C::PROJECTILE | C::GROUND | C::OBSTACLE,
                    texture: "enemy",
                },
            ),
            SpawnRequest::Spike { position, size } => (
                position,
                Shape {
                    size,
                    body: BodyKind::Static,
                    sensor: true,
                    category: C::HAZARD,
                    mask: C::PLAYER,
                    texture: "spike",
                },
            ),
            SpawnRequest::Projectile { position, .. } => (
                position,
                Shape {
                    size: PROJECTILE_SIZE,
                    body: BodyKind::Dynamic,
                    sensor: true,
                    category: C::PROJECTILE,
                    mask: C::ENEMY | C::GROUND | C::OBSTACLE,
                    texture: "projectile",
                },
            ),
            SpawnRequest::Ground { position, size } => (
                position,
                Shape {
                    size,
                    body: BodyKind::Static,
                    sensor: false,
                    category: C::GROUND,
                    mask: C::all(),
                    texture: "ground",
                },
            ),
            SpawnRequest::Obstacle { position, size } => (
                position,
                Shape {
                    size,
                    body: BodyKind::Static,
                    sensor: false,
                    category: C::OBSTACLE,
                    mask: C::all(),
                    texture: "obstacle",
                },
            ),
            SpawnRequest::Goal { position } => (
                position,
                Shape {
                    size: GOAL_SIZE,
                    body: BodyKind::Static,
                    sensor: true,
                    category: C::COLLECTIBLE,
                    mask: C::PLAYER,
                    texture: "goal",
                },
            ),
        }
    }

    fn equip(&self, entity: &mut Entity, request: &SpawnRequest) {
        let config = &self.config;
        match *request {
            SpawnRequest::Player { .. } => {
                entity.add_component(HealthComponent::new(config.player.max_health));
                entity.add_component(ScoreComponent::default());
                entity.add_component(MovementComponent::new(
                    config.player.base_speed,
                    config.player.jump_speed,
                ));
                entity.add_component(PlayerStateComponent::default());
                entity.add_component(EffectTimer::default());
            }
            SpawnRequest::Coin { value, .. } => {
                entity.add_component(CollectibleComponent { value });
                if let Some(render) = entity.get_component_mut::<RenderComponent>() {
                    render.tint = Color::GOLD;
                }
            }
            SpawnRequest::Gift { effect, .. } => {
                entity.add_component(GiftComponent { effect });
            }
            SpawnRequest::Enemy {
                patrol_left,
                patrol_right,
                ..
            } => {
                entity.add_component(HealthComponent::new(config.enemy.health));
                entity.add_component(MovementComponent::new(
                    config.enemy.patrol_speed,
                    config.enemy.hop_speed,
                ));
                entity.add_component(
                    AiComponent::new(patrol_left, patrol_right, config.seed)
                        .with_hops(config.enemy.hop_chance, config.enemy.hop_speed),
                );
            }
            SpawnRequest::Projectile { velocity, .. } => {
                entity.add_component(ProjectileComponent::new(
                    config.player.projectile_lifetime,
                    config.player.projectile_damage,
                ));
                if let Some(render) = entity.get_component_mut::<RenderComponent>() {
                    render.flip_x = velocity.x < 0.0;
                }
            }
            SpawnRequest::Goal { .. } => {
                entity.add_component(GoalComponent::default());
            }
            SpawnRequest::Spike { .. } | SpawnRequest::Ground { .. } | SpawnRequest::Obstacle { .. } => {}
        }
    }
}

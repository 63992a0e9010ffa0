//! Fixed-step simulation loop.
//!
//! # Frame order
//!
//! [`Simulation::step`] runs one frame of `config.physics.fixed_dt` seconds:
//!
//! 1. **Input**: each player's active state maps the input to movement.
//! 2. **Components**: every active entity updates its components in
//!    insertion order.
//! 3. **Collisions**: the physics world steps and the [`ContactBridge`]
//!    dispatches contacts as they are reported. In
//!    [`CollisionMode::BroadPhase`] the world steps silently and
//!    [`CollisionRegistry::check_all_collisions`] runs over the synced
//!    transforms instead.
//! 4. **Commands**: queued spawns, despawns, velocity changes and player
//!    state requests are applied.
//! 5. **Player states**: every player's state ticks and may revert to
//!    `Normal`.
//! 6. **Compaction**: inactive entities are released, pending spawns become
//!    visible.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use gustrun_core::command::SpawnRequest;
//! use gustrun_core::config::GameConfig;
//! use gustrun_core::input::InputState;
//! use gustrun_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(GameConfig::default());
//! sim.spawn(SpawnRequest::Ground {
//!     position: Vec2::new(320.0, 400.0),
//!     size: Vec2::new(640.0, 32.0),
//! });
//! let player = sim.spawn(SpawnRequest::Player { position: Vec2::new(64.0, 360.0) });
//!
//! for _ in 0..30 {
//!     sim.step(InputState::RIGHT);
//! }
//! assert_eq!(sim.tick(), 30);
//! assert!(sim.entities().get(player).is_some());
//! ```

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::collision::{BridgeStats, BroadPhaseStats, CollisionContext, CollisionRegistry, ContactBridge};
use crate::command::{Command, CommandQueue, SpawnRequest};
use crate::components::{sync_transform, Color, PhysicsComponent, RenderComponent, Transform};
use crate::config::{CollisionMode, GameConfig};
use crate::entity::manager::CompactStats;
use crate::entity::{EntityId, EntityKind, EntityManager, FrameContext};
use crate::error::TransitionError;
use crate::events::EventBus;
use crate::factory::EntityFactory;
use crate::input::InputState;
use crate::physics::{BodyHandle, PhysicsWorld, StepStats};
use crate::player::{
    PlayerStateComponent, PlayerStateKind, PlayerStateManager, StateContext, TransitionTable,
    ValidatedStateManager,
};

/// Rounds of command application per frame. Commands queued by the last
/// round wait for the next frame.
const MAX_COMMAND_ROUNDS: usize = 4;

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Tick number of this frame (before increment).
    pub tick: u64,
    /// `true` if the frame was skipped because the simulation is paused.
    pub skipped: bool,
    /// Contacts reported by the physics step.
    pub contacts: StepStats,
    /// Contact dispatch counters ([`CollisionMode::PhysicsContacts`]).
    pub dispatch: BridgeStats,
    /// Overlap test counters ([`CollisionMode::BroadPhase`]).
    pub broad_phase: BroadPhaseStats,
    /// Commands applied.
    pub commands: usize,
    /// Players whose effect expired this frame.
    pub reverted: usize,
    /// Entities released and admitted at the end of the frame.
    pub compact: CompactStats,
}

/// Read-only view of one drawable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem<'a> {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Center in pixels.
    pub position: Vec2,
    /// Size in pixels.
    pub size: Vec2,
    /// Texture key.
    pub texture: &'a str,
    /// Tint.
    pub tint: Color,
    /// Mirror horizontally.
    pub flip_x: bool,
}

#[derive(Debug)]
enum StateDriver {
    Plain(PlayerStateManager),
    Validated(ValidatedStateManager),
}

impl StateDriver {
    fn change_state(
        &self,
        ctx: &mut StateContext<'_>,
        state: PlayerStateKind,
    ) -> Result<bool, TransitionError> {
        match self {
            Self::Plain(manager) => {
                if ctx.current_state().is_none() {
                    return Err(TransitionError::NotAPlayer(ctx.player));
                }
                Ok(manager.change_state(ctx, state))
            }
            Self::Validated(manager) => manager.change_state(ctx, state),
        }
    }

    fn update(&self, ctx: &mut StateContext<'_>, dt: f32) -> bool {
        match self {
            Self::Plain(manager) => manager.update(ctx, dt),
            Self::Validated(manager) => manager.update(ctx, dt),
        }
    }

    fn handle_input(&self, ctx: &mut StateContext<'_>, input: InputState) {
        match self {
            Self::Plain(manager) => manager.handle_input(ctx, input),
            Self::Validated(manager) => manager.handle_input(ctx, input),
        }
    }
}

/// Mutable world state, split from the rest so it can be borrowed next to
/// the registry and the state manager.
#[derive(Debug)]
struct World {
    entities: EntityManager,
    physics: PhysicsWorld,
    commands: CommandQueue,
    events: EventBus,
}

impl World {
    fn state_context<'a>(&'a mut self, player: EntityId, config: &'a GameConfig) -> StateContext<'a> {
        StateContext {
            player,
            entities: &mut self.entities,
            physics: &mut self.physics,
            commands: &mut self.commands,
            events: &mut self.events,
            config,
        }
    }

    fn body_of(&self, id: EntityId) -> Option<BodyHandle> {
        self.entities
            .get(id)?
            .get_component::<PhysicsComponent>()
            .map(PhysicsComponent::handle)
    }
}

/// Owns every piece of the runtime and advances it frame by frame.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: World,
    registry: CollisionRegistry,
    states: StateDriver,
    factory: EntityFactory,
    tick: u64,
    paused: bool,
}

impl Simulation {
    /// Creates an empty simulation with the standard collision handlers.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_registry(config, CollisionRegistry::with_default_handlers())
    }

    /// Creates an empty simulation dispatching through `registry`.
    #[must_use]
    pub fn with_registry(config: GameConfig, registry: CollisionRegistry) -> Self {
        debug!(
            seed = config.seed,
            mode = ?config.collision.mode,
            handlers = registry.len(),
            "simulation created"
        );
        Self {
            world: World {
                entities: EntityManager::new(),
                physics: PhysicsWorld::new(config.physics.gravity),
                commands: CommandQueue::new(),
                events: EventBus::new(),
            },
            registry,
            states: StateDriver::Plain(PlayerStateManager::new()),
            factory: EntityFactory::new(&config),
            config,
            tick: 0,
            paused: false,
        }
    }

    /// Routes every player state request through `table`; disallowed
    /// requests are dropped.
    #[must_use]
    pub fn with_transition_table(mut self, table: TransitionTable) -> Self {
        self.states = StateDriver::Validated(ValidatedStateManager::new(table));
        self
    }

    /// Builds `request` and adds it immediately. Use between frames.
    pub fn spawn(&mut self, request: SpawnRequest) -> EntityId {
        let entity = self.factory.build(&request, &mut self.world.physics);
        self.world.entities.add_entity(entity)
    }

    /// Runs one frame. Does nothing while paused.
    pub fn step(&mut self, input: InputState) -> FrameStats {
        let mut stats = FrameStats {
            tick: self.tick,
            ..FrameStats::default()
        };
        if self.paused {
            stats.skipped = true;
            return stats;
        }

        let dt = self.config.physics.fixed_dt;
        let players = self.player_ids();

        for &player in &players {
            let mut ctx = self.world.state_context(player, &self.config);
            self.states.handle_input(&mut ctx, input);
        }

        let world = &mut self.world;
        let mut frame = FrameContext {
            physics: &mut world.physics,
            commands: &mut world.commands,
            config: &self.config,
        };
        world.entities.update_components(dt, &mut frame);

        self.run_collisions(dt, &mut stats);
        stats.commands = self.apply_commands();

        for &player in &players {
            let mut ctx = self.world.state_context(player, &self.config);
            if self.states.update(&mut ctx, dt) {
                stats.reverted += 1;
            }
        }

        stats.compact = self.world.entities.compact(&mut self.world.physics);
        self.tick += 1;
        trace!(tick = stats.tick, ?stats, "frame done");
        stats
    }

    fn run_collisions(&mut self, dt: f32, stats: &mut FrameStats) {
        let world = &mut self.world;
        let ppm = self.config.physics.pixels_per_meter;
        match self.config.collision.mode {
            CollisionMode::PhysicsContacts => {
                let ctx = CollisionContext::new(&mut world.commands, &mut world.events, &self.config);
                let mut bridge = ContactBridge::new(&mut world.entities, &self.registry, ctx);
                stats.contacts = world.physics.step(dt, &mut bridge);
                stats.dispatch = bridge.stats();
                for entity in world.entities.entities_mut() {
                    sync_transform(entity, &world.physics, ppm);
                }
            }
            CollisionMode::BroadPhase => {
                stats.contacts = world.physics.step(dt, &mut ());
                for entity in world.entities.entities_mut() {
                    sync_transform(entity, &world.physics, ppm);
                }
                let mut ctx = CollisionContext::new(&mut world.commands, &mut world.events, &self.config);
                stats.broad_phase = self.registry.check_all_collisions(&mut world.entities, &mut ctx);
            }
        }
    }

    fn apply_commands(&mut self) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_COMMAND_ROUNDS {
            let batch = self.world.commands.take();
            if batch.is_empty() {
                return applied;
            }
            applied += batch.len();
            for command in batch {
                self.apply(command);
            }
        }
        if !self.world.commands.is_empty() {
            warn!(
                left = self.world.commands.len(),
                "commands still queued after {MAX_COMMAND_ROUNDS} rounds"
            );
        }
        applied
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Spawn(request) => {
                let entity = self.factory.build(&request, &mut self.world.physics);
                let id = self.world.entities.queue_spawn(entity);
                debug!(%id, kind = %request.kind(), "spawn queued");
            }
            Command::Despawn(target) => {
                if let Some(entity) = self.world.entities.get_mut(target) {
                    entity.set_active(false);
                }
            }
            Command::SetVelocity { target, velocity } => {
                if let Some(handle) = self.world.body_of(target) {
                    self.world.physics.set_velocity(handle, velocity);
                }
            }
            Command::ApplyImpulse { target, impulse } => {
                if let Some(handle) = self.world.body_of(target) {
                    self.world.physics.apply_impulse(handle, impulse);
                }
            }
            Command::ChangePlayerState { target, state } => {
                let mut ctx = self.world.state_context(target, &self.config);
                if let Err(err) = self.states.change_state(&mut ctx, state) {
                    trace!(%target, %err, "queued state change dropped");
                }
            }
        }
    }

    /// Requests a state change for `player` right away, outside a frame.
    ///
    /// # Errors
    ///
    /// [`TransitionError::NotAPlayer`] if `player` has no state, or the
    /// transition table's error when the simulation was built with
    /// [`Simulation::with_transition_table`].
    pub fn change_player_state(
        &mut self,
        player: EntityId,
        state: PlayerStateKind,
    ) -> Result<bool, TransitionError> {
        let mut ctx = self.world.state_context(player, &self.config);
        self.states.change_state(&mut ctx, state)
    }

    /// Current state of `player`.
    #[must_use]
    pub fn player_state(&self, player: EntityId) -> Option<PlayerStateKind> {
        self.world
            .entities
            .get(player)?
            .get_component::<PlayerStateComponent>()
            .map(|state| state.kind)
    }

    /// Active entities carrying a player state, in storage order.
    #[must_use]
    pub fn player_ids(&self) -> Vec<EntityId> {
        self.world
            .entities
            .entities()
            .filter(|e| e.is_active() && e.has_component::<PlayerStateComponent>())
            .map(|e| e.id())
            .collect()
    }

    /// Visible active entities, in storage order.
    pub fn render_items(&self) -> impl Iterator<Item = RenderItem<'_>> {
        self.world.entities.entities().filter_map(|entity| {
            if !entity.is_active() {
                return None;
            }
            let transform = entity.get_component::<Transform>()?;
            let render = entity
                .get_component::<RenderComponent>()
                .filter(|render| render.visible)?;
            Some(RenderItem {
                id: entity.id(),
                kind: entity.kind(),
                position: transform.position,
                size: transform.size,
                texture: &render.texture,
                tint: render.tint,
                flip_x: render.flip_x,
            })
        })
    }

    /// Pauses or resumes the simulation.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// `true` while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames run so far (paused frames excluded).
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Entity storage.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.world.entities
    }

    /// Mutable entity storage.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.world.entities
    }

    /// Physics world.
    #[must_use]
    pub fn physics(&self) -> &PhysicsWorld {
        &self.world.physics
    }

    /// Mutable physics world.
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world.physics
    }

    /// Collision registry.
    #[must_use]
    pub fn registry(&self) -> &CollisionRegistry {
        &self.registry
    }

    /// Mutable collision registry, for registering handlers between frames.
    pub fn registry_mut(&mut self) -> &mut CollisionRegistry {
        &mut self.registry
    }

    /// Event bus, for subscribing.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.world.events
    }

    /// Queues a command for the next frame.
    pub fn push_command(&mut self, command: Command) {
        self.world.commands.push(command);
    }
}

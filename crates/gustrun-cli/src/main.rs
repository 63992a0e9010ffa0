//! Headless Gustrun runner.
//!
//! Builds a short demo course, holds "right" with a periodic jump and shot,
//! and logs gameplay events until the goal is reached or the frame budget
//! runs out.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use gustrun_core::command::SpawnRequest;
use gustrun_core::components::{HealthComponent, ScoreComponent};
use gustrun_core::config::CollisionMode;
use gustrun_core::events::{
    CoinCollected, EnemyDefeated, GiftCollected, GoalReached, PlayerDamaged, StateChanged,
};
use gustrun_core::input::InputState;
use gustrun_core::player::PlayerStateKind;
use gustrun_core::{EntityId, GameConfig, Simulation};
use tracing::{debug, info, warn};

/// Top edge of the demo course's floor, in pixels.
const FLOOR_TOP: f32 = 416.0;

#[derive(Parser)]
#[command(name = "gustrun", about = "Run the Gustrun simulation headless")]
struct Args {
    /// JSON config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of fixed steps to run
    #[arg(short, long, default_value_t = 1800)]
    frames: u64,

    /// Override the config's random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Find collision pairs with the all-pairs overlap test instead of
    /// physics contacts
    #[arg(long)]
    broad_phase: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        seed = config.seed,
        mode = ?config.collision.mode,
        frames = args.frames,
        "starting run"
    );

    let mut sim = Simulation::new(config);
    let player = build_course(&mut sim);
    let finished = watch_events(&mut sim);

    let fixed_dt = sim.config().physics.fixed_dt;
    while sim.tick() < args.frames && !finished.get() {
        let stats = sim.step(drive(sim.tick()));
        if stats.reverted > 0 {
            debug!(tick = stats.tick, reverted = stats.reverted, "effects expired");
        }
        if sim.entities().get(player).is_none() {
            warn!(tick = stats.tick, "player left the world");
            break;
        }
    }

    report(&sim, player, fixed_dt);
    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.broad_phase {
        config.collision.mode = CollisionMode::BroadPhase;
    }
    config.validate().context("invalid config")?;
    Ok(config)
}

/// Lays out the demo course and returns the player.
fn build_course(sim: &mut Simulation) -> EntityId {
    sim.spawn(SpawnRequest::Ground {
        position: Vec2::new(1600.0, FLOOR_TOP + 32.0),
        size: Vec2::new(3200.0, 64.0),
    });
    let player = sim.spawn(SpawnRequest::Player {
        position: Vec2::new(64.0, FLOOR_TOP - 24.0),
    });

    for i in 0..12 {
        sim.spawn(SpawnRequest::Coin {
            position: Vec2::new(220.0 + i as f32 * 48.0, FLOOR_TOP - 20.0),
            value: 10,
        });
    }
    sim.spawn(SpawnRequest::Gift {
        position: Vec2::new(900.0, FLOOR_TOP - 24.0),
        effect: PlayerStateKind::Boosted,
    });
    sim.spawn(SpawnRequest::Obstacle {
        position: Vec2::new(1150.0, FLOOR_TOP - 24.0),
        size: Vec2::new(48.0, 48.0),
    });
    sim.spawn(SpawnRequest::Enemy {
        position: Vec2::new(1500.0, FLOOR_TOP - 16.0),
        patrol_left: 1400.0,
        patrol_right: 1650.0,
    });
    sim.spawn(SpawnRequest::Gift {
        position: Vec2::new(1800.0, FLOOR_TOP - 24.0),
        effect: PlayerStateKind::Magnetic,
    });
    for i in 0..8 {
        sim.spawn(SpawnRequest::Coin {
            position: Vec2::new(1900.0 + i as f32 * 40.0, FLOOR_TOP - 90.0),
            value: 10,
        });
    }
    sim.spawn(SpawnRequest::Spike {
        position: Vec2::new(2350.0, FLOOR_TOP - 8.0),
        size: Vec2::new(64.0, 16.0),
    });
    sim.spawn(SpawnRequest::Goal {
        position: Vec2::new(3000.0, FLOOR_TOP - 32.0),
    });
    player
}

/// Subscribes loggers to every gameplay event. The returned flag is set
/// once the goal is reached.
fn watch_events(sim: &mut Simulation) -> Rc<Cell<bool>> {
    let finished = Rc::new(Cell::new(false));
    let events = sim.events_mut();

    events.subscribe(|e: &CoinCollected| debug!(player = %e.player, value = e.value, "coin"));
    events.subscribe(|e: &GiftCollected| info!(player = %e.player, effect = %e.effect, "gift"));
    events.subscribe(|e: &StateChanged| {
        info!(player = %e.entity, old = %e.old, new = %e.new, "state changed");
    });
    events.subscribe(|e: &PlayerDamaged| {
        warn!(player = %e.player, remaining = e.remaining, "player hit");
    });
    events.subscribe(|e: &EnemyDefeated| info!(enemy = %e.enemy, by = %e.by, "enemy defeated"));

    let flag = Rc::clone(&finished);
    events.subscribe(move |e: &GoalReached| {
        info!(player = %e.player, "goal reached");
        flag.set(true);
    });
    finished
}

/// Scripted input: always run right, jump every 40 frames and fire every 25.
fn drive(tick: u64) -> InputState {
    let mut input = InputState::RIGHT;
    if tick % 40 == 0 {
        input |= InputState::JUMP;
    }
    if tick % 25 == 0 {
        input |= InputState::FIRE;
    }
    input
}

fn report(sim: &Simulation, player: EntityId, fixed_dt: f32) {
    let Some(entity) = sim.entities().get(player) else {
        return;
    };
    let score = entity
        .get_component::<ScoreComponent>()
        .copied()
        .unwrap_or_default();
    let health = entity
        .get_component::<HealthComponent>()
        .map_or(0, HealthComponent::current);
    #[allow(clippy::cast_precision_loss)]
    let seconds = sim.tick() as f32 * fixed_dt;
    info!(
        ticks = sim.tick(),
        seconds,
        points = score.points,
        coins = score.coins,
        health,
        state = ?sim.player_state(player),
        "run finished"
    );
}

//! Game configuration.
//!
//! [`GameConfig`] gathers every tunable the simulation reads: physics scale
//! and gravity, player movement, effect durations, scoring, enemy behavior
//! and the collision mode. Every section is `#[serde(default)]`, so a config
//! file only needs the fields it wants to override.
//!
//! # Units
//!
//! Positions and sizes stored on entities are in **pixels** with y growing
//! downwards. Speeds, impulses and gravity are in **meters** (per second)
//! because they feed the physics world directly. `physics.pixels_per_meter`
//! converts between the two.
//!
//! # Example
//!
//! ```
//! use gustrun_core::config::{CollisionMode, GameConfig};
//!
//! let config = GameConfig::from_json_str(r#"{ "seed": 7, "collision": { "mode": "broad_phase" } }"#)
//!     .expect("valid config");
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.collision.mode, CollisionMode::BroadPhase);
//! assert_eq!(config.player.max_health, 3);
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::player::PlayerStateKind;

/// Fixed simulation timestep (1/60 second).
pub const DEFAULT_FIXED_DT: f32 = 1.0 / 60.0;

/// Default pixels-per-meter scale between render space and physics space.
pub const DEFAULT_PIXELS_PER_METER: f32 = 32.0;

// =============================================================================
// Sections
// =============================================================================

/// Physics world parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity in m/s² (y-down, so positive y pulls bodies towards the floor).
    pub gravity: Vec2,
    /// Conversion factor from meters to pixels.
    pub pixels_per_meter: f32,
    /// Fixed timestep in seconds used by [`Simulation::step`](crate::simulation::Simulation::step).
    pub fixed_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 20.0),
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
            fixed_dt: DEFAULT_FIXED_DT,
        }
    }
}

/// Player movement and survivability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal run speed in m/s before any effect multiplier.
    pub base_speed: f32,
    /// Upward speed in m/s applied when jumping from the ground.
    pub jump_speed: f32,
    /// Hit points the player spawns with.
    pub max_health: u32,
    /// Seconds of invulnerability after taking a hit.
    pub hit_grace: f32,
    /// Projectile launch speed in m/s.
    pub projectile_speed: f32,
    /// Seconds a projectile lives before despawning.
    pub projectile_lifetime: f32,
    /// Damage dealt by one projectile.
    pub projectile_damage: u32,
    /// Minimum seconds between two shots.
    pub fire_cooldown: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            jump_speed: 11.0,
            max_health: 3,
            hit_grace: 1.0,
            projectile_speed: 14.0,
            projectile_lifetime: 1.5,
            projectile_damage: 1,
            fire_cooldown: 0.35,
        }
    }
}

/// Durations and strengths of the timed player effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Seconds the Boosted effect lasts.
    pub boosted_duration: f32,
    /// Seconds the Shielded effect lasts.
    pub shielded_duration: f32,
    /// Seconds the Magnetic effect lasts.
    pub magnetic_duration: f32,
    /// Seconds the Reversed effect lasts.
    pub reversed_duration: f32,
    /// Seconds the Headwind effect lasts.
    pub headwind_duration: f32,
    /// Speed multiplier while Boosted.
    pub boost_multiplier: f32,
    /// Speed multiplier while under Headwind.
    pub headwind_multiplier: f32,
    /// Linear damping applied to the player body while under Headwind.
    pub headwind_damping: f32,
    /// Radius in pixels within which Magnetic pulls collectibles.
    pub magnet_radius: f32,
    /// Speed in m/s at which pulled collectibles move toward the player.
    pub magnet_pull_speed: f32,
    /// Remaining seconds below which the effect tint starts flickering.
    pub flicker_threshold: f32,
    /// Seconds per flicker half-cycle.
    pub flicker_period: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            boosted_duration: 5.0,
            shielded_duration: 6.0,
            magnetic_duration: 8.0,
            reversed_duration: 5.0,
            headwind_duration: 5.0,
            boost_multiplier: 1.5,
            headwind_multiplier: 0.3,
            headwind_damping: 2.0,
            magnet_radius: 160.0,
            magnet_pull_speed: 8.0,
            flicker_threshold: 1.0,
            flicker_period: 0.1,
        }
    }
}

impl EffectsConfig {
    /// Returns the configured duration of `kind`, or `0.0` for
    /// [`PlayerStateKind::Normal`], which never expires.
    #[must_use]
    pub fn duration_of(&self, kind: PlayerStateKind) -> f32 {
        match kind {
            PlayerStateKind::Normal => 0.0,
            PlayerStateKind::Boosted => self.boosted_duration,
            PlayerStateKind::Shielded => self.shielded_duration,
            PlayerStateKind::Magnetic => self.magnetic_duration,
            PlayerStateKind::Reversed => self.reversed_duration,
            PlayerStateKind::Headwind => self.headwind_duration,
        }
    }
}

/// Points and impulses awarded by gameplay collisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Default value of a coin that carries no explicit value.
    pub coin_value: u32,
    /// Points for defeating an enemy by stomping or while shielded.
    pub stomp_bonus: u32,
    /// Value of the coin an enemy drops when shot down.
    pub enemy_drop_value: u32,
    /// Upward impulse in m/s given to the player after a stomp.
    pub stomp_bounce: f32,
    /// Impulse in m/s pushing the player away from an enemy that hurt them.
    pub knockback: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coin_value: 10,
            stomp_bonus: 50,
            enemy_drop_value: 25,
            stomp_bounce: 8.0,
            knockback: 6.0,
        }
    }
}

/// Enemy behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Patrol speed in m/s.
    pub patrol_speed: f32,
    /// Chance per second that a grounded enemy hops.
    pub hop_chance: f32,
    /// Upward speed in m/s of a hop.
    pub hop_speed: f32,
    /// Hit points of a freshly spawned enemy.
    pub health: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.0,
            hop_chance: 0.2,
            hop_speed: 7.0,
            health: 2,
        }
    }
}

/// Where collision pairs come from each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Pairs come from physics contact begin/end events via the contact bridge.
    #[default]
    PhysicsContacts,
    /// Pairs come from an all-pairs overlap test over entity transforms.
    BroadPhase,
}

/// Collision dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Source of collision pairs.
    pub mode: CollisionMode,
}

// =============================================================================
// GameConfig
// =============================================================================

/// Complete configuration for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Physics world parameters.
    pub physics: PhysicsConfig,
    /// Player movement and survivability.
    pub player: PlayerConfig,
    /// Timed effect parameters.
    pub effects: EffectsConfig,
    /// Scoring and impulses.
    pub scoring: ScoringConfig,
    /// Enemy behavior.
    pub enemy: EnemyConfig,
    /// Collision dispatch settings.
    pub collision: CollisionConfig,
    /// Seed for every random decision in the simulation.
    pub seed: u64,
}

impl GameConfig {
    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`GameConfig::validate`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`GameConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), seed = config.seed, "loaded game config");
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("physics.fixed_dt", self.physics.fixed_dt)?;
        positive("physics.pixels_per_meter", self.physics.pixels_per_meter)?;
        non_negative("player.base_speed", self.player.base_speed)?;
        non_negative("player.jump_speed", self.player.jump_speed)?;
        if self.player.max_health == 0 {
            return Err(ConfigError::invalid("player.max_health", "must be at least 1"));
        }
        non_negative("player.hit_grace", self.player.hit_grace)?;
        positive("player.projectile_lifetime", self.player.projectile_lifetime)?;
        non_negative("player.fire_cooldown", self.player.fire_cooldown)?;
        non_negative("effects.boost_multiplier", self.effects.boost_multiplier)?;
        non_negative("effects.headwind_multiplier", self.effects.headwind_multiplier)?;
        non_negative("effects.headwind_damping", self.effects.headwind_damping)?;
        non_negative("effects.magnet_radius", self.effects.magnet_radius)?;
        positive("effects.flicker_period", self.effects.flicker_period)?;
        if !(0.0..=1.0).contains(&self.enemy.hop_chance) {
            return Err(ConfigError::invalid(
                "enemy.hop_chance",
                format!("must be within [0, 1], got {}", self.enemy.hop_chance),
            ));
        }
        if !self.physics.gravity.is_finite() {
            return Err(ConfigError::invalid("physics.gravity", "must be finite"));
        }
        Ok(())
    }

    /// Converts a length in pixels to meters.
    #[must_use]
    pub fn to_meters(&self, pixels: f32) -> f32 {
        pixels / self.physics.pixels_per_meter
    }

    /// Converts a length in meters to pixels.
    #[must_use]
    pub fn to_pixels(&self, meters: f32) -> f32 {
        meters * self.physics.pixels_per_meter
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be non-negative, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "effects": { "boosted_duration": 2.5 } }"#).unwrap();
        assert!((config.effects.boosted_duration - 2.5).abs() < f32::EPSILON);
        assert!((config.effects.headwind_multiplier - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let err = GameConfig::from_json_str(r#"{ "physics": { "fixed_dt": 0.0 } }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "physics.fixed_dt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hop_chance_out_of_range_is_rejected() {
        let err = GameConfig::from_json_str(r#"{ "enemy": { "hop_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "enemy.hop_chance", .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GameConfig::load("/definitely/not/here/gustrun.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut config = GameConfig::default();
        config.seed = 99;
        config.collision.mode = CollisionMode::BroadPhase;
        let text = config.to_json_string().unwrap();
        assert_eq!(GameConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn duration_of_normal_is_zero() {
        let effects = EffectsConfig::default();
        assert!(effects.duration_of(PlayerStateKind::Normal).abs() < f32::EPSILON);
        assert!((effects.duration_of(PlayerStateKind::Shielded) - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pixel_meter_conversion_uses_scale() {
        let config = GameConfig::default();
        assert!((config.to_meters(64.0) - 2.0).abs() < f32::EPSILON);
        assert!((config.to_pixels(0.5) - 16.0).abs() < f32::EPSILON);
    }
}

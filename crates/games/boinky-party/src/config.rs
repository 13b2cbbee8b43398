use serde::{Deserialize, Serialize};

use boinky_core::time::Millis;

/// Side length of one world tile.
pub const TILE_SIZE: f32 = 16.0;
/// Default world width.
pub const WORLD_WIDTH: f32 = 8000.0;
/// Default world height.
pub const WORLD_HEIGHT: f32 = 4800.0;

/// Player kinematics parameters (per-frame units).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub base_speed: f32,
    pub base_jump_power: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub max_jumps: u8,
    /// Horizontal velocity multiplier applied once per frame.
    pub friction: f32,
    /// How far past a platform edge the previous-frame leading edge may
    /// already be for a landing or wall stop to count.
    pub land_tolerance: f32,
    pub boost_multiplier: f32,
    /// Velocity magnitude above which a player counts as moving.
    pub moving_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            base_speed: 5.0,
            base_jump_power: 12.0,
            player_width: 40.0,
            player_height: 40.0,
            max_jumps: 2,
            friction: 0.85,
            land_tolerance: 10.0,
            boost_multiplier: 1.5,
            moving_threshold: 0.1,
        }
    }
}

/// Durations in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub boost_ms: Millis,
    pub tag_immunity_ms: Millis,
    pub invincibility_ms: Millis,
    pub particle_cadence_ms: Millis,
    pub animation_cadence_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            boost_ms: 8000,
            tag_immunity_ms: 2000,
            invincibility_ms: 1500,
            particle_cadence_ms: 50,
            animation_cadence_ms: 150,
        }
    }
}

/// Camera framing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub padding: f32,
    /// Smallest player spread used for zoom, avoids spikes when players overlap.
    pub min_spread: f32,
    /// Fraction of the remaining distance covered per frame.
    pub smoothing: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Center distance at which co-op split-screen turns on.
    pub split_enter_distance: f32,
    /// Center distance below which split-screen turns back off.
    pub split_exit_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            padding: 200.0,
            min_spread: 80.0,
            smoothing: 0.1,
            min_zoom: 0.1,
            max_zoom: 1.5,
            split_enter_distance: 500.0,
            split_exit_distance: 400.0,
        }
    }
}

/// Mode rules and entity constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub round_duration_secs: u64,
    pub max_lives: u8,
    pub stomp_bounce: f32,
    pub stomp_tolerance: f32,
    pub bounce_power: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: 60,
            max_lives: 3,
            stomp_bounce: 8.0,
            stomp_tolerance: 10.0,
            bounce_power: 33.0,
        }
    }
}

/// Default world geometry for built-in levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub camera: CameraConfig,
    pub rules: RulesConfig,
    pub world: WorldConfig,
}

impl GameConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path =
            std::env::var("BOINKY_CONFIG").unwrap_or_else(|_| "config/boinky.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_or_default(&content, &path),
            Err(_) => GameConfig::default(),
        }
    }

    fn from_toml_or_default(content: &str, origin: &str) -> Self {
        match toml::from_str::<GameConfig>(content) {
            Ok(cfg) => {
                tracing::info!(path = origin, "Loaded game config");
                cfg
            },
            Err(e) => {
                tracing::warn!("Failed to parse {origin}: {e}, using defaults");
                GameConfig::default()
            },
        }
    }
}

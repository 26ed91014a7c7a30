//! Simulation settings
//!
//! Everything the host supplies at world construction: viewport size, RNG
//! seed, entity sizes, timings and level progression. Defaults are tuned for
//! a 1536x2048 portrait viewport.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::level::{LevelProgression, LevelTable};

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Viewport size in world units (width, height)
    pub viewport: Vec2,
    /// Lives at game start
    pub starting_lives: i32,

    // === Sizes ===
    pub player_size: Vec2,
    pub bullet_size: Vec2,
    pub enemy_size: Vec2,
    pub explosion_size: Vec2,

    // === Timing (seconds) ===
    pub player_entry_secs: f32,
    pub bullet_flight_secs: f32,
    pub enemy_flight_secs: f32,
    pub explosion_ttl_secs: f32,
    pub game_over_delay_secs: f32,

    // === Progression ===
    /// Spawn interval per level, non-increasing
    pub level_table: LevelTable,
    /// Scores that each grant one level, ascending
    pub level_up_scores: Vec<u64>,

    // === Rules ===
    /// Enemies that fly off the bottom edge cost a life
    pub escaped_enemy_costs_life: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5010_4155,
            viewport: Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            starting_lives: STARTING_LIVES,

            player_size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            bullet_size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            enemy_size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            explosion_size: Vec2::splat(EXPLOSION_SIZE),

            player_entry_secs: PLAYER_ENTRY_SECS,
            bullet_flight_secs: BULLET_FLIGHT_SECS,
            enemy_flight_secs: ENEMY_FLIGHT_SECS,
            explosion_ttl_secs: EXPLOSION_TTL_SECS,
            game_over_delay_secs: GAME_OVER_DELAY_SECS,

            level_table: LevelTable::default(),
            level_up_scores: LEVEL_UP_SCORES.to_vec(),

            escaped_enemy_costs_life: false,
        }
    }
}

impl Settings {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Level progression rules built from these settings
    pub fn progression(&self) -> LevelProgression {
        LevelProgression::new(self.level_table.clone(), self.level_up_scores.clone())
    }

    /// Check that the settings describe a playable world
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport.x > 0.0 && self.viewport.y > 0.0) {
            return Err(invalid(format!("viewport must be positive, got {}", self.viewport)));
        }
        if self.starting_lives <= 0 {
            return Err(invalid(format!(
                "starting_lives must be positive, got {}",
                self.starting_lives
            )));
        }

        let sizes = [
            ("player_size", self.player_size),
            ("bullet_size", self.bullet_size),
            ("enemy_size", self.enemy_size),
            ("explosion_size", self.explosion_size),
        ];
        for (name, size) in sizes {
            if !(size.x > 0.0 && size.y > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {size}")));
            }
        }

        let play_width = self.viewport.x - 2.0 * crate::play_area_margin(self.viewport);
        if self.player_size.x > play_width {
            return Err(invalid(format!(
                "player width {} does not fit the play area width {play_width}",
                self.player_size.x
            )));
        }

        let durations = [
            ("player_entry_secs", self.player_entry_secs),
            ("bullet_flight_secs", self.bullet_flight_secs),
            ("enemy_flight_secs", self.enemy_flight_secs),
            ("explosion_ttl_secs", self.explosion_ttl_secs),
        ];
        for (name, secs) in durations {
            if !(secs > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {secs}")));
            }
        }
        if !(self.game_over_delay_secs >= 0.0) {
            return Err(invalid(format!(
                "game_over_delay_secs must not be negative, got {}",
                self.game_over_delay_secs
            )));
        }

        self.level_table.validate().map_err(invalid)?;

        if self.level_up_scores.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(format!(
                "level_up_scores must be strictly ascending, got {:?}",
                self.level_up_scores
            )));
        }
        if self.level_up_scores.first() == Some(&0) {
            return Err(invalid("level_up_scores must not contain 0".to_string()));
        }

        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid(reason)
}

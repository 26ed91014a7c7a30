//! Solo Mission - simulation core for a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, game state)
//! - `settings`: Data-driven tuning and viewport configuration
//! - `error`: Configuration errors
//!
//! Rendering, audio and high-score storage live outside this crate. They
//! drive the simulation with [`sim::Command`]s and react to [`sim::GameEvent`]s.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Most enemies one tick may spawn to catch up a late schedule
    pub const MAX_SPAWN_CATCH_UP: u32 = 8;

    /// Reference viewport (portrait)
    pub const VIEWPORT_WIDTH: f32 = 1536.0;
    pub const VIEWPORT_HEIGHT: f32 = 2048.0;
    /// Widest aspect ratio (height / width) the play area may have
    pub const MAX_ASPECT_RATIO: f32 = 16.0 / 9.0;

    /// Player defaults
    pub const STARTING_LIVES: i32 = 10;
    pub const PLAYER_WIDTH: f32 = 150.0;
    pub const PLAYER_HEIGHT: f32 = 180.0;
    /// Resting height of the player as a fraction of the viewport height
    pub const PLAYER_REST_FRACTION: f32 = 0.1;
    /// Glide from below the screen into play position
    pub const PLAYER_ENTRY_SECS: f32 = 0.5;

    /// Bullet defaults
    pub const BULLET_WIDTH: f32 = 20.0;
    pub const BULLET_HEIGHT: f32 = 60.0;
    /// Time for a bullet to travel from the player to just past the top edge
    pub const BULLET_FLIGHT_SECS: f32 = 1.0;

    /// Enemy defaults
    pub const ENEMY_WIDTH: f32 = 170.0;
    pub const ENEMY_HEIGHT: f32 = 140.0;
    pub const ENEMY_FLIGHT_SECS: f32 = 4.0;
    /// Enemies enter at this multiple of the viewport height...
    pub const ENEMY_SPAWN_HEIGHT_FACTOR: f32 = 2.0;
    /// ...and leave at this (negative) multiple
    pub const ENEMY_EXIT_HEIGHT_FACTOR: f32 = -0.2;

    /// Explosion defaults (0.1s scale-in + 0.1s fade-out)
    pub const EXPLOSION_SIZE: f32 = 200.0;
    pub const EXPLOSION_TTL_SECS: f32 = 0.2;

    /// Delay between game over and the results screen
    pub const GAME_OVER_DELAY_SECS: f32 = 1.0;

    /// Spawn interval per level (index 0 = level 1)
    pub const LEVEL_SPAWN_INTERVALS: [f32; 4] = [1.2, 1.0, 0.8, 0.5];
    /// Scores that trigger a level-up
    pub const LEVEL_UP_SCORES: [u64; 3] = [10, 20, 30];
}

/// Horizontal margin on each side of the play area for a given viewport.
///
/// The play area keeps at most a 16:9 (height:width) aspect. Viewports that
/// are already narrower than that get no margin.
#[inline]
pub fn play_area_margin(viewport: Vec2) -> f32 {
    let playable_width = viewport.y / consts::MAX_ASPECT_RATIO;
    ((viewport.x - playable_width) / 2.0).max(0.0)
}

/// Heading (radians) of travel from `from` toward `to`
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

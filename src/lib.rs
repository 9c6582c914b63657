//! Devil Levels - dodge the falling devils
//!
//! Core modules:
//! - `sim`: Simulation (player, devils, spawning, collisions, level state machine)
//! - `renderer`: Draw surface abstraction and scene drawing
//! - `platform`: Input state, frame clock and tick scheduling
//! - `bridge`: Presentation notifications and the highscore service contract
//! - `driver`: Frame loop wiring the simulation to its collaborators
//! - `tuning`: Data-driven game balance
//! - `server`: Native highscore API server

pub mod bridge;
pub mod driver;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::HighScoreError;
pub use highscores::{HighScoreEntry, HighScores};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Reference frame duration in milliseconds (elapsed == 1.0 at this rate)
    pub const REFERENCE_FRAME_MS: f32 = 16.666;

    /// Default drawing surface size (canvas pixels)
    pub const DEFAULT_SURFACE_WIDTH: f32 = 480.0;
    pub const DEFAULT_SURFACE_HEIGHT: f32 = 640.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 48.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Gap between the player's bottom edge and the surface bottom
    pub const PLAYER_BOTTOM_MARGIN: f32 = 10.0;

    /// Spawn interval (ms) at level 1
    pub const BASE_SPAWN_INTERVAL_MS: f32 = 1200.0;
    /// Interval reduction per level (ms)
    pub const SPAWN_INTERVAL_STEP_MS: f32 = 100.0;
    /// Spawn interval never drops below this (ms)
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 350.0;

    /// Devils appear this far above the visible surface
    pub const DEVIL_SPAWN_Y: f32 = -40.0;
    /// Horizontal spawn keep-out from each surface edge
    pub const DEVIL_SPAWN_MARGIN: f32 = 20.0;
    pub const DEVIL_MIN_SIZE: f32 = 18.0;
    pub const DEVIL_SIZE_RANGE: f32 = 18.0;
    /// Devil speed = base + level * per_level + random * level * jitter
    pub const DEVIL_BASE_SPEED: f32 = 1.0;
    pub const DEVIL_SPEED_PER_LEVEL: f32 = 0.5;
    pub const DEVIL_SPEED_JITTER: f32 = 0.6;
    /// Devils are culled once they pass this far below the surface
    pub const CULL_MARGIN: f32 = 50.0;

    /// Scoring
    pub const POINTS_PER_DEVIL: u32 = 10;
    /// Level N is cleared once score >= N * SCORE_PER_LEVEL
    pub const SCORE_PER_LEVEL: u32 = 200;
    pub const STARTING_LIVES: i32 = 3;

    /// Minimum touch travel (px) before a swipe registers
    pub const SWIPE_THRESHOLD: f32 = 10.0;

    /// Entries shown on the leaderboard
    pub const LEADERBOARD_SIZE: usize = 10;
}

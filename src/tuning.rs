//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override it
//! with a JSON document. Missing fields fall back to the defaults in
//! [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Surface ===
    pub surface_width: f32,
    pub surface_height: f32,

    // === Clock ===
    /// Frame duration that maps to an elapsed of 1.0
    pub reference_frame_ms: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub player_bottom_margin: f32,

    // === Spawning ===
    pub base_spawn_interval_ms: f32,
    pub spawn_interval_step_ms: f32,
    pub min_spawn_interval_ms: f32,

    // === Devils ===
    pub devil_spawn_y: f32,
    pub devil_spawn_margin: f32,
    pub devil_min_size: f32,
    pub devil_size_range: f32,
    pub devil_base_speed: f32,
    pub devil_speed_per_level: f32,
    pub devil_speed_jitter: f32,
    pub cull_margin: f32,

    // === Scoring ===
    pub points_per_devil: u32,
    pub score_per_level: u32,
    pub starting_lives: i32,

    // === Input ===
    pub swipe_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,

            reference_frame_ms: REFERENCE_FRAME_MS,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_speed: PLAYER_SPEED,
            player_bottom_margin: PLAYER_BOTTOM_MARGIN,

            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,

            devil_spawn_y: DEVIL_SPAWN_Y,
            devil_spawn_margin: DEVIL_SPAWN_MARGIN,
            devil_min_size: DEVIL_MIN_SIZE,
            devil_size_range: DEVIL_SIZE_RANGE,
            devil_base_speed: DEVIL_BASE_SPEED,
            devil_speed_per_level: DEVIL_SPEED_PER_LEVEL,
            devil_speed_jitter: DEVIL_SPEED_JITTER,
            cull_margin: CULL_MARGIN,

            points_per_devil: POINTS_PER_DEVIL,
            score_per_level: SCORE_PER_LEVEL,
            starting_lives: STARTING_LIVES,

            swipe_threshold: SWIPE_THRESHOLD,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults with an optional override document applied
    ///
    /// A malformed document is logged and ignored.
    pub fn from_overrides(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            None => Self::default(),
            Some(Ok(tuning)) => {
                log::info!("Using tuning overrides");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring invalid tuning overrides: {}", e);
                Self::default()
            }
        }
    }

    /// Same tuning, resized to the given drawing surface
    pub fn with_surface(mut self, width: f32, height: f32) -> Self {
        self.surface_width = width;
        self.surface_height = height;
        self
    }

    /// Spawn interval in milliseconds for a level (1-based)
    ///
    /// Shrinks by a fixed step per level and is floored at the minimum.
    pub fn spawn_interval(&self, level: u32) -> f32 {
        let reduction = level.saturating_sub(1) as f32 * self.spawn_interval_step_ms;
        (self.base_spawn_interval_ms - reduction).max(self.min_spawn_interval_ms)
    }

    /// Score needed to clear the given level
    pub fn level_goal(&self, level: u32) -> u32 {
        level.saturating_mul(self.score_per_level)
    }
}

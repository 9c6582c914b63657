//! Game state and core simulation types
//!
//! The [`Simulation`] exclusively owns the player, the falling devils and the
//! run counters. Outside code only sees them through shared borrows (drawing)
//! or by value (events).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::platform::MoveIntent;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No active run, waiting for start
    Idle,
    /// Ticking
    Running,
    /// Level goal reached, waiting for continue
    LevelCleared,
    /// Out of lives, waiting for restart
    GameOver,
}

/// Discrete notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u32),
    LevelChanged(u32),
    LivesChanged(i32),
    /// Level goal reached; `new_level` is the level that comes next
    LevelCleared { new_level: u32 },
    GameOver { final_score: u32 },
}

/// Heads-up display values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub level: u32,
    pub lives: i32,
}

/// The player's avatar, sliding along the bottom of the surface
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal speed (px per reference frame)
    pub speed: f32,
}

impl Player {
    /// Player centred horizontally near the bottom edge
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                tuning.surface_width / 2.0 - tuning.player_width / 2.0,
                tuning.surface_height - tuning.player_height - tuning.player_bottom_margin,
            ),
            width: tuning.player_width,
            height: tuning.player_height,
            speed: tuning.player_speed,
        }
    }

    /// Apply movement intent, then clamp into `[0, surface_width - width]`
    ///
    /// Left and right are separate offsets, so holding both stands still.
    pub fn update(&mut self, intent: MoveIntent, elapsed: f32, surface_width: f32) {
        if intent.left {
            self.pos.x -= self.speed * elapsed;
        }
        if intent.right {
            self.pos.x += self.speed * elapsed;
        }
        self.pos.x = self.pos.x.min(surface_width - self.width).max(0.0);
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A falling devil
#[derive(Debug, Clone, PartialEq)]
pub struct Devil {
    /// Centre of the devil
    pub pos: Vec2,
    /// Downward speed (px per reference frame)
    pub speed: f32,
    /// Horizontal radius; also the collision half-extent
    pub size: f32,
}

impl Devil {
    pub fn new(x: f32, y: f32, speed: f32, size: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            speed,
            size,
        }
    }

    /// Roll a new devil above the surface, scaled to the level
    ///
    /// Both mean speed and speed variance grow linearly with level.
    pub fn spawn(rng: &mut Pcg32, tuning: &Tuning, level: u32) -> Self {
        let margin = tuning.devil_spawn_margin;
        let level = level as f32;
        let x = rng.random::<f32>() * (tuning.surface_width - 2.0 * margin) + margin;
        let speed = tuning.devil_base_speed
            + level * tuning.devil_speed_per_level
            + rng.random::<f32>() * level * tuning.devil_speed_jitter;
        let size = tuning.devil_min_size + rng.random::<f32>() * tuning.devil_size_range;
        Self::new(x, tuning.devil_spawn_y, speed, size)
    }

    /// Fall; x never changes after spawn
    #[inline]
    pub fn update(&mut self, elapsed: f32) {
        self.pos.y += self.speed * elapsed;
    }
}

/// Complete game simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Balance knobs and surface size
    pub tuning: Tuning,
    /// Current phase
    pub phase: GamePhase,
    /// Current level (1-based)
    pub level: u32,
    pub score: u32,
    /// Remaining lives; reaching zero ends the run
    pub lives: i32,
    /// Milliseconds since the last spawn
    pub spawn_accumulator: f32,
    pub player: Player,
    /// Active devils (order irrelevant)
    pub devils: Vec<Devil>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl Simulation {
    /// Create an idle simulation with the given RNG seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            level: 1,
            score: 0,
            lives: tuning.starting_lives,
            spawn_accumulator: 0.0,
            player: Player::new(&tuning),
            devils: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            tuning,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            level: self.level,
            lives: self.lives,
        }
    }

    /// Begin a fresh run. Only valid while idle.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.level = 1;
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.spawn_accumulator = 0.0;
        self.devils.clear();
        self.player = Player::new(&self.tuning);
        self.phase = GamePhase::Running;
        self.push_hud();
        log::info!("Run started");
        true
    }

    /// Resume at the next level. Only valid after a level clear.
    pub fn continue_level(&mut self) -> bool {
        if self.phase != GamePhase::LevelCleared {
            return false;
        }
        self.devils.clear();
        self.spawn_accumulator = 0.0;
        self.phase = GamePhase::Running;
        log::info!("Level {} started", self.level);
        true
    }

    /// Back to idle after a game over
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.discard_run();
        true
    }

    /// Abandon a paused run (level cleared or game over) and go idle
    pub fn reset(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::LevelCleared | GamePhase::GameOver) {
            return false;
        }
        self.discard_run();
        true
    }

    /// Replace all run state with a fresh idle simulation
    fn discard_run(&mut self) {
        let seed = self.rng.random::<u64>();
        *self = Simulation::new(self.tuning.clone(), seed);
        self.push_hud();
    }

    /// Add a devil for the current level
    pub fn spawn_devil(&mut self) {
        let devil = Devil::spawn(&mut self.rng, &self.tuning, self.level);
        log::debug!(
            "Devil spawned at x={:.0} speed={:.2} size={:.1}",
            devil.pos.x,
            devil.speed,
            devil.size
        );
        self.devils.push(devil);
    }

    /// Take the notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_hud(&mut self) {
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.events.push(GameEvent::LevelChanged(self.level));
        self.events.push(GameEvent::LivesChanged(self.lives));
    }
}

//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - Time arrives as a normalized elapsed value
//! - Seeded RNG only
//! - Input arrives as a `MoveIntent` snapshot

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::devil_hits_player;
pub use state::{Devil, GameEvent, GamePhase, Hud, Player, Simulation};
pub use tick::tick;

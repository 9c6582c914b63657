//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks (frame clock and tick scheduling)
//! - Input events (keys and touch swipes reduced to movement intent)

pub mod clock;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{FrameClock, ManualScheduler, TickCallback, TickHandle, TickScheduler};
pub use input::{ControlsHint, InputState, MoveIntent};

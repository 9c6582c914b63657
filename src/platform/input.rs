//! Movement intent from keyboard and touch
//!
//! Input handlers write into [`InputState`] through explicit setters; the
//! simulation only ever sees the reduced [`MoveIntent`].

use serde::{Deserialize, Serialize};

use crate::consts::SWIPE_THRESHOLD;

/// Movement intent for a single tick
///
/// Left and right are independent: holding both cancels out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub const NONE: Self = Self {
        left: false,
        right: false,
    };
    pub const LEFT: Self = Self {
        left: true,
        right: false,
    };
    pub const RIGHT: Self = Self {
        left: false,
        right: true,
    };
    pub const BOTH: Self = Self {
        left: true,
        right: true,
    };
}

/// Keys that steer the player, named as `KeyboardEvent.key` reports them
#[derive(Debug, Clone, Default)]
struct HeldKeys {
    arrow_left: bool,
    arrow_right: bool,
    a: bool,
    d: bool,
}

impl HeldKeys {
    fn slot(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "ArrowLeft" => Some(&mut self.arrow_left),
            "ArrowRight" => Some(&mut self.arrow_right),
            "a" => Some(&mut self.a),
            "d" => Some(&mut self.d),
            _ => None,
        }
    }
}

/// Swipe direction tracking for a single touch
#[derive(Debug, Clone, Default)]
struct Swipe {
    start_x: f32,
    current_x: f32,
    left: bool,
    right: bool,
}

/// Aggregated input from every source
#[derive(Debug, Clone)]
pub struct InputState {
    keys: HeldKeys,
    swipe: Swipe,
    swipe_threshold: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl InputState {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            keys: HeldKeys::default(),
            swipe: Swipe::default(),
            swipe_threshold,
        }
    }

    /// Record a key press. Unknown keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        if let Some(held) = self.keys.slot(key) {
            *held = true;
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(held) = self.keys.slot(key) {
            *held = false;
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        self.swipe.start_x = x;
        self.swipe.current_x = x;
    }

    /// Update swipe direction once the finger has travelled past the threshold
    pub fn touch_move(&mut self, x: f32) {
        self.swipe.current_x = x;
        let distance = self.swipe.current_x - self.swipe.start_x;
        if distance.abs() > self.swipe_threshold {
            self.swipe.left = distance < 0.0;
            self.swipe.right = distance > 0.0;
        }
    }

    pub fn touch_end(&mut self) {
        self.swipe = Swipe::default();
    }

    /// Release everything (e.g. when the page loses focus)
    pub fn clear(&mut self) {
        self.keys = HeldKeys::default();
        self.swipe = Swipe::default();
    }

    pub fn move_left(&self) -> bool {
        self.keys.arrow_left || self.keys.a || self.swipe.left
    }

    pub fn move_right(&self) -> bool {
        self.keys.arrow_right || self.keys.d || self.swipe.right
    }

    /// Snapshot for the current tick
    pub fn intent(&self) -> MoveIntent {
        MoveIntent {
            left: self.move_left(),
            right: self.move_right(),
        }
    }
}

/// Which control instructions the page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlsHint {
    #[default]
    Keyboard,
    Touch,
}

/// User agent fragments that identify a mobile browser
const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Viewports narrower than this get touch hints
const MOBILE_MAX_WIDTH: f64 = 768.0;

impl ControlsHint {
    /// Pick hints from the browser's user agent and viewport width
    pub fn detect(user_agent: &str, viewport_width: f64) -> Self {
        let agent = user_agent.to_lowercase();
        let mobile_agent = MOBILE_AGENTS.iter().any(|m| agent.contains(m));
        if mobile_agent || viewport_width < MOBILE_MAX_WIDTH {
            ControlsHint::Touch
        } else {
            ControlsHint::Keyboard
        }
    }
}

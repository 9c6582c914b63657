//! Frame clock and tick scheduling
//!
//! The simulation advances in display-frame ticks. Instead of calling the
//! host's frame API directly, the driver goes through [`TickScheduler`] so a
//! browser `requestAnimationFrame` and a hand-driven test clock are
//! interchangeable.

use std::cell::RefCell;

use crate::consts::REFERENCE_FRAME_MS;

/// Callback invoked with the frame timestamp (ms)
pub type TickCallback = Box<dyn FnOnce(f64)>;

/// Identifies a pending tick request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Source of display frames
pub trait TickScheduler {
    /// Current timestamp in milliseconds
    fn now(&self) -> f64;

    /// Run `callback` once, at the next frame
    ///
    /// `None` means the host refused the request and the callback is dropped.
    fn request_tick(&self, callback: TickCallback) -> Option<TickHandle>;

    /// Drop a pending request. Unknown or already-fired handles are ignored.
    fn cancel_tick(&self, handle: TickHandle);
}

/// Converts frame timestamps into normalized elapsed values
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_time: f64,
    reference_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(REFERENCE_FRAME_MS)
    }
}

impl FrameClock {
    pub fn new(reference_ms: f32) -> Self {
        Self {
            last_time: 0.0,
            reference_ms: reference_ms as f64,
        }
    }

    /// Start measuring from `now` (loop start or resume)
    pub fn restart(&mut self, now: f64) {
        self.last_time = now;
    }

    /// Elapsed since the previous frame, in reference frames
    pub fn elapsed(&mut self, now: f64) -> f32 {
        let delta = now - self.last_time;
        self.last_time = now;
        (delta / self.reference_ms) as f32
    }
}

#[derive(Default)]
struct ManualState {
    now: f64,
    next_id: u64,
    pending: Vec<(TickHandle, TickCallback)>,
}

/// Hand-driven scheduler for tests and headless runs
///
/// Frames only happen when [`ManualScheduler::advance`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    pub fn new(start_ms: f64) -> Self {
        Self {
            state: RefCell::new(ManualState {
                now: start_ms,
                ..Default::default()
            }),
        }
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Move the clock forward by `ms` and fire one frame.
    ///
    /// Callbacks requested while the frame runs wait for the next call.
    /// Returns how many callbacks fired.
    pub fn advance(&self, ms: f64) -> usize {
        let (now, due) = {
            let mut state = self.state.borrow_mut();
            state.now += ms;
            (state.now, std::mem::take(&mut state.pending))
        };
        let fired = due.len();
        for (_, callback) in due {
            callback(now);
        }
        fired
    }
}

impl TickScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn request_tick(&self, callback: TickCallback) -> Option<TickHandle> {
        let mut state = self.state.borrow_mut();
        let handle = TickHandle(state.next_id);
        state.next_id += 1;
        state.pending.push((handle, callback));
        Some(handle)
    }

    fn cancel_tick(&self, handle: TickHandle) {
        self.state.borrow_mut().pending.retain(|(h, _)| *h != handle);
    }
}

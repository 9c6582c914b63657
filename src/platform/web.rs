//! Browser frame scheduling via `requestAnimationFrame`

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use super::clock::{TickCallback, TickHandle, TickScheduler};

/// Ticks aligned to the browser's display refresh
pub struct RafScheduler {
    window: web_sys::Window,
}

impl RafScheduler {
    pub fn new() -> Option<Self> {
        Some(Self {
            window: web_sys::window()?,
        })
    }
}

impl TickScheduler for RafScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_tick(&self, callback: TickCallback) -> Option<TickHandle> {
        // Freed by wasm-bindgen after its single invocation
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        match self
            .window
            .request_animation_frame(closure.unchecked_ref())
        {
            Ok(id) => Some(TickHandle(id as u64)),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_tick(&self, handle: TickHandle) {
        let _ = self.window.cancel_animation_frame(handle.0 as i32);
    }
}

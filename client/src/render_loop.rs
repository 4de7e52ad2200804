use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Drives a frame callback through `requestAnimationFrame`.
///
/// `wake()` requests a frame; repeated wakes before the frame fires collapse
/// into one. The frame callback receives the rAF timestamp and returns `true`
/// while it still has work (an easing counter, drifting particles), in which
/// case the next frame is requested automatically.
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    pending: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Inner {
    fn request(&self) {
        if self.pending.get() {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let cb_ref = self.callback.borrow();
        let Some(cb) = cb_ref.as_ref() else {
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.pending.set(true);
                self.raf_id.set(Some(id));
            }
            Err(_) => self.pending.set(false),
        }
    }
}

impl FrameScheduler {
    pub fn new(mut frame_fn: impl FnMut(f64) -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            pending: Cell::new(false),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        // Weak so the closure stored inside `inner` does not keep `inner` alive.
        let weak = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(false);
            inner.raf_id.set(None);
            if frame_fn(timestamp) {
                inner.request();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    pub fn wake(&self) {
        self.inner.request();
    }

    /// Drop any pending frame. A later `wake()` starts the loop again.
    pub fn cancel(&self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.inner.pending.set(false);
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.cancel();
        self.inner.callback.borrow_mut().take();
    }
}

use std::cell::RefCell;

use podium_shared::Period;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

struct HashChangeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static HASH_CHANGE_BINDING: RefCell<Option<HashChangeBinding>> = const { RefCell::new(None) };
}

/// Period currently selected by the URL fragment. Absent or unknown fragments are daily.
pub fn current_period() -> Period {
    let hash = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    Period::from_fragment(&hash)
}

/// Select a period by rewriting the fragment. The `hashchange` listener does the rest.
pub fn select_period(period: Period) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_hash(period.as_str()) {
        web_sys::console::warn_1(&format!("Failed to set period fragment: {e:?}").into());
    }
}

/// Install the single `hashchange` listener, replacing any previous one.
pub fn listen(on_change: impl Fn(Period) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    unlisten();

    let handler = Closure::<dyn Fn()>::new(move || on_change(current_period()));
    if window
        .add_event_listener_with_callback("hashchange", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        HASH_CHANGE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(HashChangeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

pub fn unlisten() {
    HASH_CHANGE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "hashchange",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

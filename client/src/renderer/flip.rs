//! FLIP (first, last, invert, play) transitions for list rows that move.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::config::{FLIP_DURATION_MS, FLIP_MIN_DELTA_PX};

/// Inverse translation that puts an element moved from `before` to `after` back
/// where it was. Movements within `min_delta` px on both axes are not animated.
pub fn flip_offset(before: (f64, f64), after: (f64, f64), min_delta: f64) -> Option<(f64, f64)> {
    let dx = before.0 - after.0;
    let dy = before.1 - after.1;
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    if dx.abs() <= min_delta && dy.abs() <= min_delta {
        return None;
    }
    Some((dx, dy))
}

pub fn measure(el: &web_sys::HtmlElement) -> (f64, f64) {
    let rect = el.get_bounding_client_rect();
    (rect.left(), rect.top())
}

/// Animate `el` from its old position (`before`) into its current layout slot.
pub fn play_from(el: &web_sys::HtmlElement, before: (f64, f64)) {
    let Some((dx, dy)) = flip_offset(before, measure(el), FLIP_MIN_DELTA_PX) else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };

    let style = el.style();
    let _ = style.set_property("transition", "none");
    let _ = style.set_property("transform", &format!("translate({dx}px, {dy}px)"));
    // Flush layout so the inverted position is committed before the transition starts.
    let _ = el.offset_height();

    let cb = Closure::once(move || {
        let _ = style.set_property(
            "transition",
            &format!("transform {FLIP_DURATION_MS}ms cubic-bezier(0.2, 0.8, 0.2, 1)"),
        );
        let _ = style.set_property("transform", "");
    });
    let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    cb.forget();
}

/// Drop any leftover FLIP styling, e.g. when motion is reduced mid-transition.
pub fn reset(el: &web_sys::HtmlElement) {
    let style = el.style();
    let _ = style.remove_property("transition");
    let _ = style.remove_property("transform");
}

use std::sync::OnceLock;

/// Fetch-and-render cadence.
pub const POLL_INTERVAL_MS: i32 = 30_000;
/// Refresh cadence for the offline banner's "last updated" text.
pub const UPDATED_LABEL_REFRESH_MS: i32 = 15_000;

pub const AMOUNT_TWEEN_MS: f64 = 850.0;
pub const SALES_TWEEN_MS: f64 = 600.0;
pub const FLIP_DURATION_MS: f64 = 450.0;
/// Displacements at or below this many pixels are not animated.
pub const FLIP_MIN_DELTA_PX: f64 = 1.0;
/// How long the first-place emphasis class stays on.
pub const CROWN_PULSE_MS: i32 = 1_200;

pub const RANK_HISTORY_STORAGE_KEY: &str = "podium_rank_history";

/// 1x1 transparent gif used when an agent has no avatar.
pub const BLANK_AVATAR: &str = "data:image/gif;base64,R0lGODlhAQABAAD/ACwAAAAAAQABAAACADs=";

static API_BASE: OnceLock<String> = OnceLock::new();

/// Base URL for the live endpoint, resolved once from the page origin.
///
/// A `<meta name="podium-api-base" content="...">` tag overrides it, which is how the
/// page is pointed at a leaderboard API hosted elsewhere. Same-origin otherwise.
pub fn api_base() -> &'static str {
    API_BASE.get_or_init(resolve_api_base).as_str()
}

fn resolve_api_base() -> String {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return String::new();
    };
    document
        .query_selector("meta[name='podium-api-base']")
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
        .map(|base| base.trim().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

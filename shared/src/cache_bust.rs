use crate::period::Period;

/// Width of one cache-busting window. Requests inside the same window share a URL.
pub const CACHE_BUCKET_MS: f64 = 15_000.0;

pub fn cache_bucket(now_ms: f64) -> u64 {
    if !now_ms.is_finite() || now_ms <= 0.0 {
        return 0;
    }
    (now_ms / CACHE_BUCKET_MS).floor() as u64
}

/// Live endpoint for a period. `api_base` has no trailing slash (may be empty for same-origin).
pub fn primary_url(api_base: &str, period: Period, bucket: u64) -> String {
    format!(
        "{}/api/leaderboard?period={}&t={bucket}",
        api_base.trim_end_matches('/'),
        period.as_str()
    )
}

/// Static snapshot, resolved relative to the page.
pub fn fallback_url(period: Period, bucket: u64) -> String {
    format!("data/{}?t={bucket}", period.snapshot_file_name())
}

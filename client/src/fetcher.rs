use gloo_net::http::Request;

use podium_shared::cache_bust::{cache_bucket, fallback_url, primary_url};
use podium_shared::{FetchError, FetchOutcome, LeaderboardPayload, Period, Snapshot, SnapshotSource};

use crate::config::api_base;

/// One fetch cycle: live endpoint first, static snapshot only after it has failed.
pub async fn fetch_period(period: Period, now_ms: f64) -> FetchOutcome {
    let bucket = cache_bucket(now_ms);

    let primary = match fetch_snapshot(
        &primary_url(api_base(), period, bucket),
        SnapshotSource::Primary,
    )
    .await
    {
        Ok(snapshot) => return FetchOutcome::Loaded(snapshot),
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Leaderboard fetch failed ({period}), trying static snapshot: {e}").into(),
            );
            e
        }
    };

    match fetch_snapshot(&fallback_url(period, bucket), SnapshotSource::Fallback).await {
        Ok(snapshot) => FetchOutcome::Loaded(snapshot),
        Err(fallback) => {
            web_sys::console::warn_1(
                &format!("Static snapshot fetch failed ({period}): {fallback}").into(),
            );
            FetchOutcome::Offline { primary, fallback }
        }
    }
}

async fn fetch_snapshot(url: &str, source: SnapshotSource) -> Result<Snapshot, FetchError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    let payload =
        LeaderboardPayload::from_json(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    Ok(Snapshot::from_payload(&payload, source))
}

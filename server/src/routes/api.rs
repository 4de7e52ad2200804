use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use podium_shared::Period;
use serde::Deserialize;

use crate::config::LEADERBOARD_CACHE_CONTROL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Absent means daily. The client's `t` cache-bust bucket is ignored.
    period: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshots = state.snapshots.read().await;
    let periods: serde_json::Map<String, serde_json::Value> = Period::ALL
        .into_iter()
        .filter_map(|period| {
            let snapshot = snapshots.get(&period)?;
            Some((
                period.as_str().to_string(),
                serde_json::json!({
                    "revision": snapshot.revision,
                    "agents": snapshot.agent_count,
                    "timestamp": snapshot.timestamp,
                    "loaded_at": snapshot.loaded_at.to_rfc3339(),
                }),
            ))
        })
        .collect();

    Json(serde_json::json!({
        "status": if periods.is_empty() { "waiting" } else { "ok" },
        "periods": periods,
    }))
}

/// Serve the stored snapshot bytes for a period, with ETag revalidation.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
    headers: HeaderMap,
) -> Response {
    let period = match query.period.as_deref().map(str::trim) {
        None | Some("") => Period::default(),
        Some(raw) => match Period::parse(raw) {
            Some(period) => period,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    serde_json::json!({ "error": "unknown period", "period": raw }),
                );
            }
        },
    };

    let Some(snapshot) = state.snapshot(period).await else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({ "error": "no snapshot loaded", "period": period.as_str() }),
        );
    };

    let etag = snapshot.etag(period);
    if if_none_match_matches(&headers, &etag) {
        return not_modified_response(LEADERBOARD_CACHE_CONTROL, Some(&etag));
    }
    json_bytes_response(
        snapshot.json.as_ref().clone(),
        LEADERBOARD_CACHE_CONTROL,
        Some(&etag),
    )
}

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use bytes::Bytes;
    use podium_shared::Period;
    use tower::ServiceExt;

    use super::if_none_match_matches;
    use crate::state::AppState;

    const DAILY: &[u8] =
        br#"{"timestamp":"2024-05-01T10:00:00Z","agents":[{"id":"a1","name":"Alex","amount":1200,"sales":3}]}"#;

    fn empty_state() -> AppState {
        AppState::new(
            PathBuf::from("does-not-exist/data"),
            PathBuf::from("does-not-exist/dist"),
        )
    }

    async fn loaded_state() -> AppState {
        let state = empty_state();
        state
            .install(Period::Daily, Bytes::from_static(DAILY))
            .await
            .expect("valid snapshot");
        state
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"leaderboard-daily-4\""),
        );
        assert!(if_none_match_matches(&headers, "\"leaderboard-daily-4\""));
        assert!(!if_none_match_matches(&headers, "\"leaderboard-daily-5\""));
    }

    #[tokio::test]
    async fn unknown_period_is_bad_request() {
        let app = crate::app::build_app(loaded_state().await);
        let response = app
            .oneshot(
                Request::get("/api/leaderboard?period=yearly&t=1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_snapshot_is_service_unavailable() {
        let app = crate::app::build_app(loaded_state().await);
        let response = app
            .oneshot(
                Request::get("/api/leaderboard?period=weekly")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    #[tokio::test]
    async fn period_defaults_to_daily() {
        let app = crate::app::build_app(loaded_state().await);
        let response = app
            .oneshot(
                Request::get("/api/leaderboard")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn leaderboard_serves_snapshot_then_not_modified() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/leaderboard?period=daily&t=113"))
            .send()
            .await
            .expect("first request");
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        assert_eq!(
            first
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=15")
        );
        let etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("etag header");
        assert_eq!(etag, "\"leaderboard-daily-1\"");
        let body: serde_json::Value = first.json().await.expect("json body");
        assert_eq!(body["agents"][0]["name"], "Alex");

        let second = client
            .get(format!("{base_url}/api/leaderboard?period=daily&t=114"))
            .header(reqwest::header::IF_NONE_MATCH, etag)
            .send()
            .await
            .expect("second request");
        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);

        server_handle.abort();
    }

    #[tokio::test]
    async fn health_lists_loaded_periods() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;
        let body: serde_json::Value = reqwest::get(format!("http://{addr}/api/health"))
            .await
            .expect("health request")
            .json()
            .await
            .expect("json body");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["periods"]["daily"]["agents"], 1);
        assert!(body["periods"].get("weekly").is_none());

        server_handle.abort();
    }

    #[tokio::test]
    async fn health_reports_waiting_before_first_load() {
        let app = crate::app::build_app(empty_state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

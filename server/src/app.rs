use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::DATA_FILE_CACHE_CONTROL;
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = ServeDir::new(state.static_dir.as_path())
        .precompressed_br()
        .precompressed_gzip();
    let data_files = ServeDir::new(state.data_dir.as_path());

    // The leaderboard endpoint is read-only and may be polled from another origin.
    let api = Router::new()
        .route(
            "/api/leaderboard",
            axum::routing::get(routes::api::get_leaderboard),
        )
        .route("/api/health", axum::routing::get(routes::api::health))
        .layer(CorsLayer::permissive());

    api.nest_service("/data", data_files)
        .layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .layer(middleware::from_fn(set_static_cache_control))
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if path.starts_with("/api/") {
        return None;
    }

    if path.starts_with("/data/") {
        return Some(DATA_FILE_CACHE_CONTROL);
    }

    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    if path.starts_with("/avatars/") || path.starts_with("/fonts/") {
        return Some("public, max-age=86400");
    }

    None
}

/// Trunk emits `name-<hash>.{wasm,js,css}`; those never change under the same name.
fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/podium-client-3fa9c1d2e4b5a697_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/style-0badc0ffee123456.css"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn fallback_snapshots_revalidate_with_the_poll_bucket() {
        assert_eq!(
            cache_control_for_path("/data/leaderboard-daily.json"),
            Some("public, max-age=15")
        );
    }

    #[test]
    fn api_and_html_keep_their_own_headers() {
        assert_eq!(cache_control_for_path("/api/leaderboard"), None);
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
        assert_eq!(cache_control_for_path("/podium.js"), None);
    }

    #[tokio::test]
    async fn data_directory_is_served_under_data() {
        let dir = std::env::temp_dir().join(format!("podium-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create data dir");
        std::fs::write(dir.join("leaderboard-daily.json"), r#"{"agents":[]}"#)
            .expect("write snapshot");

        let app = build_app(AppState::new(dir.clone(), PathBuf::from("does-not-exist")));
        let response = app
            .oneshot(
                Request::get("/data/leaderboard-daily.json?t=5")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=15")
        );

        let _ = std::fs::remove_dir_all(dir);
    }
}

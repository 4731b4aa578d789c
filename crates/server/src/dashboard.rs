use std::path::Path;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::services::ServeDir;

use crate::envelope::plain_error;

/// `/dashboard` serves `index.html`; `/static/*` serves the rest of the directory.
/// Missing files answer with the JSON 404 used everywhere else.
pub fn router(dir: &Path) -> Router {
    let missing = || async { plain_error(StatusCode::NOT_FOUND, "Dashboard not found") };
    let files = ServeDir::new(dir).fallback(get(missing));
    Router::new().nest_service("/dashboard", files.clone()).nest_service("/static", files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::router;

    async fn get(dir: &std::path::Path, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        let response = router(dir).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn dashboard_serves_index_and_static_assets() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("index.html"), "<h1>LoadBridge</h1>").expect("write index");
        fs::write(dir.path().join("app.css"), "body {}").expect("write css");

        let (status, body) = get(dir.path(), "/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>LoadBridge</h1>");

        let (status, body) = get(dir.path(), "/static/app.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body {}");
    }

    #[tokio::test]
    async fn missing_dashboard_returns_json_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");

        for uri in ["/dashboard", "/static/app.js"] {
            let (status, body) = get(dir.path(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            let payload: Value = serde_json::from_slice(&body).expect("json body");
            assert_eq!(payload["error"], "Dashboard not found");
            assert_eq!(payload["status_code"], 404);
        }
    }
}

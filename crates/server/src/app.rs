//! Router composition: authenticated API routes, open health and dashboard
//! routes, CORS for the dashboard origins.

use std::path::Path;

use axum::{
    http::{request::Parts, HeaderValue, Method, StatusCode},
    middleware, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::{require_api_key, AuthManager};
use crate::envelope::plain_error;
use crate::state::AppState;
use crate::{admin, carriers, dashboard, health, loads, offers};

pub fn build_router(
    state: AppState,
    auth: AuthManager,
    dashboard_dir: &Path,
    allowed_origins: &[String],
) -> Router {
    let protected = Router::new()
        .merge(loads::router(state.clone()))
        .merge(carriers::router(state.clone()))
        .merge(offers::router(state.clone()))
        .merge(admin::router(state.clone()))
        .layer(middleware::from_fn_with_state(auth, require_api_key));

    Router::new()
        .merge(protected)
        .merge(health::router(state))
        .merge(dashboard::router(dashboard_dir))
        .fallback(|| async { plain_error(StatusCode::NOT_FOUND, "Not Found") })
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns = allowed_origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin.to_str().is_ok_and(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// `https://*.example.com` admits any subdomain of `example.com` over https;
/// every other pattern must match exactly.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once("*.") {
        Some((scheme, domain)) => origin
            .strip_prefix(scheme)
            .and_then(|host| host.strip_suffix(domain))
            .and_then(|sub| sub.strip_suffix('.'))
            .is_some_and(|sub| !sub.is_empty()),
        None => pattern == origin,
    }
}

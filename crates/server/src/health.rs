use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use loadbridge_db::DbPool;
use serde::Serialize;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/healthcheck", get(healthcheck))
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub dashboard: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub fmcsa: &'static str,
    pub loads: &'static str,
    pub metrics: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loads_available: usize,
    pub loads_booked: usize,
    pub booked_load_ids: Vec<String>,
    pub services: ServiceStatus,
    pub database: HealthCheck,
    pub checked_at: String,
}

pub async fn banner() -> Json<Banner> {
    Json(Banner {
        service: "LoadBridge API",
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        dashboard: "/dashboard",
    })
}

pub async fn healthcheck(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = state.board.snapshot();
    let database = database_check(state.db_pool.as_ref()).await;
    let ready = database.status != "degraded";

    let payload = HealthResponse {
        status: if ready { "healthy" } else { "degraded" },
        loads_available: snapshot.catalog_size,
        loads_booked: snapshot.booked_ids.len(),
        booked_load_ids: snapshot.booked_ids.iter().map(ToString::to_string).collect(),
        services: ServiceStatus {
            fmcsa: if state.registry.is_some() { "operational" } else { "not_configured" },
            loads: if snapshot.catalog_size > 0 { "operational" } else { "empty" },
            metrics: if ready { "operational" } else { "degraded" },
        },
        database,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: Option<&DbPool>) -> HealthCheck {
    let Some(pool) = pool else {
        return HealthCheck { status: "skipped", detail: "no database attached".to_string() };
    };
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

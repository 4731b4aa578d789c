use std::sync::Arc;

use loadbridge_core::carriers::CarrierRegistry;
use loadbridge_core::config::{AppConfig, BrokerageConfig, SearchConfig};
use loadbridge_core::loads::LoadBoard;
use loadbridge_db::{CallLogRepository, DbPool};
use uuid::Uuid;

/// Shared handles injected into every route.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<LoadBoard>,
    pub call_log: Arc<dyn CallLogRepository>,
    /// Absent when no registry web key is configured.
    pub registry: Option<Arc<dyn CarrierRegistry>>,
    pub search: SearchConfig,
    pub brokerage: BrokerageConfig,
    pub db_pool: Option<DbPool>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        board: Arc<LoadBoard>,
        call_log: Arc<dyn CallLogRepository>,
        registry: Option<Arc<dyn CarrierRegistry>>,
        db_pool: Option<DbPool>,
    ) -> Self {
        Self {
            board,
            call_log,
            registry,
            search: config.search.clone(),
            brokerage: config.brokerage.clone(),
            db_pool,
        }
    }
}

pub fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4().simple())
}

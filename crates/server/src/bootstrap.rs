use std::sync::Arc;

use loadbridge_core::carriers::CarrierRegistry;
use loadbridge_core::config::{AppConfig, ConfigError, LoadOptions};
use loadbridge_core::loads::{Catalog, LoadBoard};
use loadbridge_db::{connect_with_settings, migrations, DbPool, SqlCallLogRepository};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::AuthManager;
use crate::fmcsa::FmcsaClient;
use crate::state::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
    pub auth: AuthManager,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("registry client could not be built: {0}")]
    Registry(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    // A missing or malformed catalog leaves the board empty; the API stays up.
    let catalog = match Catalog::load(&config.catalog.path) {
        Ok(catalog) => catalog,
        Err(load_error) => {
            error!(
                event_name = "system.bootstrap.catalog_unavailable",
                correlation_id = "bootstrap",
                path = %config.catalog.path.display(),
                error = %load_error,
                "load catalog unavailable; starting with no loads"
            );
            Catalog::default()
        }
    };
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        load_count = catalog.len(),
        "load catalog ready"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let registry = FmcsaClient::from_config(&config.fmcsa)
        .map_err(BootstrapError::Registry)?
        .map(|client| Arc::new(client) as Arc<dyn CarrierRegistry>);
    if registry.is_none() {
        warn!(
            event_name = "system.bootstrap.registry_disabled",
            correlation_id = "bootstrap",
            "no FMCSA web key configured; carrier lookups will fail"
        );
    }

    let auth = AuthManager::from_config(&config.auth);
    if !auth.is_configured() {
        warn!(
            event_name = "system.bootstrap.api_key_missing",
            correlation_id = "bootstrap",
            "no API key configured; authenticated routes will refuse every request"
        );
    }

    let state = AppState::new(
        &config,
        Arc::new(LoadBoard::new(catalog)),
        Arc::new(SqlCallLogRepository::new(db_pool.clone())),
        registry,
        Some(db_pool.clone()),
    );

    Ok(Application { config, db_pool, state, auth })
}

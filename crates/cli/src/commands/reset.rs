//! Clears the persisted call log, optionally writing a JSON backup first.
//!
//! Booking state lives in the API process; use `POST /metrics/reset` against
//! a running server to release bookings as well.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use loadbridge_core::config::{AppConfig, LoadOptions};
use loadbridge_core::domain::call::CallRecord;
use loadbridge_db::{connect_with_settings, migrations, CallLogRepository, SqlCallLogRepository};

use crate::commands::{block_on, CommandResult};

pub fn run(backup_dir: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "reset",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let result = block_on("reset", async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let repository = SqlCallLogRepository::new(pool.clone());
        let backup = match backup_dir {
            Some(dir) => {
                let records = repository
                    .list()
                    .await
                    .map_err(|error| ("call_log_read", error.to_string(), 6u8))?;
                Some(
                    write_backup(dir, &records)
                        .map_err(|message| ("backup_write", message, 7u8))?,
                )
            }
            None => None,
        };
        let cleared = repository
            .clear()
            .await
            .map_err(|error| ("call_log_clear", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>((cleared, backup))
    });

    match result {
        Ok(Ok((cleared, backup))) => {
            let message = match backup {
                Some(path) => {
                    format!("cleared {cleared} call records (backup: {})", path.display())
                }
                None => format!("cleared {cleared} call records"),
            };
            CommandResult::success("reset", message)
        }
        Ok(Err((error_class, message, exit_code))) => {
            CommandResult::failure("reset", error_class, message, exit_code)
        }
        Err(failure) => failure,
    }
}

pub fn write_backup(dir: &Path, records: &[CallRecord]) -> Result<PathBuf, String> {
    fs::create_dir_all(dir)
        .map_err(|error| format!("could not create `{}`: {error}", dir.display()))?;
    let path = dir.join(format!("call_log_backup_{}.json", Utc::now().format("%Y%m%dT%H%M%S")));
    let raw = serde_json::to_string_pretty(records)
        .map_err(|error| format!("could not serialize call log: {error}"))?;
    fs::write(&path, raw)
        .map_err(|error| format!("could not write `{}`: {error}", path.display()))?;
    Ok(path)
}

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use loadbridge_core::domain::call::{CallId, CallOutcome, CallRecord, CallSentiment};
use loadbridge_core::domain::load::LoadId;

use super::{CallLogRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCallLogRepository {
    pool: DbPool,
}

impl SqlCallLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<CallRecord, RepositoryError> {
    let call_id: String = row.try_get("call_id").map_err(decode)?;
    let mc_number: String = row.try_get("mc_number").map_err(decode)?;
    let carrier_name: Option<String> = row.try_get("carrier_name").map_err(decode)?;
    let load_id: Option<String> = row.try_get("load_id").map_err(decode)?;
    let outcome_str: String = row.try_get("outcome").map_err(decode)?;
    let sentiment_str: String = row.try_get("sentiment").map_err(decode)?;
    let agreed_rate_str: Option<String> = row.try_get("agreed_rate").map_err(decode)?;
    let negotiation_rounds: i64 = row.try_get("negotiation_rounds").map_err(decode)?;
    let call_duration_seconds: Option<i64> =
        row.try_get("call_duration_seconds").map_err(decode)?;
    let notes: Option<String> = row.try_get("notes").map_err(decode)?;
    let timestamp_str: String = row.try_get("timestamp").map_err(decode)?;

    let outcome = CallOutcome::from_str(&outcome_str).map_err(RepositoryError::Decode)?;
    let sentiment = CallSentiment::from_str(&sentiment_str).map_err(RepositoryError::Decode)?;
    let agreed_rate = agreed_rate_str
        .map(|value| Decimal::from_str(&value))
        .transpose()
        .map_err(|error| decode(format!("invalid agreed_rate: {error}")))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| decode(format!("invalid timestamp `{timestamp_str}`: {error}")))?;

    Ok(CallRecord {
        call_id: CallId(call_id),
        mc_number,
        carrier_name,
        load_id: load_id.map(LoadId),
        outcome,
        sentiment,
        agreed_rate,
        negotiation_rounds: u32::try_from(negotiation_rounds).map_err(decode)?,
        call_duration_seconds: call_duration_seconds.map(u32::try_from).transpose().map_err(decode)?,
        notes,
        timestamp,
    })
}

#[async_trait::async_trait]
impl CallLogRepository for SqlCallLogRepository {
    async fn append(&self, record: CallRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO call_record (call_id, mc_number, carrier_name, load_id, outcome,
                                      sentiment, agreed_rate, negotiation_rounds,
                                      call_duration_seconds, notes, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.call_id.0)
        .bind(&record.mc_number)
        .bind(&record.carrier_name)
        .bind(record.load_id.as_ref().map(LoadId::as_str))
        .bind(record.outcome.as_str())
        .bind(record.sentiment.as_str())
        .bind(record.agreed_rate.map(|rate| rate.to_string()))
        .bind(i64::from(record.negotiation_rounds))
        .bind(record.call_duration_seconds.map(i64::from))
        .bind(&record.notes)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<CallRecord>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT call_id, mc_number, carrier_name, load_id, outcome, sentiment, agreed_rate,
                    negotiation_rounds, call_duration_seconds, notes, timestamp
             FROM call_record ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect::<Result<Vec<_>, _>>()
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM call_record").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM call_record")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")
            .map_err(decode)?;
        u64::try_from(count).map_err(decode)
    }
}

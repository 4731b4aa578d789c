use tokio::sync::RwLock;

use loadbridge_core::domain::call::CallRecord;

use super::{CallLogRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryCallLogRepository {
    records: RwLock<Vec<CallRecord>>,
}

#[async_trait::async_trait]
impl CallLogRepository for InMemoryCallLogRepository {
    async fn append(&self, record: CallRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CallRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.clone())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use loadbridge_core::domain::call::{CallId, CallOutcome, CallRecord, CallSentiment};

    use crate::repositories::{CallLogRepository, InMemoryCallLogRepository};

    fn record(call_id: &str) -> CallRecord {
        CallRecord {
            call_id: CallId(call_id.to_string()),
            mc_number: "777".to_string(),
            carrier_name: None,
            load_id: None,
            outcome: CallOutcome::NotInterested,
            sentiment: CallSentiment::Neutral,
            agreed_rate: None,
            negotiation_rounds: 0,
            call_duration_seconds: None,
            notes: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_call_log_round_trip() {
        let repo = InMemoryCallLogRepository::default();
        repo.append(record("a")).await.expect("append");
        repo.append(record("b")).await.expect("append");

        let ids: Vec<String> =
            repo.list().await.expect("list").into_iter().map(|record| record.call_id.0).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

        assert_eq!(repo.clear().await.expect("clear"), 2);
        assert_eq!(repo.count().await.expect("count"), 0);
    }
}

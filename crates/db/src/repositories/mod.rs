use async_trait::async_trait;
use thiserror::Error;

use loadbridge_core::domain::call::CallRecord;

pub mod call_log;
pub mod memory;

pub use call_log::SqlCallLogRepository;
pub use memory::InMemoryCallLogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Append-only store of call outcomes. `list` returns records in the order
/// they were appended.
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    async fn append(&self, record: CallRecord) -> Result<(), RepositoryError>;
    async fn list(&self) -> Result<Vec<CallRecord>, RepositoryError>;
    /// Remove every record and return how many were dropped.
    async fn clear(&self) -> Result<u64, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}

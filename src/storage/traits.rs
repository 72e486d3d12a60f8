use crate::ingest::Batch;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for received batches, keyed by batch id.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn init_schema(&self) -> Result<(), StorageError>;

    /// Persist a complete batch. Batches are written once and never updated.
    async fn write_batch(&self, batch: &Batch) -> Result<(), StorageError>;

    async fn get_batch(&self, id: Uuid) -> Result<Option<Batch>, StorageError>;

    /// Newest batches first.
    async fn list_batches(&self, limit: usize, offset: usize) -> Result<Vec<Batch>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("batch serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}

impl From<duckdb::Error> for StorageError {
    fn from(e: duckdb::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

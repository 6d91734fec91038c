use std::sync::Arc;

use async_trait::async_trait;

use sluice_core::JobRecord;

use crate::error::StorageError;

/// Durable home for job records.
///
/// Implementations make each `save` visible atomically: a concurrent `load`
/// sees either the previous record or the new one, never a mix. Serializing
/// writers to the same job is the ledger's job, not the repository's.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<JobRecord>, StorageError>;

    /// Insert or replace the record with the same id.
    async fn save(&self, record: &JobRecord) -> Result<(), StorageError>;

    /// Remove a job and the metrics it owns. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// All records, oldest registration first.
    async fn list(&self) -> Result<Vec<JobRecord>, StorageError>;
}

/// Blanket implementation so `Arc<dyn JobRepository>` can be used directly.
#[async_trait]
impl<T: JobRepository + ?Sized> JobRepository for Arc<T> {
    async fn load(&self, id: &str) -> Result<Option<JobRecord>, StorageError> {
        (**self).load(id).await
    }

    async fn save(&self, record: &JobRecord) -> Result<(), StorageError> {
        (**self).save(record).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<JobRecord>, StorageError> {
        (**self).list().await
    }
}

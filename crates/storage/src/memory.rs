use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use sluice_core::JobRecord;

use crate::error::StorageError;
use crate::repository::JobRepository;

/// In-memory job records.
///
/// Uses `IndexMap` so listing follows registration order.
#[derive(Debug, Default)]
pub struct MemoryJobRepository {
    jobs: RwLock<IndexMap<String, JobRecord>>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn load(&self, id: &str) -> Result<Option<JobRecord>, StorageError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn save(&self, record: &JobRecord) -> Result<(), StorageError> {
        self.jobs
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.jobs.write().await.shift_remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<JobRecord>, StorageError> {
        Ok(self.jobs.read().await.values().cloned().collect())
    }
}

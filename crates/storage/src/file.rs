use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use sluice_core::JobRecord;

use crate::error::StorageError;
use crate::repository::JobRepository;

/// Filesystem-backed job records, one JSON document per job:
/// ```text
/// jobs/
///   direct-6f1c0d8a….json
///   dataflow-91b2e7c4….json
/// ```
/// Writes go to a temp file that is renamed over the target, so readers
/// never see a half-written record.
pub struct FileJobRepository {
    dir: PathBuf,
}

impl FileJobRepository {
    /// Create a repository rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(path = %dir.display(), "job repository initialized");
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(job_filename(id))
    }
}

/// Percent-escape the characters a path cannot hold. `%` is escaped too, so
/// distinct ids always land in distinct files.
fn job_filename(id: &str) -> String {
    let mut name = String::with_capacity(id.len() + 5);
    for c in id.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            _ => name.push(c),
        }
    }
    name.push_str(".json");
    name
}

#[async_trait]
impl JobRepository for FileJobRepository {
    async fn load(&self, id: &str) -> Result<Option<JobRecord>, StorageError> {
        let path = self.path_for(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: JobRecord = serde_json::from_slice(&bytes)?;
                if record.id != id {
                    return Err(StorageError::IdMismatch {
                        path,
                        expected: id.to_string(),
                        found: record.id,
                    });
                }
                Ok(Some(record))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &JobRecord) -> Result<(), StorageError> {
        let path = self.path_for(&record.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(job_id = %record.id, path = %path.display(), "job record written");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<JobRecord>, StorageError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let bytes = tokio::fs::read(&path).await?;
                records.push(serde_json::from_slice::<JobRecord>(&bytes)?);
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}

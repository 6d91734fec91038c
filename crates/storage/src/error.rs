use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use sluice_core::SluiceError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Job(#[from] SluiceError),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job already registered: {0}")]
    AlreadyExists(String),

    #[error("{} holds job {found}, expected {expected}", .path.display())]
    IdMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("timed out after {waited:?} waiting for lock on job {job_id}")]
    LockTimeout { job_id: String, waited: Duration },
}

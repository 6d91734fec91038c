use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::JobStatus;

/// Kinds of shared entity a job refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Source,
    Store,
    FeatureSet,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Source => write!(f, "source"),
            EntityKind::Store => write!(f, "store"),
            EntityKind::FeatureSet => write!(f, "feature set"),
        }
    }
}

/// A referenced entity carries embedded data it cannot re-parse into its wire form.
#[derive(Debug, Error)]
#[error("cannot convert {kind} {id} to wire format: {source}")]
pub struct ConversionError {
    pub kind: EntityKind,
    pub id: String,
    #[source]
    pub source: serde_json::Error,
}

impl ConversionError {
    pub fn new(kind: EntityKind, id: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            kind,
            id: id.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum SluiceError {
    #[error("missing {kind} reference: {id}")]
    ReferenceIntegrity { kind: EntityKind, id: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("job {job_id} cannot move from terminal status {from} to {to}")]
    InvalidStatus {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("unknown job status: {0}")]
    UnknownStatus(String),

    #[error("unknown runner: {0}")]
    UnknownRunner(String),

    #[error("job id must not be empty")]
    EmptyJobId,

    #[error("job {job_id} lists feature set {feature_set_id} more than once")]
    DuplicateFeatureSet {
        job_id: String,
        feature_set_id: String,
    },

    #[error("envelope encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

impl SluiceError {
    pub fn missing(kind: EntityKind, id: impl Into<String>) -> Self {
        SluiceError::ReferenceIntegrity {
            kind,
            id: id.into(),
        }
    }
}

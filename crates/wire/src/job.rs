//! Ingestion job payloads as seen by monitoring and orchestration clients.
//!
//! Internal bookkeeping (creation / modification timestamps, metrics) is not
//! part of the wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire status vocabulary. Codes are stable and map one-to-one onto the
/// internal job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum IngestionJobStatus {
    Unknown = 0,
    Pending = 1,
    Running = 2,
    Completed = 3,
    Aborting = 4,
    Aborted = 5,
    Error = 6,
    Suspending = 7,
    Suspended = 8,
}

impl IngestionJobStatus {
    pub const ALL: [IngestionJobStatus; 9] = [
        IngestionJobStatus::Unknown,
        IngestionJobStatus::Pending,
        IngestionJobStatus::Running,
        IngestionJobStatus::Completed,
        IngestionJobStatus::Aborting,
        IngestionJobStatus::Aborted,
        IngestionJobStatus::Error,
        IngestionJobStatus::Suspending,
        IngestionJobStatus::Suspended,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a numeric wire code. Unassigned codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

/// Projection of one ingestion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionJobMessage {
    pub id: String,
    /// Runner-assigned id. Empty until the runner accepts the job.
    pub external_id: String,
    pub status: IngestionJobStatus,
    /// Feature sets in the order the job lists them.
    pub feature_sets: Vec<FeatureSetMessage>,
    pub source: SourceMessage,
    pub store: StoreMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSetMessage {
    /// `project/name:version`
    pub id: String,
    pub project: String,
    pub name: String,
    pub version: u32,
    pub entities: Vec<String>,
    pub features: Vec<FeatureSpecMessage>,
    /// Maximum feature age in seconds; 0 means unbounded.
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpecMessage {
    pub name: String,
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: String,
    /// Source kind (e.g. "KAFKA").
    pub kind: String,
    pub bootstrap_servers: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMessage {
    pub name: String,
    /// Store kind (e.g. "REDIS", "BIGQUERY").
    pub kind: String,
    /// Kind-specific connection settings.
    pub config: BTreeMap<String, String>,
    pub subscriptions: Vec<SubscriptionMessage>,
}

/// Feature sets a store accepts; `*` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMessage {
    pub project: String,
    pub name: String,
    pub version: String,
}

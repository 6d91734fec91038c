//! Job status vocabulary and the execution runners that report it.
//!
//! Terminal detection is answered from [`STATUS_TABLE`] and nowhere else.
//! Callers that drive transitions check [`JobStatus::is_terminal`] before
//! writing a new status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sluice_wire::IngestionJobStatus;

use crate::error::SluiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
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

/// One row of the status classification.
#[derive(Debug, Clone, Copy)]
pub struct StatusClass {
    pub status: JobStatus,
    pub name: &'static str,
    pub wire: IngestionJobStatus,
    /// No further transition is expected.
    pub terminal: bool,
    /// In flight toward another status.
    pub transitional: bool,
}

const fn row(
    status: JobStatus,
    name: &'static str,
    wire: IngestionJobStatus,
    terminal: bool,
    transitional: bool,
) -> StatusClass {
    StatusClass {
        status,
        name,
        wire,
        terminal,
        transitional,
    }
}

/// Indexed by `JobStatus` discriminant.
pub static STATUS_TABLE: [StatusClass; 9] = [
    row(JobStatus::Unknown, "UNKNOWN", IngestionJobStatus::Unknown, false, false),
    row(JobStatus::Pending, "PENDING", IngestionJobStatus::Pending, false, true),
    row(JobStatus::Running, "RUNNING", IngestionJobStatus::Running, false, false),
    row(JobStatus::Completed, "COMPLETED", IngestionJobStatus::Completed, true, false),
    row(JobStatus::Aborting, "ABORTING", IngestionJobStatus::Aborting, false, true),
    row(JobStatus::Aborted, "ABORTED", IngestionJobStatus::Aborted, true, false),
    row(JobStatus::Error, "ERROR", IngestionJobStatus::Error, true, false),
    row(JobStatus::Suspending, "SUSPENDING", IngestionJobStatus::Suspending, false, true),
    row(JobStatus::Suspended, "SUSPENDED", IngestionJobStatus::Suspended, false, false),
];

impl JobStatus {
    pub fn class(self) -> &'static StatusClass {
        &STATUS_TABLE[self as usize]
    }

    pub fn is_terminal(self) -> bool {
        self.class().terminal
    }

    pub fn is_transitional(self) -> bool {
        self.class().transitional
    }

    pub fn name(self) -> &'static str {
        self.class().name
    }

    pub fn to_wire(self) -> IngestionJobStatus {
        self.class().wire
    }

    pub fn from_wire(wire: IngestionJobStatus) -> Result<Self, SluiceError> {
        STATUS_TABLE
            .iter()
            .find(|c| c.wire == wire)
            .map(|c| c.status)
            .ok_or_else(|| SluiceError::UnknownStatus(format!("{wire:?}")))
    }

    pub fn terminal_statuses() -> impl Iterator<Item = JobStatus> {
        STATUS_TABLE.iter().filter(|c| c.terminal).map(|c| c.status)
    }

    pub fn transitional_statuses() -> impl Iterator<Item = JobStatus> {
        STATUS_TABLE.iter().filter(|c| c.transitional).map(|c| c.status)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobStatus {
    type Err = SluiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_TABLE
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(s))
            .map(|c| c.status)
            .ok_or_else(|| SluiceError::UnknownStatus(s.to_string()))
    }
}

/// Execution backend that owns a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runner {
    #[serde(rename = "DirectRunner")]
    Direct,
    #[serde(rename = "DataflowRunner")]
    Dataflow,
}

impl Runner {
    pub const ALL: [Runner; 2] = [Runner::Direct, Runner::Dataflow];

    pub fn name(self) -> &'static str {
        match self {
            Runner::Direct => "DirectRunner",
            Runner::Dataflow => "DataflowRunner",
        }
    }

    /// Short lowercase label used in generated job ids.
    pub fn slug(self) -> &'static str {
        match self {
            Runner::Direct => "direct",
            Runner::Dataflow => "dataflow",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, SluiceError> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name() == name || r.slug().eq_ignore_ascii_case(name))
            .ok_or_else(|| SluiceError::UnknownRunner(name.to_string()))
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Runner {
    type Err = SluiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Runner::from_name(s)
    }
}

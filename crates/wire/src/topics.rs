//! Topic constants for job snapshot routing.
//!
//! Topics follow the pattern `sluice.<domain>.<event>`.

/// Full projection of an ingestion job, published on read or after a mutation.
pub const JOB_SNAPSHOT: &str = "sluice.job.snapshot";

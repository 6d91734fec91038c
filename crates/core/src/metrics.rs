use serde::{Deserialize, Serialize};

/// One observed metric reported for a job.
///
/// Runners report complete snapshots: each report replaces every metric the
/// job held before (see [`Job::update_metrics`](crate::Job::update_metrics)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Owning job.
    pub job_id: String,
    pub name: String,
    pub value: f64,
}

impl Metrics {
    pub fn new(job_id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            job_id: job_id.into(),
            name: name.into(),
            value,
        }
    }
}

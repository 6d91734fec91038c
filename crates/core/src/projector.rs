//! Projection of a loaded [`Job`] into its wire message.
//!
//! Projection is all-or-nothing: if any embedded reference is missing or
//! cannot produce its own wire form, the error is returned and no message is
//! built.

use sluice_wire::{IngestionJobMessage, JobSnapshot};

use crate::error::SluiceError;
use crate::job::Job;
use crate::reference::ToWire;

pub fn project(job: &Job) -> Result<IngestionJobMessage, SluiceError> {
    let feature_sets = job
        .feature_sets()
        .iter()
        .map(|r| -> Result<_, SluiceError> { Ok(r.get()?.to_wire()?) })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IngestionJobMessage {
        id: job.id().to_string(),
        external_id: job.external_id().to_string(),
        status: job.status().to_wire(),
        feature_sets,
        source: job.source()?.to_wire()?,
        store: job.store()?.to_wire()?,
    })
}

/// Wrap the job's projection in a snapshot envelope.
pub fn snapshot_envelope(job: &Job) -> Result<JobSnapshot, SluiceError> {
    let msg = project(job)?;
    Ok(JobSnapshot::new(&msg)?)
}

impl ToWire for Job {
    type Message = IngestionJobMessage;
    type Error = SluiceError;

    fn to_wire(&self) -> Result<IngestionJobMessage, SluiceError> {
        project(self)
    }
}

//! [`JobLedger`]: the system of record for ingestion jobs.
//!
//! Every mutation runs as load → mutate → save while holding that job's lock,
//! so status writes and metrics replacements to the same job never
//! interleave. Reads that project a job take the same lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use sluice_core::config::LedgerConfig;
use sluice_core::{project, snapshot_envelope, Job, JobStatus, Metrics, Runner, SluiceError};
use sluice_wire::{IngestionJobMessage, JobSnapshot};

use crate::catalog::ReferenceCatalog;
use crate::error::StorageError;
use crate::locks::JobLocks;
use crate::repository::JobRepository;

/// Outcome of [`JobLedger::update_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The job already had this status.
    Unchanged(JobStatus),
    Changed { from: JobStatus, to: JobStatus },
}

pub struct JobLedger<R> {
    repo: R,
    catalog: Arc<ReferenceCatalog>,
    locks: JobLocks,
    default_runner: Runner,
}

impl<R: JobRepository> JobLedger<R> {
    pub fn new(repo: R, catalog: Arc<ReferenceCatalog>, config: &LedgerConfig) -> Self {
        Self {
            repo,
            catalog,
            locks: JobLocks::new(Duration::from_millis(config.lock_timeout_ms)),
            default_runner: config.default_runner,
        }
    }

    /// Runner used when a submitter does not pick one.
    pub fn default_runner(&self) -> Runner {
        self.default_runner
    }

    /// Fresh job id for the default runner.
    pub fn next_job_id(&self) -> String {
        Job::generate_id(self.default_runner)
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn locks(&self) -> &JobLocks {
        &self.locks
    }

    /// Store a newly created job. Fails if the id is already taken.
    pub async fn register(&self, job: &Job) -> Result<(), StorageError> {
        let _guard = self.locks.acquire(job.id()).await?;
        if self.repo.load(job.id()).await?.is_some() {
            return Err(StorageError::AlreadyExists(job.id().to_string()));
        }
        self.repo.save(&job.to_record()).await?;
        info!(
            job_id = %job.id(),
            runner = %job.runner(),
            status = %job.status(),
            feature_sets = job.feature_sets().len(),
            "job registered"
        );
        Ok(())
    }

    pub async fn load(&self, job_id: &str) -> Result<Job, StorageError> {
        let record = self
            .repo
            .load(job_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(job_id.to_string()))?;
        Ok(Job::from_record(record, self.catalog.as_ref())?)
    }

    pub async fn list(&self) -> Result<Vec<Job>, StorageError> {
        let mut jobs = Vec::new();
        for record in self.repo.list().await? {
            jobs.push(Job::from_record(record, self.catalog.as_ref())?);
        }
        Ok(jobs)
    }

    /// Jobs whose status is not terminal.
    pub async fn list_active(&self) -> Result<Vec<Job>, StorageError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|j| !j.has_terminated())
            .collect())
    }

    /// Move a job to `status`.
    ///
    /// Re-applying the current status is a no-op. Leaving a terminal status
    /// fails with `InvalidStatus` and leaves the job untouched.
    pub async fn update_status(
        &self,
        job_id: &str,
        status: JobStatus,
    ) -> Result<StatusChange, StorageError> {
        let change = self.apply_status(job_id, status).await;

        match &change {
            Ok(StatusChange::Changed { from, to }) if to.is_terminal() => {
                info!(job_id, %from, %to, "job terminated");
            }
            Ok(StatusChange::Changed { from, to }) => {
                info!(job_id, %from, %to, "job status changed");
            }
            Ok(StatusChange::Unchanged(_)) => {}
            Err(e) => warn!(job_id, error = %e, "status update rejected"),
        }
        change
    }

    /// Record the runner-assigned id once submission completes.
    pub async fn set_external_id(
        &self,
        job_id: &str,
        external_id: &str,
    ) -> Result<(), StorageError> {
        self.with_job(job_id, |job| {
            job.set_external_id(external_id);
            Ok(())
        })
        .await?;
        debug!(job_id, external_id, "external id recorded");
        Ok(())
    }

    /// Replace the job's metrics with a complete snapshot.
    pub async fn update_metrics(
        &self,
        job_id: &str,
        metrics: Vec<Metrics>,
    ) -> Result<(), StorageError> {
        let count = metrics.len();
        self.with_job(job_id, move |job| {
            job.update_metrics(metrics);
            Ok(())
        })
        .await?;
        debug!(job_id, metrics = count, "metrics snapshot replaced");
        Ok(())
    }

    /// Wire projection of the job's current state.
    pub async fn project(&self, job_id: &str) -> Result<IngestionJobMessage, StorageError> {
        let _guard = self.locks.acquire(job_id).await?;
        let job = self.load(job_id).await?;
        Ok(project(&job)?)
    }

    /// Projection wrapped in a snapshot envelope.
    pub async fn snapshot(&self, job_id: &str) -> Result<JobSnapshot, StorageError> {
        let _guard = self.locks.acquire(job_id).await?;
        let job = self.load(job_id).await?;
        Ok(snapshot_envelope(&job)?)
    }

    /// Delete a job and its metrics. Returns whether the job existed.
    pub async fn delete(&self, job_id: &str) -> Result<bool, StorageError> {
        let existed = {
            let _guard = self.locks.acquire(job_id).await?;
            self.repo.delete(job_id).await?
        };
        if existed {
            info!(job_id, "job deleted");
        }
        Ok(existed)
    }

    /// Delete terminated jobs last modified before `cutoff`.
    pub async fn purge_terminated(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError> {
        let candidates: Vec<String> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|r| r.status.is_terminal() && r.updated_at < cutoff)
            .map(|r| r.id)
            .collect();

        let mut purged = Vec::with_capacity(candidates.len());
        for id in candidates {
            let _guard = self.locks.acquire(&id).await?;
            // Re-check under the lock; the record may have moved on.
            match self.repo.load(&id).await? {
                Some(r) if r.status.is_terminal() && r.updated_at < cutoff => {
                    if self.repo.delete(&id).await? {
                        purged.push(id);
                    }
                }
                _ => {}
            }
        }

        info!(purged = purged.len(), %cutoff, "terminated jobs purged");
        Ok(purged)
    }

    /// Purge terminated jobs older than `retention_days`.
    pub async fn purge_expired(&self, retention_days: u32) -> Result<Vec<String>, StorageError> {
        self.purge_terminated(retention_cutoff(Utc::now(), retention_days))
            .await
    }

    async fn apply_status(
        &self,
        job_id: &str,
        status: JobStatus,
    ) -> Result<StatusChange, StorageError> {
        let _guard = self.locks.acquire(job_id).await?;
        let mut job = self.load(job_id).await?;
        let current = job.status();
        if current == status {
            // Nothing to write.
            return Ok(StatusChange::Unchanged(current));
        }
        if current.is_terminal() {
            return Err(SluiceError::InvalidStatus {
                job_id: job_id.to_string(),
                from: current,
                to: status,
            }
            .into());
        }
        job.set_status(status);
        self.repo.save(&job.to_record()).await?;
        Ok(StatusChange::Changed {
            from: current,
            to: status,
        })
    }

    async fn with_job<T>(
        &self,
        job_id: &str,
        f: impl FnOnce(&mut Job) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let _guard = self.locks.acquire(job_id).await?;
        let mut job = self.load(job_id).await?;
        let out = f(&mut job)?;
        self.repo.save(&job.to_record()).await?;
        Ok(out)
    }
}

/// `now` minus `retention_days`, clamped to the earliest representable
/// instant when the window reaches past it.
fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    chrono::Duration::try_days(i64::from(retention_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

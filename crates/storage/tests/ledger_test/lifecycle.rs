use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use sluice_core::config::LedgerConfig;
use sluice_core::{JobRecord, JobStatus, Metrics, Runner, SluiceError};
use sluice_storage::{
    JobLedger, JobRepository, MemoryJobRepository, StatusChange, StorageError,
};
use sluice_wire::IngestionJobStatus;

use crate::helpers::{catalog, job_in, memory_ledger};

#[tokio::test]
async fn register_then_load() {
    let ledger = memory_ledger();
    let job = job_in(&ledger, "job-1", JobStatus::Pending, &["trips", "ratings"]);
    ledger.register(&job).await.unwrap();

    let loaded = ledger.load("job-1").await.unwrap();
    assert_eq!(loaded.status(), JobStatus::Pending);
    assert_eq!(loaded.external_id(), "");
    assert_eq!(loaded.feature_sets().len(), 2);
    assert_eq!(loaded.sink_name().unwrap(), "online");
}

#[tokio::test]
async fn generated_ids_follow_the_default_runner() {
    let config = LedgerConfig {
        lock_timeout_ms: 100,
        default_runner: Runner::Dataflow,
    };
    let ledger = JobLedger::new(MemoryJobRepository::new(), catalog(), &config);
    assert_eq!(ledger.default_runner(), Runner::Dataflow);

    let id = ledger.next_job_id();
    assert!(id.starts_with("dataflow-"));
    ledger
        .register(&job_in(&ledger, &id, JobStatus::Pending, &[]))
        .await
        .unwrap();
    assert_eq!(ledger.load(&id).await.unwrap().id(), id);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let ledger = memory_ledger();
    let job = job_in(&ledger, "job-1", JobStatus::Pending, &[]);
    ledger.register(&job).await.unwrap();
    assert!(matches!(
        ledger.register(&job).await,
        Err(StorageError::AlreadyExists(id)) if id == "job-1"
    ));
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let ledger = memory_ledger();
    assert!(matches!(
        ledger.update_status("nope", JobStatus::Running).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(ledger.project("nope").await, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn full_lifecycle() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "job-1", JobStatus::Pending, &["trips"]))
        .await
        .unwrap();

    ledger.set_external_id("job-1", "runner-2024-77").await.unwrap();
    assert_eq!(
        ledger.update_status("job-1", JobStatus::Running).await.unwrap(),
        StatusChange::Changed {
            from: JobStatus::Pending,
            to: JobStatus::Running
        }
    );

    ledger
        .update_metrics("job-1", vec![Metrics::new("job-1", "rows_processed", 100.0)])
        .await
        .unwrap();
    ledger
        .update_metrics("job-1", vec![Metrics::new("job-1", "rows_processed", 250.0)])
        .await
        .unwrap();

    let job = ledger.load("job-1").await.unwrap();
    assert_eq!(job.metrics(), &[Metrics::new("job-1", "rows_processed", 250.0)]);

    ledger.update_status("job-1", JobStatus::Completed).await.unwrap();
    let msg = ledger.project("job-1").await.unwrap();
    assert_eq!(msg.external_id, "runner-2024-77");
    assert_eq!(msg.status, IngestionJobStatus::Completed);
    assert_eq!(msg.feature_sets[0].id, "driver/trips:1");
}

#[tokio::test]
async fn terminal_status_is_sticky() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "job-1", JobStatus::Running, &[]))
        .await
        .unwrap();
    ledger.update_status("job-1", JobStatus::Error).await.unwrap();

    // Same terminal status again is fine.
    assert_eq!(
        ledger.update_status("job-1", JobStatus::Error).await.unwrap(),
        StatusChange::Unchanged(JobStatus::Error)
    );

    match ledger.update_status("job-1", JobStatus::Running).await {
        Err(StorageError::Job(SluiceError::InvalidStatus { job_id, from, to })) => {
            assert_eq!(job_id, "job-1");
            assert_eq!(from, JobStatus::Error);
            assert_eq!(to, JobStatus::Running);
        }
        other => panic!("expected InvalidStatus, got {other:?}"),
    }
    assert_eq!(ledger.load("job-1").await.unwrap().status(), JobStatus::Error);
}

#[tokio::test]
async fn list_active_skips_terminated() {
    let ledger = memory_ledger();
    for (id, status) in [
        ("job-a", JobStatus::Running),
        ("job-b", JobStatus::Completed),
        ("job-c", JobStatus::Suspended),
        ("job-d", JobStatus::Aborted),
    ] {
        ledger.register(&job_in(&ledger, id, status, &[])).await.unwrap();
    }

    let active: Vec<_> = ledger
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id().to_string())
        .collect();
    assert_eq!(active, vec!["job-a", "job-c"]);
    assert_eq!(ledger.list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn delete_removes_job_and_metrics() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "job-1", JobStatus::Running, &[]))
        .await
        .unwrap();
    ledger
        .update_metrics("job-1", vec![Metrics::new("job-1", "rows_processed", 1.0)])
        .await
        .unwrap();

    assert!(ledger.delete("job-1").await.unwrap());
    assert!(!ledger.delete("job-1").await.unwrap());
    assert!(matches!(ledger.load("job-1").await, Err(StorageError::NotFound(_))));
    assert_eq!(ledger.locks().tracked(), 0);
}

#[tokio::test]
async fn snapshot_envelope_carries_projection() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "job-1", JobStatus::Running, &["trips", "earnings"]))
        .await
        .unwrap();

    let envelope = ledger.snapshot("job-1").await.unwrap();
    assert_eq!(envelope.topic, sluice_wire::topics::JOB_SNAPSHOT);
    assert_eq!(envelope.job_id, "job-1");
    assert_eq!(envelope.status, IngestionJobStatus::Running);
    let decoded: sluice_wire::IngestionJobMessage = envelope.decode().unwrap();
    assert_eq!(decoded, ledger.project("job-1").await.unwrap());
}

/// Memory repository that counts writes.
#[derive(Default)]
struct CountingRepository {
    inner: MemoryJobRepository,
    saves: AtomicUsize,
}

#[async_trait]
impl JobRepository for CountingRepository {
    async fn load(&self, id: &str) -> Result<Option<JobRecord>, StorageError> {
        self.inner.load(id).await
    }

    async fn save(&self, record: &JobRecord) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        self.inner.delete(id).await
    }

    async fn list(&self) -> Result<Vec<JobRecord>, StorageError> {
        self.inner.list().await
    }
}

#[tokio::test]
async fn unchanged_status_is_not_rewritten() {
    let repo = Arc::new(CountingRepository::default());
    let ledger = JobLedger::new(repo.clone(), catalog(), &LedgerConfig::default());
    ledger
        .register(&job_in(&ledger, "job-1", JobStatus::Running, &[]))
        .await
        .unwrap();
    assert_eq!(repo.saves.load(Ordering::SeqCst), 1);

    let before = ledger.load("job-1").await.unwrap().updated_at();
    for _ in 0..3 {
        assert_eq!(
            ledger.update_status("job-1", JobStatus::Running).await.unwrap(),
            StatusChange::Unchanged(JobStatus::Running)
        );
    }
    assert_eq!(repo.saves.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.load("job-1").await.unwrap().updated_at(), before);

    // Rejected transitions do not write either.
    ledger.update_status("job-1", JobStatus::Completed).await.unwrap();
    assert_eq!(repo.saves.load(Ordering::SeqCst), 2);
    assert!(ledger.update_status("job-1", JobStatus::Running).await.is_err());
    assert_eq!(repo.saves.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn lock_entries_do_not_accumulate() {
    let ledger = memory_ledger();

    for i in 0..200 {
        let id = format!("missing-{i}");
        assert!(matches!(ledger.project(&id).await, Err(StorageError::NotFound(_))));
        assert!(matches!(ledger.snapshot(&id).await, Err(StorageError::NotFound(_))));
        assert!(ledger.update_status(&id, JobStatus::Running).await.is_err());
    }
    assert_eq!(ledger.locks().tracked(), 0);

    for i in 0..50 {
        let id = format!("job-{i}");
        ledger
            .register(&job_in(&ledger, &id, JobStatus::Pending, &[]))
            .await
            .unwrap();
        ledger.update_status(&id, JobStatus::Running).await.unwrap();
        ledger
            .update_metrics(&id, vec![Metrics::new(&id, "rows_processed", 1.0)])
            .await
            .unwrap();
        ledger.project(&id).await.unwrap();
    }
    assert_eq!(ledger.locks().tracked(), 0);
    assert_eq!(ledger.list().await.unwrap().len(), 50);
}

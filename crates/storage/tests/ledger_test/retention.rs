use chrono::{Duration, Utc};

use sluice_core::JobStatus;

use crate::helpers::{job_in, memory_ledger};

#[tokio::test]
async fn purge_only_removes_old_terminated_jobs() {
    let ledger = memory_ledger();
    for (id, status) in [
        ("done", JobStatus::Completed),
        ("failed", JobStatus::Error),
        ("running", JobStatus::Running),
    ] {
        ledger.register(&job_in(&ledger, id, status, &[])).await.unwrap();
    }

    // Nothing is older than an hour ago.
    let purged = ledger
        .purge_terminated(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert!(purged.is_empty());

    let mut purged = ledger
        .purge_terminated(Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    purged.sort();
    assert_eq!(purged, vec!["done", "failed"]);

    let remaining: Vec<_> = ledger
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id().to_string())
        .collect();
    assert_eq!(remaining, vec!["running"]);
}

#[tokio::test]
async fn retention_beyond_the_calendar_purges_nothing() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "done", JobStatus::Completed, &[]))
        .await
        .unwrap();

    for days in [200_000_000, u32::MAX] {
        assert!(ledger.purge_expired(days).await.unwrap().is_empty());
    }
    assert_eq!(ledger.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn purge_expired_keeps_recent_jobs() {
    let ledger = memory_ledger();
    ledger
        .register(&job_in(&ledger, "done", JobStatus::Completed, &[]))
        .await
        .unwrap();
    assert!(ledger.purge_expired(30).await.unwrap().is_empty());
    assert_eq!(ledger.list().await.unwrap().len(), 1);
}

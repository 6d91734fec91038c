//! The ingestion job aggregate.
//!
//! A [`Job`] is the loaded, in-memory form with resolved references. A
//! [`JobRecord`] is what a persistence collaborator stores: the same state
//! with shared entities reduced to their ids.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::SluiceError;
use crate::feature_set::FeatureSet;
use crate::metrics::Metrics;
use crate::reference::{Reference, ReferenceResolver};
use crate::source::Source;
use crate::status::{JobStatus, Runner};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    external_id: String,
    runner: Runner,
    source: Reference<Source>,
    store: Reference<Store>,
    feature_sets: Vec<Reference<FeatureSet>>,
    metrics: Vec<Metrics>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Persisted form of a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub external_id: String,
    pub runner: Runner,
    pub source_id: String,
    pub store_name: String,
    #[serde(default)]
    pub feature_set_ids: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<Metrics>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Register a new job. `external_id` may be empty until the runner accepts it.
    pub fn create(
        id: impl Into<String>,
        external_id: impl Into<String>,
        runner: Runner,
        source: Arc<Source>,
        store: Arc<Store>,
        feature_sets: Vec<Arc<FeatureSet>>,
        status: JobStatus,
    ) -> Result<Self, SluiceError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SluiceError::EmptyJobId);
        }
        let feature_sets: Vec<_> = feature_sets.into_iter().map(Reference::resolved).collect();
        check_unique(&id, &feature_sets)?;
        if feature_sets.is_empty() {
            warn!(job_id = %id, "job registered without feature sets");
        }

        let now = Utc::now();
        Ok(Self {
            id,
            external_id: external_id.into(),
            runner,
            source: Reference::resolved(source),
            store: Reference::resolved(store),
            feature_sets,
            metrics: Vec::new(),
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fresh globally unique job id, e.g. `direct-6f1c…`.
    pub fn generate_id(runner: Runner) -> String {
        format!("{}-{}", runner.slug(), Uuid::new_v4().simple())
    }

    /// Rehydrate a stored job. References the resolver cannot find stay
    /// unresolved and fail when used.
    pub fn from_record(
        record: JobRecord,
        resolver: &dyn ReferenceResolver,
    ) -> Result<Self, SluiceError> {
        let source = Reference::from_lookup(&record.source_id, resolver.source(&record.source_id));
        let store = Reference::from_lookup(&record.store_name, resolver.store(&record.store_name));
        let feature_sets: Vec<_> = record
            .feature_set_ids
            .iter()
            .map(|id| Reference::from_lookup(id, resolver.feature_set(id)))
            .collect();
        check_unique(&record.id, &feature_sets)?;

        if !source.is_resolved() {
            warn!(job_id = %record.id, source_id = %record.source_id, "dangling source reference on load");
        }
        if !store.is_resolved() {
            warn!(job_id = %record.id, store_name = %record.store_name, "dangling store reference on load");
        }
        for fs in feature_sets.iter().filter(|r| !r.is_resolved()) {
            warn!(job_id = %record.id, feature_set_id = %fs.id(), "dangling feature set reference on load");
        }

        Ok(Self {
            id: record.id,
            external_id: record.external_id,
            runner: record.runner,
            source,
            store,
            feature_sets,
            metrics: record.metrics,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            id: self.id.clone(),
            external_id: self.external_id.clone(),
            runner: self.runner,
            source_id: self.source.id().to_string(),
            store_name: self.store.id().to_string(),
            feature_set_ids: self.feature_sets.iter().map(|r| r.id().to_string()).collect(),
            metrics: self.metrics.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn runner(&self) -> Runner {
        self.runner
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn source(&self) -> Result<&Source, SluiceError> {
        self.source.get()
    }

    pub fn store(&self) -> Result<&Store, SluiceError> {
        self.store.get()
    }

    pub fn source_ref(&self) -> &Reference<Source> {
        &self.source
    }

    pub fn store_ref(&self) -> &Reference<Store> {
        &self.store
    }

    pub fn feature_sets(&self) -> &[Reference<FeatureSet>] {
        &self.feature_sets
    }

    pub fn metrics(&self) -> &[Metrics] {
        &self.metrics
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_terminated(&self) -> bool {
        self.status.is_terminal()
    }

    /// Overwrite the status. Callers check [`JobStatus::is_terminal`] on the
    /// current value before moving a job anywhere else.
    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) {
        self.external_id = external_id.into();
        self.touch();
    }

    /// Replace the whole metrics collection with `new_metrics`.
    ///
    /// Nothing from an earlier report survives. Incoming entries become owned
    /// by this job regardless of the `job_id` they carried.
    pub fn update_metrics(&mut self, new_metrics: Vec<Metrics>) {
        let id = &self.id;
        self.metrics = new_metrics
            .into_iter()
            .map(|mut m| {
                if m.job_id != *id {
                    m.job_id = id.clone();
                }
                m
            })
            .collect();
        self.touch();
    }

    /// Name of the store this job writes into.
    pub fn sink_name(&self) -> Result<&str, SluiceError> {
        Ok(self.store.get()?.name())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn check_unique(job_id: &str, feature_sets: &[Reference<FeatureSet>]) -> Result<(), SluiceError> {
    let mut seen = HashSet::with_capacity(feature_sets.len());
    for fs in feature_sets {
        if !seen.insert(fs.id()) {
            return Err(SluiceError::DuplicateFeatureSet {
                job_id: job_id.to_string(),
                feature_set_id: fs.id().to_string(),
            });
        }
    }
    Ok(())
}

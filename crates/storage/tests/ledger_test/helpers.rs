use std::collections::BTreeMap;
use std::sync::Arc;

use sluice_core::config::LedgerConfig;
use sluice_core::{
    FeatureSet, FeatureSetSpec, FeatureSpec, Job, JobStatus, Runner, Source, Store, StoreKind,
};
use sluice_storage::{JobLedger, JobRepository, MemoryJobRepository, ReferenceCatalog};

pub fn catalog() -> Arc<ReferenceCatalog> {
    let catalog = ReferenceCatalog::new();
    catalog.add_source(Source::kafka("kafka-main", "kafka:9092", "features"));
    catalog.add_store(Store::new(
        "online",
        StoreKind::Redis,
        BTreeMap::from([("host".to_string(), "redis".to_string())]),
    ));
    for name in ["trips", "ratings", "earnings"] {
        catalog.add_feature_set(feature_set(name));
    }
    Arc::new(catalog)
}

pub fn feature_set(name: &str) -> FeatureSet {
    let spec = FeatureSetSpec {
        entities: vec!["driver_id".into()],
        features: vec![FeatureSpec {
            name: format!("{name}_count"),
            value_type: "INT64".into(),
        }],
        max_age_secs: 0,
    };
    FeatureSet::new("driver", name, 1, &spec).unwrap()
}

pub fn memory_ledger() -> JobLedger<MemoryJobRepository> {
    JobLedger::new(MemoryJobRepository::new(), catalog(), &LedgerConfig::default())
}

/// Build a job wired to the catalog's shared entities.
pub fn job_in<R: JobRepository>(
    ledger: &JobLedger<R>,
    id: &str,
    status: JobStatus,
    feature_sets: &[&str],
) -> Job {
    use sluice_core::ReferenceResolver;

    let catalog = ledger.catalog();
    Job::create(
        id,
        "",
        Runner::Direct,
        catalog.source("kafka-main").unwrap(),
        catalog.store("online").unwrap(),
        feature_sets
            .iter()
            .map(|n| catalog.feature_set(&format!("driver/{n}:1")).unwrap())
            .collect(),
        status,
    )
    .unwrap()
}

//! In-memory registry of the shared entities jobs refer to.
//!
//! The source, store, and feature set registries own these definitions; the
//! catalog only mirrors them so stored jobs can be rehydrated.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use sluice_core::{FeatureSet, ReferenceResolver, Source, Store};

use crate::error::StorageError;

const SOURCES_FILE: &str = "sources.json";
const STORES_FILE: &str = "stores.json";
const FEATURE_SETS_FILE: &str = "feature_sets.json";

#[derive(Debug, Default)]
pub struct ReferenceCatalog {
    sources: RwLock<HashMap<String, Arc<Source>>>,
    stores: RwLock<HashMap<String, Arc<Store>>>,
    feature_sets: RwLock<HashMap<String, Arc<FeatureSet>>>,
}

impl ReferenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&self, source: Source) -> Arc<Source> {
        let source = Arc::new(source);
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.id.clone(), source.clone());
        source
    }

    pub fn add_store(&self, store: Store) -> Arc<Store> {
        let store = Arc::new(store);
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(store.name.clone(), store.clone());
        store
    }

    pub fn add_feature_set(&self, feature_set: FeatureSet) -> Arc<FeatureSet> {
        let feature_set = Arc::new(feature_set);
        self.feature_sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(feature_set.id(), feature_set.clone());
        feature_set
    }

    /// Load `sources.json`, `stores.json` and `feature_sets.json` from `dir`.
    /// Missing files count as empty.
    pub fn load_dir(dir: &Path) -> Result<Self, StorageError> {
        let catalog = Self::new();
        for source in read_list::<Source>(&dir.join(SOURCES_FILE))? {
            catalog.add_source(source);
        }
        for store in read_list::<Store>(&dir.join(STORES_FILE))? {
            catalog.add_store(store);
        }
        for fs in read_list::<FeatureSet>(&dir.join(FEATURE_SETS_FILE))? {
            catalog.add_feature_set(fs);
        }
        info!(
            path = %dir.display(),
            sources = catalog.sources.read().unwrap_or_else(PoisonError::into_inner).len(),
            stores = catalog.stores.read().unwrap_or_else(PoisonError::into_inner).len(),
            feature_sets = catalog.feature_sets.read().unwrap_or_else(PoisonError::into_inner).len(),
            "reference catalog loaded"
        );
        Ok(catalog)
    }

    pub fn save_dir(&self, dir: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(dir)?;
        write_list(&dir.join(SOURCES_FILE), &self.sources)?;
        write_list(&dir.join(STORES_FILE), &self.stores)?;
        write_list(&dir.join(FEATURE_SETS_FILE), &self.feature_sets)?;
        Ok(())
    }
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn write_list<T: Serialize>(
    path: &Path,
    map: &RwLock<HashMap<String, Arc<T>>>,
) -> Result<(), StorageError> {
    let map = map.read().unwrap_or_else(PoisonError::into_inner);
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();
    let items: Vec<&T> = keys.into_iter().map(|k| &*map[k]).collect();
    std::fs::write(path, serde_json::to_string_pretty(&items)?)?;
    Ok(())
}

impl ReferenceResolver for ReferenceCatalog {
    fn source(&self, id: &str) -> Option<Arc<Source>> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn store(&self, name: &str) -> Option<Arc<Store>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn feature_set(&self, id: &str) -> Option<Arc<FeatureSet>> {
        self.feature_sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sluice_wire::{StoreMessage, SubscriptionMessage};

use crate::error::{ConversionError, EntityKind};
use crate::reference::{Identified, ToWire};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreKind {
    Redis,
    Bigquery,
    Cassandra,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Redis => "REDIS",
            StoreKind::Bigquery => "BIGQUERY",
            StoreKind::Cassandra => "CASSANDRA",
        }
    }
}

/// Feature sets a store wants to receive, as kept by the store registry.
/// Each field may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub project: String,
    pub name: String,
    pub version: String,
}

impl Subscription {
    pub fn new(project: &str, name: &str, version: &str) -> Self {
        Self {
            project: project.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// Sink that an ingestion job writes materialized features into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub kind: StoreKind,
    /// JSON object of kind-specific settings, as stored by the registry.
    pub config: Vec<u8>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Store {
    pub fn new(name: impl Into<String>, kind: StoreKind, config: BTreeMap<String, String>) -> Self {
        let object: serde_json::Map<String, Value> = config
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Self {
            name: name.into(),
            kind,
            config: Value::Object(object).to_string().into_bytes(),
            subscriptions: Vec::new(),
        }
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Identified for Store {
    const KIND: EntityKind = EntityKind::Store;

    fn key(&self) -> String {
        self.name.clone()
    }
}

impl ToWire for Store {
    type Message = StoreMessage;
    type Error = ConversionError;

    fn to_wire(&self) -> Result<StoreMessage, ConversionError> {
        let config: BTreeMap<String, String> = serde_json::from_slice(&self.config)
            .map_err(|e| ConversionError::new(EntityKind::Store, &self.name, e))?;
        Ok(StoreMessage {
            name: self.name.clone(),
            kind: self.kind.as_str().to_string(),
            config,
            subscriptions: self
                .subscriptions
                .iter()
                .map(|s| SubscriptionMessage {
                    project: s.project.clone(),
                    name: s.name.clone(),
                    version: s.version.clone(),
                })
                .collect(),
        })
    }
}

use serde::{Deserialize, Serialize};
use sluice_wire::{FeatureSetMessage, FeatureSpecMessage};

use crate::error::{ConversionError, EntityKind};
use crate::reference::{Identified, ToWire};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Value type name (e.g. "INT64", "FLOAT").
    pub value_type: String,
}

/// Decoded form of a feature set's stored spec blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSetSpec {
    pub entities: Vec<String>,
    pub features: Vec<FeatureSpec>,
    #[serde(default)]
    pub max_age_secs: u64,
}

/// A named, versioned grouping of features that jobs materialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub project: String,
    pub name: String,
    pub version: u32,
    /// JSON-encoded [`FeatureSetSpec`].
    pub spec: Vec<u8>,
}

impl FeatureSet {
    pub fn new(
        project: impl Into<String>,
        name: impl Into<String>,
        version: u32,
        spec: &FeatureSetSpec,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            project: project.into(),
            name: name.into(),
            version,
            spec: serde_json::to_vec(spec)?,
        })
    }

    /// `project/name:version`
    pub fn id(&self) -> String {
        format!("{}/{}:{}", self.project, self.name, self.version)
    }

    pub fn decode_spec(&self) -> Result<FeatureSetSpec, ConversionError> {
        serde_json::from_slice(&self.spec)
            .map_err(|e| ConversionError::new(EntityKind::FeatureSet, self.id(), e))
    }
}

impl Identified for FeatureSet {
    const KIND: EntityKind = EntityKind::FeatureSet;

    fn key(&self) -> String {
        self.id()
    }
}

impl ToWire for FeatureSet {
    type Message = FeatureSetMessage;
    type Error = ConversionError;

    fn to_wire(&self) -> Result<FeatureSetMessage, ConversionError> {
        let spec = self.decode_spec()?;
        Ok(FeatureSetMessage {
            id: self.id(),
            project: self.project.clone(),
            name: self.name.clone(),
            version: self.version,
            entities: spec.entities,
            features: spec
                .features
                .into_iter()
                .map(|f| FeatureSpecMessage {
                    name: f.name,
                    value_type: f.value_type,
                })
                .collect(),
            max_age_secs: spec.max_age_secs,
        })
    }
}

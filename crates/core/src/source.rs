use serde::{Deserialize, Serialize};
use sluice_wire::SourceMessage;

use crate::error::{ConversionError, EntityKind};
use crate::reference::{Identified, ToWire};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Kafka,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Kafka => "KAFKA",
        }
    }
}

/// Origin of the feature rows an ingestion job reads.
///
/// Connection settings are kept as the JSON blob the source registry stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub kind: SourceKind,
    pub config: Vec<u8>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KafkaSourceConfig {
    bootstrap_servers: String,
    topic: String,
}

impl Source {
    pub fn kafka(id: impl Into<String>, bootstrap_servers: &str, topic: &str) -> Self {
        let config = serde_json::json!({
            "bootstrap_servers": bootstrap_servers,
            "topic": topic,
        });
        Self {
            id: id.into(),
            kind: SourceKind::Kafka,
            config: config.to_string().into_bytes(),
            is_default: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.id
    }
}

impl Identified for Source {
    const KIND: EntityKind = EntityKind::Source;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl ToWire for Source {
    type Message = SourceMessage;
    type Error = ConversionError;

    fn to_wire(&self) -> Result<SourceMessage, ConversionError> {
        let cfg: KafkaSourceConfig = serde_json::from_slice(&self.config)
            .map_err(|e| ConversionError::new(EntityKind::Source, &self.id, e))?;
        Ok(SourceMessage {
            id: self.id.clone(),
            kind: self.kind.as_str().to_string(),
            bootstrap_servers: cfg.bootstrap_servers,
            topic: cfg.topic,
        })
    }
}

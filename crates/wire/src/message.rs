use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{IngestionJobMessage, IngestionJobStatus};
use crate::topics;

/// A job projection ready to publish.
///
/// `job_id` and `status` are lifted out of the payload so consumers can
/// route or drop snapshots without decoding them. The payload itself is the
/// MessagePack-encoded [`IngestionJobMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub topic: String,
    pub job_id: String,
    pub status: IngestionJobStatus,
    #[serde(with = "bin")]
    pub payload: Vec<u8>,
    pub taken_at: DateTime<Utc>,
    /// Payload schema version.
    #[serde(default = "default_version")]
    pub version: u16,
}

const CURRENT_VERSION: u16 = 1;

fn default_version() -> u16 {
    CURRENT_VERSION
}

impl JobSnapshot {
    pub fn new(job: &IngestionJobMessage) -> Result<Self, rmp_serde::encode::Error> {
        Ok(Self {
            topic: topics::JOB_SNAPSHOT.to_string(),
            job_id: job.id.clone(),
            status: job.status,
            payload: rmp_serde::to_vec_named(job)?,
            taken_at: Utc::now(),
            version: CURRENT_VERSION,
        })
    }

    pub fn decode(&self) -> Result<IngestionJobMessage, rmp_serde::decode::Error> {
        rmp_serde::from_slice(&self.payload)
    }
}

/// Writes the payload as a MessagePack bin; reads bin or a plain array.
mod bin {
    use std::fmt;

    use serde::de::{SeqAccess, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        d.deserialize_byte_buf(BytesVisitor)
    }

    struct BytesVisitor;

    impl<'de> Visitor<'de> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a byte buffer")
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Vec<u8>, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
            Ok(v)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(b) = seq.next_element()? {
                out.push(b);
            }
            Ok(out)
        }
    }
}

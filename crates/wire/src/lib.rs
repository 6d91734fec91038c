//! Wire representation of ingestion jobs for monitoring and orchestration clients.
//!
//! The DTOs here are self-contained and carry no domain logic. Domain types
//! project into them; clients decode them.

pub mod job;
pub mod message;
pub mod topics;

pub use job::{
    FeatureSetMessage, FeatureSpecMessage, IngestionJobMessage, IngestionJobStatus,
    SourceMessage, StoreMessage, SubscriptionMessage,
};
pub use message::JobSnapshot;

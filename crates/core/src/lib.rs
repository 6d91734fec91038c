pub mod config;
pub mod error;
pub mod feature_set;
pub mod job;
pub mod metrics;
pub mod projector;
pub mod reference;
pub mod source;
pub mod status;
pub mod store;

pub use config::Config;
pub use error::*;
pub use feature_set::{FeatureSet, FeatureSetSpec, FeatureSpec};
pub use job::{Job, JobRecord};
pub use metrics::Metrics;
pub use projector::{project, snapshot_envelope};
pub use reference::{Identified, Reference, ReferenceResolver, ToWire};
pub use source::{Source, SourceKind};
pub use status::{JobStatus, Runner, StatusClass, STATUS_TABLE};
pub use store::{Store, StoreKind, Subscription};

//! Persistence for ingestion jobs: record repositories, the shared-entity
//! catalog used to rehydrate them, and the ledger that serializes writers.

pub mod catalog;
pub mod error;
pub mod file;
pub mod ledger;
pub mod locks;
pub mod memory;
pub mod repository;

pub use catalog::ReferenceCatalog;
pub use error::StorageError;
pub use file::FileJobRepository;
pub use ledger::{JobLedger, StatusChange};
pub use locks::{JobGuard, JobLocks};
pub use memory::MemoryJobRepository;
pub use repository::JobRepository;

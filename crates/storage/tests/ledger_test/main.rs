//! Integration tests for the job ledger: lifecycle, concurrent writers,
//! retention purge, and the file-backed repository.

mod helpers;
mod lifecycle;
mod retention;

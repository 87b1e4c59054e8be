//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, LogEntry};

/// Read side of the period log. The prediction core only ever reads.
#[async_trait::async_trait]
pub trait LogStorePort: Send + Sync {
    /// All log entries for the current user, ordered by `start_date` ascending.
    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError>;
}

/// Write side of the period log. Used by the interactive shell and CSV import.
#[async_trait::async_trait]
pub trait LogWriterPort: Send + Sync {
    /// Persist a new entry. Returns the store-assigned id.
    async fn add_entry(&self, entry: &LogEntry) -> Result<i64, DomainError>;

    /// Persist all of `entries` or none of them. Returns ids in input order.
    async fn add_entries(&self, entries: &[LogEntry]) -> Result<Vec<i64>, DomainError>;

    /// Delete by id. Returns false if no such entry existed.
    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError>;
}

/// Static model artifacts (local directory, HTTP, ...). Names are relative,
/// e.g. `classifier/model.json`.
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

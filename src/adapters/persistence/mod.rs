//! Period log storage adapters and CSV transfer.

pub mod csv_utils;
pub mod memory_store;
pub mod sqlite_log_store;

pub use csv_utils::{entries_from_csv, entries_to_csv};
pub use memory_store::MemoryLogStore;
pub use sqlite_log_store::SqliteLogStore;

//! Infrastructure adapters. Implement outbound ports.
//!
//! Model artifacts and inference, log storage, interactive shell. Map errors to DomainError.

pub mod ml;
pub mod persistence;
pub mod ui;

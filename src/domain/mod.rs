//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod intervals;
pub mod responses;
pub mod rules;

pub use entities::{
    FlowIntensity, Intent, IntentMetadata, LogEntry, NormalizationMeta, PredictionResult,
    PredictionSource,
};
pub use errors::DomainError;
pub use intervals::{AcceptanceBand, cycle_intervals, sort_history};
pub use responses::{FALLBACK_RESPONSE, ResponseCatalog};
pub use rules::{IntentRule, RuleTable};

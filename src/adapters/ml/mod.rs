//! Model adapters. Dense-network inference over JSON artifacts and the
//! sources those artifacts are fetched from.

pub mod dense;
pub mod fs_source;
pub mod http_source;
pub mod loader;

pub use dense::{Activation, DenseLayer, DenseNetwork};
pub use fs_source::FsArtifactSource;
pub use http_source::HttpArtifactSource;
pub use loader::{load_cycle_model, load_intent_model};

//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by UI/adapter into the application
//! - Outbound: Called by application into infrastructure
//! - Inference: Trained models consumed by the use cases

pub mod inbound;
pub mod inference;
pub mod outbound;

pub use inbound::InputPort;
pub use inference::{
    CYCLE_FEATURES, ClassificationModel, CycleModel, IntentModel, RegressionModel,
};
pub use outbound::{ArtifactSource, LogStorePort, LogWriterPort};

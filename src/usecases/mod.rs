//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_service;
pub mod cycle_predictor;
pub mod empathy;
pub mod history_service;
pub mod intent_classifier;
pub mod model_gate;
pub mod report_service;
pub mod response_resolver;

pub use chat_service::{ChatReply, ChatService, Conversation};
pub use cycle_predictor::CyclePredictor;
pub use history_service::HistoryService;
pub use intent_classifier::{Classification, IntentClassifier, MatchOrigin};
pub use model_gate::{GateStatus, ModelGate};
pub use report_service::{CycleReport, ReportService};
pub use response_resolver::ConversationContext;

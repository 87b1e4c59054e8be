//! Domain entities. Pure data structures for the core business.
//!
//! No storage or IO types here; adapters map into these.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One user-recorded cycle event (one per logging action, not one per day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned id. `None` until persisted.
    pub id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow_intensity: Option<FlowIntensity>,
    pub symptoms: BTreeSet<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// New unsaved entry starting on `start_date`, created now.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            id: None,
            start_date,
            end_date: None,
            flow_intensity: None,
            symptoms: BTreeSet::new(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_flow(mut self, flow: FlowIntensity) -> Self {
        self.flow_intensity = Some(flow);
        self
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms.extend(symptoms.into_iter().map(Into::into));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntensity {
    Light,
    Medium,
    Heavy,
    Spotting,
}

impl FlowIntensity {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowIntensity::Light => "light",
            FlowIntensity::Medium => "medium",
            FlowIntensity::Heavy => "heavy",
            FlowIntensity::Spotting => "spotting",
        }
    }

    /// Parses the lowercase tag used in storage and CSV. Unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(FlowIntensity::Light),
            "medium" => Some(FlowIntensity::Medium),
            "heavy" => Some(FlowIntensity::Heavy),
            "spotting" => Some(FlowIntensity::Spotting),
            _ => None,
        }
    }
}

/// Which path produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Estimator,
    Statistical,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Estimator => write!(f, "estimator"),
            PredictionSource::Statistical => write!(f, "statistical"),
        }
    }
}

/// Next-period estimate. Never persisted; recomputed per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub next_date: NaiveDate,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub source: PredictionSource,
}

/// Support intent label. The vocabulary is closed but comes from artifacts,
/// so this wraps a string rather than an enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    pub const GENERAL: &'static str = "general";
    pub const PAIN_RELIEF: &'static str = "pain_relief";
    pub const CRAVINGS: &'static str = "cravings";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn general() -> Self {
        Self(Self::GENERAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_general(&self) -> bool {
        self.0 == Self::GENERAL
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Min-max normalization metadata shipped next to the cycle regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationMeta {
    pub input_min: Vec<f64>,
    pub input_max: Vec<f64>,
    #[serde(with = "scalar_or_first")]
    pub label_min: f64,
    #[serde(with = "scalar_or_first")]
    pub label_max: f64,
}

/// Classifier metadata: token vocabulary, output tags, responses per tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub vocab: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub responses: HashMap<String, Vec<String>>,
}

/// Label bounds are written either as a bare number or as `[number]`.
mod scalar_or_first {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScalarOrSeq {
        Scalar(f64),
        Seq(Vec<f64>),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match ScalarOrSeq::deserialize(deserializer)? {
            ScalarOrSeq::Scalar(v) => Ok(v),
            ScalarOrSeq::Seq(v) => v
                .first()
                .copied()
                .ok_or_else(|| D::Error::custom("empty label bound")),
        }
    }
}

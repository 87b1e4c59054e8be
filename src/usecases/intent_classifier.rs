//! Intent classification: keyword rules first, trained bag-of-words model second.

use crate::adapters::ml::load_intent_model;
use crate::domain::{DomainError, Intent, RuleTable};
use crate::ports::{ArtifactSource, IntentModel};
use crate::usecases::model_gate::{GateStatus, ModelGate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Model outputs below this probability are treated as "no idea".
pub const MIN_MODEL_CONFIDENCE: f64 = 0.5;

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrigin {
    Rule,
    Model,
    /// No rule matched and the model was unavailable or unsure.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub origin: MatchOrigin,
    /// Model probability for `Model` matches, and for `Default` when the model answered too weakly.
    pub confidence: Option<f64>,
}

impl Classification {
    fn default_general(confidence: Option<f64>) -> Self {
        Self {
            intent: Intent::general(),
            origin: MatchOrigin::Default,
            confidence,
        }
    }
}

/// Lowercase, drop everything but word characters and whitespace, split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Binary presence vector over `vocab`. Repeated tokens count once.
pub fn bag_of_words(tokens: &[String], vocab: &[String]) -> Vec<f64> {
    let present: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    vocab
        .iter()
        .map(|w| if present.contains(w.as_str()) { 1.0 } else { 0.0 })
        .collect()
}

/// Full pipeline over an optional loaded model. Never fails.
pub fn classify_with(rules: &RuleTable, model: Option<&IntentModel>, text: &str) -> Classification {
    let normalized = text.to_lowercase();
    if let Some(intent) = rules.lookup(&normalized) {
        return Classification {
            intent: intent.clone(),
            origin: MatchOrigin::Rule,
            confidence: None,
        };
    }

    let Some(model) = model else {
        return Classification::default_general(None);
    };

    match model_predict(model, text) {
        Ok((intent, confidence)) if confidence >= MIN_MODEL_CONFIDENCE => Classification {
            intent,
            origin: MatchOrigin::Model,
            confidence: Some(confidence),
        },
        Ok((intent, confidence)) => {
            debug!(%intent, confidence, "model below confidence threshold");
            Classification::default_general(Some(confidence))
        }
        Err(e) => {
            warn!(error = %e, "intent model inference failed");
            Classification::default_general(None)
        }
    }
}

/// Argmax tag and its probability.
fn model_predict(model: &IntentModel, text: &str) -> Result<(Intent, f64), DomainError> {
    let tokens = tokenize(text);
    let bow = bag_of_words(&tokens, &model.metadata.vocab);
    let probs = model.model.predict_proba(&bow)?;

    let (idx, confidence) = probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| DomainError::Inference("classifier produced no finite output".into()))?;

    let tag = model
        .metadata
        .tags
        .get(idx)
        .ok_or_else(|| DomainError::Inference(format!("class index {} has no tag", idx)))?;
    Ok((Intent::new(tag.clone()), confidence))
}

/// Classification service. Owns the rule table and lazily loads the model.
pub struct IntentClassifier {
    rules: RuleTable,
    source: Option<Arc<dyn ArtifactSource>>,
    gate: ModelGate<IntentModel>,
}

impl IntentClassifier {
    /// `source = None` runs rules-only.
    pub fn new(rules: RuleTable, source: Option<Arc<dyn ArtifactSource>>) -> Self {
        let gate = if source.is_some() {
            ModelGate::new("intent_classifier")
        } else {
            ModelGate::disabled("intent_classifier")
        };
        Self {
            rules,
            source,
            gate,
        }
    }

    pub fn with_model(rules: RuleTable, model: IntentModel) -> Self {
        Self {
            rules,
            source: None,
            gate: ModelGate::ready("intent_classifier", model),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub async fn warm_up(&self) -> GateStatus {
        self.model().await;
        self.gate.status()
    }

    pub fn model_status(&self) -> GateStatus {
        self.gate.status()
    }

    /// Model if already loaded. Never starts or waits for a load.
    pub fn loaded_model(&self) -> Option<Arc<IntentModel>> {
        self.gate.get()
    }

    /// True when the rule table alone decides `text`.
    pub fn rule_decides(&self, text: &str) -> bool {
        self.rules.lookup(&text.to_lowercase()).is_some()
    }

    /// Loaded model, waiting for an in-flight load. `None` when loading failed.
    pub async fn model(&self) -> Option<Arc<IntentModel>> {
        let source = self.source.clone();
        self.gate
            .get_or_init(|| async move {
                match source {
                    Some(src) => load_intent_model(src.as_ref()).await,
                    None => Err(DomainError::Artifact("no artifact source".into())),
                }
            })
            .await
    }

    pub async fn classify(&self, text: &str) -> Classification {
        if self.rule_decides(text) {
            return classify_with(&self.rules, None, text);
        }
        let model = self.model().await;
        classify_with(&self.rules, model.as_deref(), text)
    }
}

//! Next-period prediction.
//!
//! Tries the trained regressor first (when loaded and the history has at
//! least one interval in the estimator band), then falls back to averaging.
//! Prediction itself never fails: estimator problems degrade to the
//! statistical path and short histories take the cold-start branch.

use crate::adapters::ml::load_cycle_model;
use crate::domain::{
    AcceptanceBand, DomainError, LogEntry, NormalizationMeta, PredictionResult, PredictionSource,
    sort_history,
};
use crate::ports::{ArtifactSource, CYCLE_FEATURES, CycleModel, LogStorePort};
use crate::usecases::model_gate::{GateStatus, ModelGate};
use chrono::{Local, NaiveDate, TimeDelta};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assumed cycle length when nothing better is known.
pub const DEFAULT_CYCLE_DAYS: i64 = 28;
pub const DEFAULT_AGE: f64 = 25.0;
pub const DEFAULT_BMI: f64 = 22.0;

pub const COLD_START_CONFIDENCE: f64 = 0.5;
pub const ESTIMATOR_CONFIDENCE: f64 = 0.95;
pub const STATISTICAL_CONFIDENCE_HIGH: f64 = 0.9;
pub const STATISTICAL_CONFIDENCE_LOW: f64 = 0.7;

/// Number of most recent intervals fed to the regressor.
const HISTORY_SLOTS: usize = 3;

/// Predict from a history snapshot. `today` anchors the empty-history case.
pub fn predict_from_history(
    history: &[LogEntry],
    model: Option<&CycleModel>,
    today: NaiveDate,
) -> PredictionResult {
    let history: Cow<'_, [LogEntry]> = if history.is_sorted_by_key(|e| e.start_date) {
        Cow::Borrowed(history)
    } else {
        let mut owned = history.to_vec();
        sort_history(&mut owned);
        Cow::Owned(owned)
    };

    let Some(last) = history.last().map(|e| e.start_date) else {
        return cold_start(today);
    };
    if history.len() < 2 {
        return cold_start(last);
    }

    if let Some(model) = model {
        match estimate(&history, last, model) {
            Ok(Some(result)) => return result,
            Ok(None) => debug!("no interval inside estimator band; using statistical average"),
            Err(e) => warn!(error = %e, "estimator rejected; using statistical average"),
        }
    }

    statistical(&history, last)
}

fn cold_start(anchor: NaiveDate) -> PredictionResult {
    PredictionResult {
        next_date: add_days(anchor, DEFAULT_CYCLE_DAYS).unwrap_or(anchor),
        confidence: COLD_START_CONFIDENCE,
        source: PredictionSource::Statistical,
    }
}

/// `Ok(None)` when the estimator does not apply; `Err` when it ran and
/// produced something unusable.
fn estimate(
    history: &[LogEntry],
    last: NaiveDate,
    model: &CycleModel,
) -> Result<Option<PredictionResult>, DomainError> {
    let valid = AcceptanceBand::ESTIMATOR.valid_intervals(history);
    let Some(features) = estimator_features(&valid) else {
        return Ok(None);
    };
    debug!(?valid, ?features, "estimator features");

    let normalized = normalize(&features, &model.meta)?;
    let raw = model.model.predict(&normalized)?;
    let predicted = denormalize(raw, &model.meta);
    debug!(raw, predicted, "estimator output");

    if !predicted.is_finite() {
        return Err(DomainError::Inference(format!(
            "predicted cycle length is not finite ({})",
            predicted
        )));
    }
    let days = predicted.round();
    let next_date = if days.abs() < i64::MAX as f64 {
        add_days(last, days as i64)
    } else {
        None
    }
    .ok_or_else(|| {
        DomainError::Inference(format!("predicted cycle length {} out of date range", days))
    })?;

    Ok(Some(PredictionResult {
        next_date,
        confidence: ESTIMATOR_CONFIDENCE,
        source: PredictionSource::Estimator,
    }))
}

/// Six-feature regressor input from estimator-band intervals (chronological).
///
/// Layout: the last three intervals most recent first, then the mean of all
/// valid intervals, then default age and BMI. With fewer than three
/// intervals the oldest one is repeated to fill the remaining slots.
/// `None` when there are no valid intervals.
pub fn estimator_features(valid: &[i64]) -> Option<[f64; CYCLE_FEATURES]> {
    let oldest_known = *valid.first()?;
    let mean = valid.iter().sum::<i64>() as f64 / valid.len() as f64;

    let recent = &valid[valid.len().saturating_sub(HISTORY_SLOTS)..];
    let mut slots: Vec<i64> = vec![oldest_known; HISTORY_SLOTS - recent.len()];
    slots.extend_from_slice(recent);
    // `recent` starts at the oldest valid interval whenever padding happens.
    slots.reverse();

    Some([
        slots[0] as f64,
        slots[1] as f64,
        slots[2] as f64,
        mean,
        DEFAULT_AGE,
        DEFAULT_BMI,
    ])
}

/// Elementwise `(x - min) / (max - min)`. Degenerate bounds yield non-finite
/// values that surface as a rejected prediction.
pub fn normalize(
    features: &[f64; CYCLE_FEATURES],
    meta: &NormalizationMeta,
) -> Result<[f64; CYCLE_FEATURES], DomainError> {
    if meta.input_min.len() != CYCLE_FEATURES || meta.input_max.len() != CYCLE_FEATURES {
        return Err(DomainError::Inference(
            "normalization metadata has wrong width".into(),
        ));
    }
    let mut out = [0.0; CYCLE_FEATURES];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (features[i] - meta.input_min[i]) / (meta.input_max[i] - meta.input_min[i]);
    }
    Ok(out)
}

pub fn denormalize(y: f64, meta: &NormalizationMeta) -> f64 {
    y * (meta.label_max - meta.label_min) + meta.label_min
}

fn statistical(history: &[LogEntry], last: NaiveDate) -> PredictionResult {
    let valid = AcceptanceBand::STATISTICAL.valid_intervals(history);
    let avg = average_days(&valid).unwrap_or(DEFAULT_CYCLE_DAYS);
    debug!(?valid, avg, "statistical average");

    PredictionResult {
        next_date: add_days(last, avg).unwrap_or(last),
        confidence: if valid.len() > 3 {
            STATISTICAL_CONFIDENCE_HIGH
        } else {
            STATISTICAL_CONFIDENCE_LOW
        },
        source: PredictionSource::Statistical,
    }
}

/// Rounded mean, half away from zero. `None` for an empty slice.
pub fn average_days(intervals: &[i64]) -> Option<i64> {
    if intervals.is_empty() {
        return None;
    }
    let mean = intervals.iter().sum::<i64>() as f64 / intervals.len() as f64;
    Some(mean.round() as i64)
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Prediction service. Reads the log store and lazily loads the regressor.
pub struct CyclePredictor {
    store: Arc<dyn LogStorePort>,
    source: Option<Arc<dyn ArtifactSource>>,
    gate: ModelGate<CycleModel>,
}

impl CyclePredictor {
    /// `source = None` runs statistical-only.
    pub fn new(store: Arc<dyn LogStorePort>, source: Option<Arc<dyn ArtifactSource>>) -> Self {
        let gate = if source.is_some() {
            ModelGate::new("cycle_regressor")
        } else {
            ModelGate::disabled("cycle_regressor")
        };
        Self {
            store,
            source,
            gate,
        }
    }

    /// Service with an already-loaded model.
    pub fn with_model(store: Arc<dyn LogStorePort>, model: CycleModel) -> Self {
        Self {
            store,
            source: None,
            gate: ModelGate::ready("cycle_regressor", model),
        }
    }

    /// Loads the regressor now instead of on first prediction.
    pub async fn warm_up(&self) -> GateStatus {
        self.model().await;
        self.gate.status()
    }

    pub fn model_status(&self) -> GateStatus {
        self.gate.status()
    }

    async fn model(&self) -> Option<Arc<CycleModel>> {
        let source = self.source.clone();
        self.gate
            .get_or_init(|| async move {
                match source {
                    Some(src) => load_cycle_model(src.as_ref()).await,
                    None => Err(DomainError::Artifact("no artifact source".into())),
                }
            })
            .await
    }

    /// Predict relative to the local calendar date.
    pub async fn predict_next_period(&self) -> Result<PredictionResult, DomainError> {
        self.predict_next_period_on(Local::now().date_naive()).await
    }

    /// Predict with an explicit `today`. Only store read errors propagate.
    pub async fn predict_next_period_on(
        &self,
        today: NaiveDate,
    ) -> Result<PredictionResult, DomainError> {
        let history = self.store.all_entries().await?;
        let model = self.model().await;
        let result = predict_from_history(&history, model.as_deref(), today);
        debug!(
            entries = history.len(),
            next = %result.next_date,
            confidence = result.confidence,
            source = %result.source,
            "prediction"
        );
        Ok(result)
    }
}

//! Artifact loading. Fetches JSON artifacts, validates shapes against their
//! metadata and wraps them in the inference port types.

use super::dense::DenseNetwork;
use crate::domain::{DomainError, IntentMetadata, NormalizationMeta};
use crate::ports::{ArtifactSource, CYCLE_FEATURES, CycleModel, IntentModel};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

pub const CLASSIFIER_MODEL: &str = "classifier/model.json";
pub const CLASSIFIER_METADATA: &str = "classifier/metadata.json";
pub const CYCLE_MODEL: &str = "cycle_prediction/model.json";
pub const CYCLE_NORMALIZATION: &str = "cycle_prediction/normalization_meta.json";

async fn fetch_json<T: DeserializeOwned>(
    source: &dyn ArtifactSource,
    name: &str,
) -> Result<T, DomainError> {
    let bytes = source.fetch(name).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DomainError::Artifact(format!("parse {}: {}", name, e)))
}

/// Load and validate the intent classifier.
pub async fn load_intent_model(source: &dyn ArtifactSource) -> Result<IntentModel, DomainError> {
    let network: DenseNetwork = fetch_json(source, CLASSIFIER_MODEL).await?;
    let metadata: IntentMetadata = fetch_json(source, CLASSIFIER_METADATA).await?;
    network.validate()?;

    if metadata.vocab.is_empty() || metadata.tags.is_empty() {
        return Err(DomainError::Artifact(
            "classifier metadata has empty vocab or tags".into(),
        ));
    }
    if network.input_width() != metadata.vocab.len() {
        return Err(DomainError::Artifact(format!(
            "classifier expects {} inputs, vocab has {} tokens",
            network.input_width(),
            metadata.vocab.len()
        )));
    }
    if network.output_width() != metadata.tags.len() {
        return Err(DomainError::Artifact(format!(
            "classifier emits {} classes, metadata has {} tags",
            network.output_width(),
            metadata.tags.len()
        )));
    }

    info!(
        source = %source.describe(),
        vocab = metadata.vocab.len(),
        tags = metadata.tags.len(),
        "intent classifier loaded"
    );
    Ok(IntentModel::new(Arc::new(network), metadata))
}

/// Load and validate the cycle-length regressor.
pub async fn load_cycle_model(source: &dyn ArtifactSource) -> Result<CycleModel, DomainError> {
    let network: DenseNetwork = fetch_json(source, CYCLE_MODEL).await?;
    let meta: NormalizationMeta = fetch_json(source, CYCLE_NORMALIZATION).await?;
    network.validate()?;

    if network.input_width() != CYCLE_FEATURES || network.output_width() != 1 {
        return Err(DomainError::Artifact(format!(
            "cycle regressor must map {} features to 1 output, got {} -> {}",
            CYCLE_FEATURES,
            network.input_width(),
            network.output_width()
        )));
    }
    if meta.input_min.len() != CYCLE_FEATURES || meta.input_max.len() != CYCLE_FEATURES {
        return Err(DomainError::Artifact(format!(
            "normalization vectors must have {} entries (min {}, max {})",
            CYCLE_FEATURES,
            meta.input_min.len(),
            meta.input_max.len()
        )));
    }

    info!(source = %source.describe(), "cycle regressor loaded");
    Ok(CycleModel {
        model: Arc::new(network),
        meta,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::adapters::ml::FsArtifactSource;

    #[tokio::test]
    async fn loads_valid_classifier() {
        let dir = tempfile::tempdir().unwrap();
        write_identity_classifier(dir.path(), &["cramp", "sad"], &["pain_relief", "sadness"], 5.0);
        let model = load_intent_model(&FsArtifactSource::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(model.metadata.tags, vec!["pain_relief", "sadness"]);
        assert!(model.catalog.contains("general"));
    }

    #[tokio::test]
    async fn classifier_vocab_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_identity_classifier(dir.path(), &["cramp", "sad"], &["pain_relief", "sadness"], 5.0);
        let metadata = serde_json::json!({ "vocab": ["cramp"], "tags": ["pain_relief", "sadness"] });
        std::fs::write(dir.path().join("classifier/metadata.json"), metadata.to_string()).unwrap();
        assert!(matches!(
            load_intent_model(&FsArtifactSource::new(dir.path())).await,
            Err(DomainError::Artifact(_))
        ));
    }

    #[tokio::test]
    async fn loads_valid_regressor() {
        let dir = tempfile::tempdir().unwrap();
        write_mean_regressor(dir.path());
        let cycle = load_cycle_model(&FsArtifactSource::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(cycle.meta.label_max, 100.0);
        let y = cycle.model.predict(&[0.3; 6]).unwrap();
        assert!((y - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn regressor_with_short_normalization_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_mean_regressor(dir.path());
        let meta = serde_json::json!({
            "inputMin": [0, 0, 0], "inputMax": [1, 1, 1], "labelMin": 0, "labelMax": 1
        });
        std::fs::write(
            dir.path().join("cycle_prediction/normalization_meta.json"),
            meta.to_string(),
        )
        .unwrap();
        assert!(load_cycle_model(&FsArtifactSource::new(dir.path())).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("cycle_prediction")).unwrap();
        std::fs::write(dir.path().join("cycle_prediction/model.json"), b"{not json").unwrap();
        assert!(matches!(
            load_cycle_model(&FsArtifactSource::new(dir.path())).await,
            Err(DomainError::Artifact(_))
        ));
    }
}

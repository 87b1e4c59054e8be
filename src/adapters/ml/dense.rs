//! Feed-forward dense network. Plain-f64 forward pass over JSON weights.
//!
//! Kernel layout matches the usual `[inputs][units]` convention:
//! `out[j] = activation(sum_i x[i] * weights[i][j] + bias[j])`.

use crate::domain::DomainError;
use crate::ports::{ClassificationModel, RegressionModel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Softmax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn input_width(&self) -> usize {
        self.weights.len()
    }

    pub fn output_width(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.weights) {
            for (o, w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        apply_activation(self.activation, &mut out);
        out
    }
}

fn apply_activation(activation: Activation, values: &mut [f64]) {
    match activation {
        Activation::Linear => {}
        Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
        Activation::Sigmoid => values
            .iter_mut()
            .for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
        Activation::Softmax => {
            // Shift by the max for stability. NaN inputs propagate.
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut sum = 0.0;
            for v in values.iter_mut() {
                *v = (*v - max).exp();
                sum += *v;
            }
            values.iter_mut().for_each(|v| *v /= sum);
        }
    }
}

/// Sequential stack of dense layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Checks every kernel is rectangular and consecutive layers chain.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.layers.is_empty() {
            return Err(DomainError::Artifact("network has no layers".into()));
        }
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(DomainError::Artifact(format!("layer {} has no inputs", idx)));
            }
            if let Some(row) = layer
                .weights
                .iter()
                .position(|r| r.len() != layer.output_width())
            {
                return Err(DomainError::Artifact(format!(
                    "layer {} row {} has {} columns, bias has {}",
                    idx,
                    row,
                    layer.weights[row].len(),
                    layer.output_width()
                )));
            }
            if idx > 0 {
                let prev = self.layers[idx - 1].output_width();
                if prev != layer.input_width() {
                    return Err(DomainError::Artifact(format!(
                        "layer {} expects {} inputs but layer {} emits {}",
                        idx,
                        layer.input_width(),
                        idx - 1,
                        prev
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map(DenseLayer::input_width).unwrap_or(0)
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map(DenseLayer::output_width).unwrap_or(0)
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>, DomainError> {
        if input.len() != self.input_width() {
            return Err(DomainError::Inference(format!(
                "expected {} inputs, got {}",
                self.input_width(),
                input.len()
            )));
        }
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        Ok(activations)
    }
}

impl RegressionModel for DenseNetwork {
    fn predict(&self, features: &[f64]) -> Result<f64, DomainError> {
        self.forward(features)?
            .first()
            .copied()
            .ok_or_else(|| DomainError::Inference("regressor produced no output".into()))
    }
}

impl ClassificationModel for DenseNetwork {
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>, DomainError> {
        self.forward(input)
    }
}

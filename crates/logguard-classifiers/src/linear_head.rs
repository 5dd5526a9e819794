//! Trained linear classifier over sentence embeddings
//!
//! The artifact is a safetensors file with a `weight` matrix of shape
//! `[num_labels, dim]` and an optional `bias` of shape `[num_labels]`. Label
//! names are not stored in the file; they come from configuration in
//! weight-row order.

use crate::model_config::ClassifierArtifactConfig;
use crate::scorer::LabelHead;
use aho_corasick::AhoCorasick;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module};
use logguard_core::{Category, Error, Result};
use std::path::Path;
use tracing::{info, warn};

/// Linear decision function `W·x + b` with argmax over labels.
///
/// A single weight row with two labels is the binary form: a positive score
/// selects the second label.
pub struct LinearHead {
    linear: Linear,
    labels: Vec<Category>,
    input_dim: usize,
    device: Device,
}

impl std::fmt::Debug for LinearHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearHead")
            .field("labels", &self.labels)
            .field("input_dim", &self.input_dim)
            .finish()
    }
}

impl LinearHead {
    /// Build a head from weight and bias tensors
    pub fn from_tensors(weight: Tensor, bias: Option<Tensor>, labels: Vec<Category>) -> Result<Self> {
        let device = weight.device().clone();
        let weight = weight
            .to_dtype(DType::F32)
            .map_err(|e| Error::model(format!("Failed to convert weight to f32: {}", e)))?;
        let (rows, input_dim) = weight
            .dims2()
            .map_err(|e| Error::model(format!("Weight must be a 2-D matrix: {}", e)))?;

        let binary = rows == 1 && labels.len() == 2;
        if !binary && rows != labels.len() {
            return Err(Error::model(format!(
                "Classifier has {} weight rows but {} labels are configured",
                rows,
                labels.len()
            )));
        }
        if let Some(label) = labels.iter().find(|l| !l.is_assignable()) {
            return Err(Error::model(format!(
                "Reserved label '{}' cannot be a classifier output",
                label
            )));
        }

        let bias = match bias {
            Some(bias) => {
                let bias = bias
                    .to_dtype(DType::F32)
                    .map_err(|e| Error::model(format!("Failed to convert bias to f32: {}", e)))?;
                let len = bias
                    .dims1()
                    .map_err(|e| Error::model(format!("Bias must be a vector: {}", e)))?;
                if len != rows {
                    return Err(Error::model(format!(
                        "Bias has {} entries, expected {}",
                        len, rows
                    )));
                }
                Some(bias)
            }
            None => None,
        };

        Ok(Self {
            linear: Linear::new(weight, bias),
            labels,
            input_dim,
            device,
        })
    }

    /// Parse a head from safetensors bytes
    pub fn from_bytes(bytes: &[u8], labels: Vec<Category>) -> Result<Self> {
        let device = Device::Cpu;
        let mut tensors = candle_core::safetensors::load_buffer(bytes, &device)
            .map_err(|e| Error::model(format!("Failed to deserialize classifier: {}", e)))?;

        let weight = tensors
            .remove("weight")
            .ok_or_else(|| Error::model("Classifier artifact has no 'weight' tensor"))?;
        let bias = tensors.remove("bias");

        Self::from_tensors(weight, bias, labels)
    }

    /// Load the artifact named by `config`.
    ///
    /// Files that went through a text-mode transfer can come back with every
    /// LF turned into CRLF. When the direct parse fails and repair is enabled,
    /// the bytes are normalized once and parsed again; a second failure is
    /// final.
    pub fn load(config: &ClassifierArtifactConfig) -> Result<Self> {
        let path = config.path.as_path();
        if !path.exists() {
            return Err(Error::model(format!(
                "Classifier file not found: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let head = match Self::from_bytes(&bytes, config.labels.clone()) {
            Ok(head) => head,
            Err(first) if config.repair_line_endings => {
                warn!(
                    "Classifier {} failed to load ({}), retrying with normalized line endings",
                    path.display(),
                    first
                );
                Self::load_repaired(path, &bytes, config.labels.clone())?
            }
            Err(e) => return Err(e),
        };

        info!(
            "Loaded linear classifier from {} ({} labels, dim {})",
            path.display(),
            head.labels.len(),
            head.input_dim
        );
        Ok(head)
    }

    fn load_repaired(path: &Path, bytes: &[u8], labels: Vec<Category>) -> Result<Self> {
        let repaired = normalize_line_endings(bytes)?;
        if repaired.len() == bytes.len() {
            return Err(Error::model(format!(
                "Classifier {} is unreadable and contains no CRLF sequences to repair",
                path.display()
            )));
        }

        Self::from_bytes(&repaired, labels).map_err(|e| {
            Error::model(format!(
                "Classifier {} failed to load even after repair: {}",
                path.display(),
                e
            ))
        })
    }

    /// Labels in weight-row order
    pub fn labels(&self) -> &[Category] {
        &self.labels
    }

    /// Raw decision scores, one per weight row
    pub fn decision_function(&self, embedding: &[f32]) -> Result<Vec<f32>> {
        if embedding.len() != self.input_dim {
            return Err(Error::scorer(format!(
                "Embedding has dimension {}, classifier expects {}",
                embedding.len(),
                self.input_dim
            )));
        }

        let input = Tensor::from_slice(embedding, (1, self.input_dim), &self.device)
            .map_err(|e| Error::scorer(format!("Failed to create input tensor: {}", e)))?;
        self.linear
            .forward(&input)
            .and_then(|logits| logits.squeeze(0))
            .and_then(|logits| logits.to_vec1::<f32>())
            .map_err(|e| Error::scorer(format!("Classifier forward pass failed: {}", e)))
    }
}

impl LabelHead for LinearHead {
    fn predict(&self, embedding: &[f32]) -> Result<Category> {
        let scores = self.decision_function(embedding)?;

        if scores.len() == 1 && self.labels.len() == 2 {
            return Ok(if scores[0] > 0.0 {
                self.labels[1]
            } else {
                self.labels[0]
            });
        }

        let best = scores
            .iter()
            .enumerate()
            .fold(None::<(usize, f32)>, |best, (idx, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((idx, score)),
            })
            .map(|(idx, _)| idx)
            .ok_or_else(|| Error::scorer("Classifier produced no scores"))?;

        self.labels
            .get(best)
            .copied()
            .ok_or_else(|| Error::scorer(format!("No label configured for class {}", best)))
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }
}

/// Replace every CRLF with LF
pub fn normalize_line_endings(bytes: &[u8]) -> Result<Vec<u8>> {
    let matcher = AhoCorasick::new(["\r\n"])
        .map_err(|e| Error::internal(format!("Failed to build line-ending matcher: {}", e)))?;
    Ok(matcher.replace_all_bytes(bytes, &["\n"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(weights: &[f32], rows: usize, bias: &[f32], labels: Vec<Category>) -> LinearHead {
        let dim = weights.len() / rows;
        let weight = Tensor::from_slice(weights, (rows, dim), &Device::Cpu).unwrap();
        let bias = Tensor::from_slice(bias, rows, &Device::Cpu).unwrap();
        LinearHead::from_tensors(weight, Some(bias), labels).unwrap()
    }

    #[test]
    fn test_argmax_prediction() {
        let head = head(
            &[1.0, 0.0, 0.0, 1.0, -1.0, -1.0],
            3,
            &[0.0, 0.0, 0.5],
            vec![Category::NetworkIssue, Category::UserAction, Category::WebError],
        );

        assert_eq!(head.input_dim(), 2);
        assert_eq!(head.predict(&[0.9, 0.1]).unwrap(), Category::NetworkIssue);
        assert_eq!(head.predict(&[0.1, 0.9]).unwrap(), Category::UserAction);
        assert_eq!(head.predict(&[0.0, 0.0]).unwrap(), Category::WebError);
    }

    #[test]
    fn test_binary_head() {
        let head = head(
            &[2.0, -1.0],
            1,
            &[0.0],
            vec![Category::WebError, Category::WebSuccess],
        );

        assert_eq!(head.predict(&[1.0, 0.0]).unwrap(), Category::WebSuccess);
        assert_eq!(head.predict(&[0.0, 1.0]).unwrap(), Category::WebError);
    }

    #[test]
    fn test_dimension_mismatch_is_a_scorer_error() {
        let head = head(&[1.0, 1.0], 1, &[0.0], vec![Category::WebError, Category::WebSuccess]);
        let err = head.predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::Scorer(_)));
    }

    #[test]
    fn test_label_count_must_match_rows() {
        let weight = Tensor::from_slice(&[1.0f32, 0.0, 0.0, 1.0], (2, 2), &Device::Cpu).unwrap();
        let err = LinearHead::from_tensors(weight, None, vec![Category::UserAction]).unwrap_err();
        assert!(err.to_string().contains("2 weight rows"));
    }

    #[test]
    fn test_reserved_labels_rejected() {
        let weight = Tensor::from_slice(&[1.0f32, 0.0, 0.0, 1.0], (2, 2), &Device::Cpu).unwrap();
        let result = LinearHead::from_tensors(
            weight,
            None,
            vec![Category::UserAction, Category::Unknown],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_line_endings() {
        let fixed = normalize_line_endings(b"a\r\nb\r\n\nc\r").unwrap();
        assert_eq!(fixed, b"a\nb\n\nc\r");
    }
}

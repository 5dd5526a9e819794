//! Semantic scorer configuration structures

use logguard_core::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default sentence-embedding model
pub const DEFAULT_EMBEDDER_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Configuration of the embedding + linear-classifier fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Set to false for rule-only operation
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// When the scorer is acquired
    #[serde(default)]
    pub load: LoadMode,

    /// Sentence embedder settings
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Trained classifier head settings
    #[serde(default)]
    pub classifier: ClassifierArtifactConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            load: LoadMode::default(),
            embedder: EmbedderConfig::default(),
            classifier: ClassifierArtifactConfig::default(),
        }
    }
}

/// Scorer acquisition timing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// On the first input no rule matches
    #[default]
    Lazy,
    /// At startup
    Eager,
}

/// Where model files come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Local directory holding config.json, tokenizer and weights
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::HuggingFace {
            repo: DEFAULT_EMBEDDER_REPO.to_string(),
            revision: default_revision(),
        }
    }
}

fn default_revision() -> String {
    "main".to_string()
}

/// How token embeddings are reduced to one sentence vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolingStrategy {
    /// Attention-masked mean over tokens
    #[default]
    Mean,
    /// First ([CLS]) token
    Cls,
}

impl PoolingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Cls => "cls",
        }
    }
}

/// Sentence embedder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub source: ModelSource,

    /// Device to run on (cpu, cuda, mps)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length in tokens
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default)]
    pub pooling: PoolingStrategy,

    /// L2-normalize the pooled vector
    #[serde(default = "default_true")]
    pub normalize: bool,
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    256
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::default(),
            device: default_device(),
            max_length: default_max_length(),
            pooling: PoolingStrategy::default(),
            normalize: true,
        }
    }
}

/// Trained linear classifier artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifactConfig {
    /// safetensors file holding `weight` [labels, dim] and `bias` [labels]
    #[serde(default = "default_classifier_path")]
    pub path: PathBuf,

    /// Labels in weight-row order
    #[serde(default = "default_labels")]
    pub labels: Vec<Category>,

    /// Retry once with CRLF normalized to LF when the file fails to parse
    #[serde(default = "default_true")]
    pub repair_line_endings: bool,
}

fn default_classifier_path() -> PathBuf {
    PathBuf::from("models").join("model_lr.safetensors")
}

/// Assignable categories sorted by name, the order a trainer that sorts its
/// class list produces.
fn default_labels() -> Vec<Category> {
    let mut labels: Vec<Category> = Category::ALL
        .iter()
        .copied()
        .filter(Category::is_assignable)
        .collect();
    labels.sort_by_key(|c| c.as_str());
    labels
}

impl Default for ClassifierArtifactConfig {
    fn default() -> Self {
        Self {
            path: default_classifier_path(),
            labels: default_labels(),
            repair_line_endings: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scorer_config() {
        let yaml = r#"
enabled: true
load: eager
embedder:
  source:
    type: local
    path: "./models/minilm"
  device: cpu
  max_length: 128
  pooling: cls
  normalize: false
classifier:
  path: "./models/head.safetensors"
  labels: ["Security Alert", "User Action"]
"#;

        let config: ScorerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.load, LoadMode::Eager);
        assert_eq!(config.embedder.max_length, 128);
        assert_eq!(config.embedder.pooling, PoolingStrategy::Cls);
        assert!(!config.embedder.normalize);
        assert!(config.classifier.repair_line_endings);
        assert_eq!(
            config.classifier.labels,
            vec![Category::SecurityAlert, Category::UserAction]
        );

        match &config.embedder.source {
            ModelSource::Local { path } => assert_eq!(path.to_str().unwrap(), "./models/minilm"),
            _ => panic!("Expected local source"),
        }
    }

    #[test]
    fn test_defaults() {
        let config: ScorerConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.enabled);
        assert_eq!(config.load, LoadMode::Lazy);
        assert_eq!(
            config.embedder.source,
            ModelSource::HuggingFace {
                repo: DEFAULT_EMBEDDER_REPO.to_string(),
                revision: "main".to_string(),
            }
        );
        assert_eq!(config.classifier.labels.len(), 9);
        assert_eq!(config.classifier.labels[0], Category::ApplicationError);
        assert_eq!(config.classifier.labels[8], Category::WebSuccess);
    }
}

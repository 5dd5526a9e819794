//! LogGuard Classifiers
//!
//! Hybrid log-line classification. An ordered table of case-insensitive
//! regular expressions is consulted first; lines no rule recognizes fall
//! through to a semantic scorer (sentence embedding + linear classifier).
//!
//! The scorer is acquired at most once per [`HybridClassifier`], on the first
//! line that needs it. When it cannot be acquired the classifier keeps
//! working in regex-only mode.

pub mod builtin_rules;
pub mod config;
pub mod embedder;
pub mod hybrid;
pub mod linear_head;
pub mod loader;
pub mod model_config;
pub mod rules;
pub mod scorer;

pub use config::{LogGuardConfig, RuleSource, RulesConfig};
pub use embedder::SentenceEmbedder;
pub use hybrid::HybridClassifier;
pub use linear_head::LinearHead;
pub use loader::ModelScorerLoader;
pub use model_config::{
    ClassifierArtifactConfig, EmbedderConfig, LoadMode, ModelSource, PoolingStrategy, ScorerConfig,
};
pub use rules::{Rule, RuleMatch, RuleSet};
pub use scorer::{
    Embedder, LabelHead, NoScorer, ReadyScorer, Scorer, ScorerLoad, ScorerLoader, ScorerStatus,
    SemanticScorer, Unavailable,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::LogGuardConfig;
    pub use crate::hybrid::HybridClassifier;
    pub use crate::rules::{Rule, RuleSet};
    pub use crate::scorer::{Scorer, ScorerLoader, ScorerStatus};
    pub use logguard_core::{Category, ClassificationResult, Method};
}

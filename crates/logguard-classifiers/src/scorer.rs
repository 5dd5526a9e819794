//! Semantic scorer seam
//!
//! The hybrid classifier only knows that a scorer maps text to a label and may
//! fail. Everything behind that (tokenizer, encoder, trained head) is an
//! implementation detail of the types in this module and its siblings.

use logguard_core::{Category, Result};
use std::fmt;
use std::sync::Arc;

/// Text to label fallback used when no rule matches
pub trait Scorer: Send + Sync {
    /// Embed the text and predict its category
    fn embed_and_predict(&self, text: &str) -> Result<Category>;

    /// Scorer name, used in logs
    fn name(&self) -> &str;
}

/// Maps text to a fixed-size embedding vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimensionality, when known up front
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Maps an embedding vector to a category
pub trait LabelHead: Send + Sync {
    fn predict(&self, embedding: &[f32]) -> Result<Category>;

    /// Expected input dimensionality
    fn input_dim(&self) -> usize;
}

/// Scorer composed of an embedder and a trained head
pub struct SemanticScorer {
    name: String,
    embedder: Arc<dyn Embedder>,
    head: Arc<dyn LabelHead>,
}

impl SemanticScorer {
    pub fn new(
        name: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        head: Arc<dyn LabelHead>,
    ) -> Self {
        Self {
            name: name.into(),
            embedder,
            head,
        }
    }
}

impl Scorer for SemanticScorer {
    fn embed_and_predict(&self, text: &str) -> Result<Category> {
        let embedding = self.embedder.embed(text)?;
        self.head.predict(&embedding)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Which parts of the scorer could not be acquired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unavailable {
    /// Embedder failure, if any
    pub embedder: Option<String>,

    /// Classifier head failure, if any
    pub classifier: Option<String>,

    /// Scorer switched off by configuration
    pub disabled: bool,
}

impl Unavailable {
    /// Scorer intentionally not configured
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Default::default()
        }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            return f.write_str("scorer disabled");
        }

        let mut parts = Vec::new();
        if let Some(e) = &self.embedder {
            parts.push(format!("embedder: {}", e));
        }
        if let Some(e) = &self.classifier {
            parts.push(format!("classifier: {}", e));
        }
        if parts.is_empty() {
            f.write_str("scorer unavailable")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

/// Outcome of a one-time scorer acquisition
#[derive(Clone)]
pub enum ScorerLoad {
    Ready(Arc<dyn Scorer>),
    Unavailable(Unavailable),
}

impl ScorerLoad {
    /// The scorer, if acquisition succeeded
    pub fn scorer(&self) -> Option<&Arc<dyn Scorer>> {
        match self {
            Self::Ready(scorer) => Some(scorer),
            Self::Unavailable(_) => None,
        }
    }
}

impl fmt::Debug for ScorerLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(scorer) => f.debug_tuple("Ready").field(&scorer.name()).finish(),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// Produces a scorer or reports why it cannot.
///
/// Implementations are called at most once per classifier; they should log
/// their own failures since the classifier only records the outcome.
pub trait ScorerLoader: Send + Sync {
    fn load(&self) -> ScorerLoad;
}

/// Loader handing out a scorer that was built up front
pub struct ReadyScorer(pub Arc<dyn Scorer>);

impl ScorerLoader for ReadyScorer {
    fn load(&self) -> ScorerLoad {
        ScorerLoad::Ready(Arc::clone(&self.0))
    }
}

/// Loader for rule-only operation
pub struct NoScorer;

impl ScorerLoader for NoScorer {
    fn load(&self) -> ScorerLoad {
        ScorerLoad::Unavailable(Unavailable::disabled())
    }
}

/// Current state of the scorer slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScorerStatus {
    /// Acquisition has not been attempted yet
    Pending,
    /// Scorer loaded and in use
    Ready { name: String },
    /// Acquisition failed or is disabled; rule-only mode
    Unavailable(Unavailable),
}

impl fmt::Display for ScorerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending (not loaded yet)"),
            Self::Ready { name } => write!(f, "ready ({})", name),
            Self::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}

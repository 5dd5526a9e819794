//! One-shot acquisition of the embedding + linear-classifier scorer

use crate::embedder::SentenceEmbedder;
use crate::linear_head::LinearHead;
use crate::model_config::ScorerConfig;
use crate::scorer::{Embedder, LabelHead, ScorerLoad, ScorerLoader, SemanticScorer, Unavailable};
use logguard_core::Result;
use std::sync::Arc;
use tracing::{info, warn};

type EmbedderFactory = Box<dyn Fn() -> Result<Arc<dyn Embedder>> + Send + Sync>;
type HeadFactory = Box<dyn Fn() -> Result<Arc<dyn LabelHead>> + Send + Sync>;

/// Loads the embedder and the classifier head independently.
///
/// Both halves are always attempted so a single acquisition reports every
/// missing piece. The scorer is ready only when both load and their
/// dimensions agree.
pub struct ModelScorerLoader {
    name: String,
    enabled: bool,
    embedder: EmbedderFactory,
    head: HeadFactory,
}

impl ModelScorerLoader {
    /// Loader for the configured sentence embedder and linear head
    pub fn from_config(config: &ScorerConfig) -> Self {
        let embedder_config = config.embedder.clone();
        let head_config = config.classifier.clone();

        Self {
            name: "sentence-transformer+linear".to_string(),
            enabled: config.enabled,
            embedder: Box::new(move || {
                let embedder = SentenceEmbedder::load(&embedder_config)?;
                Ok(Arc::new(embedder) as Arc<dyn Embedder>)
            }),
            head: Box::new(move || {
                let head = LinearHead::load(&head_config)?;
                Ok(Arc::new(head) as Arc<dyn LabelHead>)
            }),
        }
    }

    /// Loader with custom component factories
    pub fn new<E, H>(name: impl Into<String>, embedder: E, head: H) -> Self
    where
        E: Fn() -> Result<Arc<dyn Embedder>> + Send + Sync + 'static,
        H: Fn() -> Result<Arc<dyn LabelHead>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            enabled: true,
            embedder: Box::new(embedder),
            head: Box::new(head),
        }
    }
}

impl ScorerLoader for ModelScorerLoader {
    fn load(&self) -> ScorerLoad {
        if !self.enabled {
            info!("Semantic scorer disabled; running with rules only");
            return ScorerLoad::Unavailable(Unavailable::disabled());
        }

        info!("Acquiring semantic scorer '{}'", self.name);

        let embedder = (self.embedder)().map_err(|e| {
            warn!("Failed to load sentence embedder: {}", e);
            e.to_string()
        });
        let head = (self.head)().map_err(|e| {
            warn!("Failed to load classifier: {}", e);
            e.to_string()
        });

        match (embedder, head) {
            (Ok(embedder), Ok(head)) => {
                if let Some(dim) = embedder.dimension() {
                    if dim != head.input_dim() {
                        let reason = format!(
                            "classifier expects dimension {}, embedder produces {}",
                            head.input_dim(),
                            dim
                        );
                        warn!("Semantic scorer unusable: {}", reason);
                        return ScorerLoad::Unavailable(Unavailable {
                            classifier: Some(reason),
                            ..Default::default()
                        });
                    }
                }

                info!("Semantic scorer '{}' ready", self.name);
                ScorerLoad::Ready(Arc::new(SemanticScorer::new(
                    self.name.clone(),
                    embedder,
                    head,
                )))
            }
            (embedder, head) => {
                let reason = Unavailable {
                    embedder: embedder.err(),
                    classifier: head.err(),
                    disabled: false,
                };
                warn!("Semantic scorer unavailable, continuing in regex-only mode: {}", reason);
                ScorerLoad::Unavailable(reason)
            }
        }
    }
}

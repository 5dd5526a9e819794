//! Hybrid classifier: ordered rules first, semantic scorer as fallback
//!
//! `classify` never fails. Empty input, a missing scorer, and scorer errors
//! (including panics inside the scorer) all come back as result values with a
//! method tag describing what happened.

use crate::config::LogGuardConfig;
use crate::loader::ModelScorerLoader;
use crate::model_config::LoadMode;
use crate::rules::RuleSet;
use crate::scorer::{NoScorer, ReadyScorer, Scorer, ScorerLoad, ScorerLoader, ScorerStatus, Unavailable};
use logguard_core::{ClassificationResult, Method, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, warn};

/// Classification context: the rule table plus a lazily acquired scorer
pub struct HybridClassifier {
    rules: Arc<RuleSet>,
    loader: Box<dyn ScorerLoader>,
    scorer: OnceLock<ScorerLoad>,
}

impl HybridClassifier {
    /// Create a classifier whose scorer is acquired through `loader` on first need
    pub fn new(rules: Arc<RuleSet>, loader: impl ScorerLoader + 'static) -> Self {
        Self {
            rules,
            loader: Box::new(loader),
            scorer: OnceLock::new(),
        }
    }

    /// Rule-only classifier
    pub fn rules_only(rules: Arc<RuleSet>) -> Self {
        Self::new(rules, NoScorer)
    }

    /// Classifier with an already constructed scorer
    pub fn with_scorer(rules: Arc<RuleSet>, scorer: Arc<dyn Scorer>) -> Self {
        Self::new(rules, ReadyScorer(scorer))
    }

    /// Build rules and scorer loader from configuration.
    ///
    /// Rule errors are returned; scorer problems never are; they only put the
    /// classifier in regex-only mode.
    pub fn from_config(config: &LogGuardConfig) -> Result<Self> {
        let rules = Arc::new(config.rules.build()?);
        let classifier = Self::new(rules, ModelScorerLoader::from_config(&config.scorer));

        if config.scorer.enabled && config.scorer.load == LoadMode::Eager {
            classifier.warm_up();
        }

        Ok(classifier)
    }

    /// The active rule table
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify one log line
    pub fn classify(&self, raw_text: &str) -> ClassificationResult {
        let start = Instant::now();
        let text = raw_text.trim();

        let result = if text.is_empty() {
            ClassificationResult::empty()
        } else if let Some(hit) = self.rules.classify_by_rule(text) {
            ClassificationResult::from_rule(hit.label, hit.index)
        } else {
            match self.acquire().scorer() {
                Some(scorer) => Self::score(scorer.as_ref(), text),
                None => ClassificationResult::model_not_loaded(),
            }
        };

        let elapsed_us = start.elapsed().as_micros() as u64;
        metrics::counter!("logguard_classifications_total", "method" => method_tag(&result.method))
            .increment(1);
        metrics::histogram!("logguard_classification_latency_us").record(elapsed_us as f64);

        debug!(
            label = result.label.as_str(),
            method = %result.method,
            latency_us = elapsed_us,
            "Classified log line"
        );

        result
    }

    /// Classify and return the `(label, method)` strings
    pub fn classify_pair(&self, raw_text: &str) -> (String, String) {
        self.classify(raw_text).into_pair()
    }

    /// Acquire the scorer now instead of on the first unmatched line
    pub fn warm_up(&self) -> ScorerStatus {
        self.acquire();
        self.scorer_status()
    }

    /// Current scorer state, without triggering acquisition
    pub fn scorer_status(&self) -> ScorerStatus {
        match self.scorer.get() {
            None => ScorerStatus::Pending,
            Some(ScorerLoad::Ready(scorer)) => ScorerStatus::Ready {
                name: scorer.name().to_string(),
            },
            Some(ScorerLoad::Unavailable(reason)) => ScorerStatus::Unavailable(reason.clone()),
        }
    }

    fn acquire(&self) -> &ScorerLoad {
        self.scorer.get_or_init(|| {
            panic::catch_unwind(AssertUnwindSafe(|| self.loader.load())).unwrap_or_else(|payload| {
                let reason = panic_message(payload.as_ref());
                warn!("Scorer loader panicked: {}", reason);
                ScorerLoad::Unavailable(Unavailable {
                    embedder: Some(format!("loader panicked: {}", reason)),
                    ..Default::default()
                })
            })
        })
    }

    fn score(scorer: &dyn Scorer, text: &str) -> ClassificationResult {
        match panic::catch_unwind(AssertUnwindSafe(|| scorer.embed_and_predict(text))) {
            Ok(Ok(label)) => ClassificationResult::from_model(label),
            Ok(Err(e)) => {
                warn!("Scorer '{}' failed: {}", scorer.name(), e);
                ClassificationResult::prediction_failed(e.to_string())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!("Scorer '{}' panicked: {}", scorer.name(), reason);
                ClassificationResult::prediction_failed(format!("scorer panicked: {}", reason))
            }
        }
    }
}

impl std::fmt::Debug for HybridClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridClassifier")
            .field("rules", &self.rules.len())
            .field("scorer", &self.scorer_status())
            .finish()
    }
}

fn method_tag(method: &Method) -> &'static str {
    match method {
        Method::RegexEngine => "regex",
        Method::SemanticModel => "semantic",
        Method::NotApplicable => "empty",
        Method::ModelNotLoaded => "model_not_loaded",
        Method::PredictionFailed(_) => "prediction_failed",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Error types for LogGuard

/// Result type alias using LogGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for LogGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule table construction errors (bad pattern, unknown label)
    #[error("rule error: {0}")]
    Rule(String),

    /// Semantic scorer invocation errors
    #[error("scorer error: {0}")]
    Scorer(String),

    /// Model artifact loading errors
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new rule error
    pub fn rule(msg: impl Into<String>) -> Self {
        Self::Rule(msg.into())
    }

    /// Create a new scorer error
    pub fn scorer(msg: impl Into<String>) -> Self {
        Self::Scorer(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

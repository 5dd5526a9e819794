//! LogGuard Core
//!
//! Core types shared across LogGuard components.
//!
//! This crate provides:
//! - The closed label vocabulary (`Category`) shared by the rule table and the
//!   semantic scorer
//! - Provenance tags (`Method`) and the per-call `ClassificationResult`
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, ClassificationResult, Method};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Category, ClassificationResult, Method};
}

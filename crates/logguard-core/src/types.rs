//! Label vocabulary and classification result types

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Closed set of categories a log line can be assigned to.
///
/// Both the rule table and the semantic scorer emit labels from this set, so
/// callers see the same vocabulary regardless of which layer answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Security Alert", alias = "security_alert")]
    SecurityAlert,
    #[serde(rename = "Critical Error", alias = "critical_error")]
    CriticalError,
    #[serde(rename = "Resource Warning", alias = "resource_warning")]
    ResourceWarning,
    #[serde(rename = "Network Issue", alias = "network_issue")]
    NetworkIssue,
    #[serde(rename = "Web Error", alias = "web_error")]
    WebError,
    #[serde(rename = "Web Success", alias = "web_success")]
    WebSuccess,
    #[serde(rename = "System Notification", alias = "system_notification")]
    SystemNotification,
    #[serde(rename = "User Action", alias = "user_action")]
    UserAction,
    #[serde(rename = "Application Error", alias = "application_error")]
    ApplicationError,
    #[serde(rename = "Unknown", alias = "unknown")]
    Unknown,
    #[serde(rename = "Empty Log", alias = "empty_log")]
    EmptyLog,
    #[serde(rename = "Error", alias = "error")]
    Error,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 12] = [
        Category::SecurityAlert,
        Category::CriticalError,
        Category::ResourceWarning,
        Category::NetworkIssue,
        Category::WebError,
        Category::WebSuccess,
        Category::SystemNotification,
        Category::UserAction,
        Category::ApplicationError,
        Category::Unknown,
        Category::EmptyLog,
        Category::Error,
    ];

    /// Display name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityAlert => "Security Alert",
            Self::CriticalError => "Critical Error",
            Self::ResourceWarning => "Resource Warning",
            Self::NetworkIssue => "Network Issue",
            Self::WebError => "Web Error",
            Self::WebSuccess => "Web Success",
            Self::SystemNotification => "System Notification",
            Self::UserAction => "User Action",
            Self::ApplicationError => "Application Error",
            Self::Unknown => "Unknown",
            Self::EmptyLog => "Empty Log",
            Self::Error => "Error",
        }
    }

    /// Whether rules and trained models may emit this category.
    ///
    /// `Unknown`, `Empty Log` and `Error` are reserved for the classifier's
    /// own degraded and failure paths.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Unknown | Self::EmptyLog | Self::Error)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| crate::Error::config(format!("unknown category label '{}'", s)))
    }
}

/// Provenance tag identifying which layer produced a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Matched by the ordered pattern table
    RegexEngine,

    /// Predicted by the sentence embedder plus linear classifier
    SemanticModel,

    /// Input was empty after trimming
    NotApplicable,

    /// No rule matched and the semantic scorer is unavailable
    ModelNotLoaded,

    /// The semantic scorer failed; carries the diagnostic
    PredictionFailed(String),
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegexEngine => f.write_str("Regex Engine"),
            Self::SemanticModel => f.write_str("AI Model (Sentence Transformer)"),
            Self::NotApplicable => f.write_str("N/A"),
            Self::ModelNotLoaded => f.write_str("Logic Error: Model not loaded"),
            Self::PredictionFailed(diagnostic) => {
                write!(f, "AI Prediction Failed: {}", diagnostic)
            }
        }
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of classifying a single log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// Assigned category
    pub label: Category,

    /// Layer that produced the label
    pub method: Method,

    /// Index of the matching rule, when the rule engine answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl ClassificationResult {
    /// Result for input that is empty after trimming
    pub fn empty() -> Self {
        Self {
            label: Category::EmptyLog,
            method: Method::NotApplicable,
            rule_index: None,
        }
    }

    /// Result produced by rule `index` of the pattern table
    pub fn from_rule(label: Category, index: usize) -> Self {
        Self {
            label,
            method: Method::RegexEngine,
            rule_index: Some(index),
        }
    }

    /// Result produced by the semantic scorer
    pub fn from_model(label: Category) -> Self {
        Self {
            label,
            method: Method::SemanticModel,
            rule_index: None,
        }
    }

    /// Degraded result: nothing matched and no scorer is loaded
    pub fn model_not_loaded() -> Self {
        Self {
            label: Category::Unknown,
            method: Method::ModelNotLoaded,
            rule_index: None,
        }
    }

    /// Failure result carrying the scorer's diagnostic
    pub fn prediction_failed(diagnostic: impl Into<String>) -> Self {
        Self {
            label: Category::Error,
            method: Method::PredictionFailed(diagnostic.into()),
            rule_index: None,
        }
    }

    /// Label as its display string
    pub fn label_str(&self) -> &'static str {
        self.label.as_str()
    }

    /// Method as its display string
    pub fn method_string(&self) -> String {
        self.method.to_string()
    }

    /// Convert into the `(label, method)` string pair handed to presentation layers
    pub fn into_pair(self) -> (String, String) {
        (self.label.as_str().to_string(), self.method.to_string())
    }
}

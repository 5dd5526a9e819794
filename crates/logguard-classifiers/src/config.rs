//! LogGuard configuration

use crate::model_config::ScorerConfig;
use crate::rules::{Rule, RuleSet};
use logguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogGuardConfig {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub scorer: ScorerConfig,
}

impl LogGuardConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load from the first existing candidate path, or fall back to defaults
    pub fn load_or_default(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Per-user configuration location (`<config dir>/logguard/logguard.yaml`)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logguard").join("logguard.yaml"))
    }
}

/// Where the rule table comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Compiled-in table
    #[default]
    Builtin,
    /// YAML rules file at `rules.path`
    File,
}

/// Rule table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub source: RuleSource,

    /// Rules file, required when `source` is `file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Rules evaluated ahead of the chosen table
    #[serde(default)]
    pub extra: Vec<Rule>,
}

impl RulesConfig {
    /// Compile the configured rule table
    pub fn build(&self) -> Result<RuleSet> {
        let base = match self.source {
            RuleSource::Builtin => RuleSet::builtin()?,
            RuleSource::File => {
                let path = self.path.as_ref().ok_or_else(|| {
                    Error::config("rules.source is 'file' but rules.path is not set")
                })?;
                RuleSet::from_file(path)?
            }
        };

        if self.extra.is_empty() {
            Ok(base)
        } else {
            info!("Prepending {} extra rules", self.extra.len());
            base.with_prepended(self.extra.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_config::LoadMode;
    use logguard_core::Category;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
rules:
  source: builtin
  extra:
    - name: vpn
      pattern: "VPN tunnel (down|flapping)"
      label: Network Issue
scorer:
  enabled: false
  load: eager
"#;

        let config = LogGuardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rules.source, RuleSource::Builtin);
        assert_eq!(config.rules.extra.len(), 1);
        assert!(!config.scorer.enabled);
        assert_eq!(config.scorer.load, LoadMode::Eager);

        let rules = config.rules.build().unwrap();
        assert_eq!(
            rules.classify_by_rule("VPN tunnel flapping").unwrap().label,
            Category::NetworkIssue
        );
        assert_eq!(rules.rules()[0].name.as_deref(), Some("vpn"));
    }

    #[test]
    fn test_malformed_yaml_is_a_config_error() {
        let err = LogGuardConfig::from_yaml("scorer: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("configuration error: Invalid configuration"));
    }

    #[test]
    fn test_file_source_requires_path() {
        let config = LogGuardConfig::from_yaml("rules:\n  source: file\n").unwrap();
        assert!(matches!(config.rules.build(), Err(Error::Config(_))));
    }

    #[test]
    fn test_file_source_loads_rules() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.yaml");
        std::fs::write(
            &rules_path,
            "rules:\n  - pattern: \"heartbeat missed\"\n    label: Network Issue\n",
        )
        .unwrap();

        let config = RulesConfig {
            source: RuleSource::File,
            path: Some(rules_path),
            extra: vec![],
        };
        let rules = config.build().unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.classify_by_rule("Database connection failed").is_none());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let config = LogGuardConfig::load_or_default(&[missing.clone()]).unwrap();
        assert!(config.scorer.enabled);

        let present = dir.path().join("logguard.yaml");
        std::fs::write(&present, "scorer:\n  enabled: false\n").unwrap();
        let config = LogGuardConfig::load_or_default(&[missing, present]).unwrap();
        assert!(!config.scorer.enabled);
    }
}

//! Configuration loading with CLI overrides

use logguard_classifiers::{LogGuardConfig, RuleSource};
use std::path::Path;
use tracing::info;

/// Load configuration from file and CLI overrides
pub fn load(cli: &crate::Cli) -> anyhow::Result<LogGuardConfig> {
    load_from(&cli.config, cli.rules.as_deref(), cli.device.as_deref())
}

/// Load `config_path`, else the per-user file, else defaults; then apply overrides
fn load_from(
    config_path: &Path,
    rules: Option<&Path>,
    device: Option<&str>,
) -> anyhow::Result<LogGuardConfig> {
    let mut candidates = vec![config_path.to_path_buf()];
    if let Some(user_config) = LogGuardConfig::user_config_path() {
        candidates.push(user_config);
    }

    let mut config = LogGuardConfig::load_or_default(&candidates)?;
    apply_overrides(&mut config, rules, device);
    Ok(config)
}

fn apply_overrides(config: &mut LogGuardConfig, rules: Option<&Path>, device: Option<&str>) {
    if let Some(path) = rules {
        info!("Using rules file {}", path.display());
        config.rules.source = RuleSource::File;
        config.rules.path = Some(path.to_path_buf());
    }

    if let Some(device) = device {
        config.scorer.embedder.device = device.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let mut config = LogGuardConfig::from_yaml("scorer:\n  embedder:\n    device: mps\n").unwrap();
        apply_overrides(&mut config, None, None);
        assert_eq!(config.rules.source, RuleSource::Builtin);
        assert_eq!(config.scorer.embedder.device, "mps");
    }

    #[test]
    fn test_overrides_replace_rules_and_device() {
        let mut config = LogGuardConfig::default();
        apply_overrides(&mut config, Some(Path::new("custom.yaml")), Some("cuda"));
        assert_eq!(config.rules.source, RuleSource::File);
        assert_eq!(config.rules.path, Some(PathBuf::from("custom.yaml")));
        assert_eq!(config.scorer.embedder.device, "cuda");
    }

    #[test]
    fn test_load_from_file_then_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logguard.yaml");
        std::fs::write(&path, "scorer:\n  enabled: false\n  embedder:\n    device: mps\n").unwrap();

        let config = load_from(&path, None, None).unwrap();
        assert!(!config.scorer.enabled);
        assert_eq!(config.scorer.embedder.device, "mps");

        let config = load_from(&path, Some(Path::new("ops.yaml")), Some("cpu")).unwrap();
        assert!(!config.scorer.enabled);
        assert_eq!(config.rules.source, RuleSource::File);
        assert_eq!(config.scorer.embedder.device, "cpu");
    }

    #[test]
    fn test_load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logguard.yaml");
        std::fs::write(&path, "scorer: [unclosed").unwrap();
        assert!(load_from(&path, None, None).is_err());
    }
}

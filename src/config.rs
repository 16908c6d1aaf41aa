use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub rules: RuleConfig,
    pub engine: EngineConfig,
    pub archive: ArchiveConfig,
}

/// Thresholds and point overrides for the detection rules.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub high_amount_threshold: f64,
    pub medium_amount_threshold: f64,
    pub new_wallet_days: u32,
    pub burst_min_count: usize,
    pub unusual_hour_start: u32,
    pub unusual_hour_end: u32,
    pub behavior_change_multiplier: f64,
    /// Point overrides keyed by rule key (e.g. `high_amount`).
    pub weights: HashMap<String, u32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads used to evaluate rows. 1 keeps evaluation on the caller's thread.
    pub workers: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ArchiveConfig {
    pub path: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: 10_000.0,
            medium_amount_threshold: 5_000.0,
            new_wallet_days: 30,
            burst_min_count: 3,
            unusual_hour_start: 0,
            unusual_hour_end: 4,
            behavior_change_multiplier: 2.0,
            weights: HashMap::new(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let rules = RuleConfig::default();
        assert_eq!(rules.high_amount_threshold, 10_000.0);
        assert_eq!(rules.medium_amount_threshold, 5_000.0);
        assert_eq!(rules.new_wallet_days, 30);
        assert_eq!(rules.burst_min_count, 3);
        assert_eq!((rules.unusual_hour_start, rules.unusual_hour_end), (0, 4));
        assert!(rules.weights.is_empty());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rules]
            high_amount_threshold = 25000.0

            [rules.weights]
            burst = 5

            [engine]
            workers = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.rules.high_amount_threshold, 25_000.0);
        assert_eq!(config.rules.medium_amount_threshold, 5_000.0);
        assert_eq!(config.rules.weights.get("burst"), Some(&5));
        assert_eq!(config.engine.workers, 4);
        assert!(config.archive.path.is_none());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/chainguard.toml");
        assert_eq!(config.rules, RuleConfig::default());
        assert_eq!(config.engine.workers, 1);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chainguard.toml");
        std::fs::write(&path, "[rules\nhigh_amount_threshold = ").unwrap();
        let config = Config::load(&path);
        assert_eq!(config.rules, RuleConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chainguard.toml");
        std::fs::write(&path, "[archive]\npath = \"data/out.db\"\n").unwrap();
        let config = Config::load(&path);
        assert_eq!(config.archive.path.as_deref(), Some("data/out.db"));
    }
}

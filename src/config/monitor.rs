// src/config/monitor.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::freshness::{FreshnessEvaluator, DEFAULT_RECENCY_WINDOW_SECS};

pub const ENV_CONFIG_PATH: &str = "FEED_MONITOR_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/feed_monitor.toml";
pub const DEFAULT_JSON_PATH: &str = "config/feed_monitor.json";

fn default_window_secs() -> i64 {
    DEFAULT_RECENCY_WINDOW_SECS
}
fn default_datasets_path() -> PathBuf {
    PathBuf::from("config/datasets.json")
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("activity-feed-monitor/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How far back an item's end date may lie for the page to count as recent.
    #[serde(default = "default_window_secs")]
    pub recency_window_secs: i64,
    /// JSON array of `{id, title, data_url}` records.
    #[serde(default = "default_datasets_path")]
    pub datasets_path: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            recency_window_secs: default_window_secs(),
            datasets_path: default_datasets_path(),
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl MonitorConfig {
    pub fn evaluator(&self) -> FreshnessEvaluator {
        FreshnessEvaluator::with_window_secs(self.recency_window_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn sanitize(mut self) -> Self {
        if self.recency_window_secs <= 0 {
            self.recency_window_secs = default_window_secs();
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
        self
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading monitor config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load config using env var + fallbacks:
/// 1) $FEED_MONITOR_CONFIG_PATH
/// 2) config/feed_monitor.toml
/// 3) config/feed_monitor.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<MonitorConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
    }
    Ok(MonitorConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<MonitorConfig> {
    let looks_json = s.trim_start().starts_with('{');
    let try_toml_first = hint_ext == "toml" || (hint_ext != "json" && !looks_json);
    let parsed = if try_toml_first {
        toml::from_str::<MonitorConfig>(s)
            .map_err(anyhow::Error::from)
            .or_else(|_| serde_json::from_str::<MonitorConfig>(s).map_err(anyhow::Error::from))
    } else {
        serde_json::from_str::<MonitorConfig>(s)
            .map_err(anyhow::Error::from)
            .or_else(|_| toml::from_str::<MonitorConfig>(s).map_err(anyhow::Error::from))
    };
    parsed
        .map(MonitorConfig::sanitize)
        .map_err(|e| anyhow!("unsupported monitor config format: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_parse() {
        let toml = r#"
recency_window_secs = 3600
datasets_path = "data/ds.json"
"#;
        let cfg = parse_config(toml, "toml").unwrap();
        assert_eq!(cfg.recency_window_secs, 3600);
        assert_eq!(cfg.datasets_path, PathBuf::from("data/ds.json"));
        assert_eq!(cfg.http_timeout_secs, 30);

        let json = r#"{"http_timeout_secs": 5, "user_agent": "x"}"#;
        let cfg = parse_config(json, "").unwrap();
        assert_eq!(cfg.http_timeout_secs, 5);
        assert_eq!(cfg.user_agent, "x");
        assert_eq!(cfg.recency_window_secs, DEFAULT_RECENCY_WINDOW_SECS);
    }

    #[test]
    fn bad_values_are_reset() {
        let cfg = parse_config("recency_window_secs = -5\nhttp_timeout_secs = 0", "toml").unwrap();
        assert_eq!(cfg.recency_window_secs, DEFAULT_RECENCY_WINDOW_SECS);
        assert_eq!(cfg.http_timeout_secs, 30);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_config("[[[", "toml").is_err());
    }

    #[test]
    fn evaluator_uses_window() {
        let cfg = MonitorConfig {
            recency_window_secs: 60,
            ..MonitorConfig::default()
        };
        assert_eq!(cfg.evaluator().window_secs(), 60);
    }
}

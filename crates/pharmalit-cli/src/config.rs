//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pharmalit_pubmed::MAX_RESULTS_CAP;
use serde::Deserialize;

/// File-level configuration for pharmalit
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub eutils: EutilsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EutilsConfig {
    pub base_url: String,
    pub tool: String,
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
    pub max_results: usize,
}

impl Default for EutilsConfig {
    fn default() -> Self {
        let defaults = pharmalit_pubmed::Config::default();
        Self {
            base_url: defaults.base_url,
            tool: defaults.tool,
            email: None,
            api_key: std::env::var("NCBI_API_KEY").ok(),
            timeout_secs: defaults.timeout.as_secs(),
            min_interval_ms: defaults.min_interval.as_millis() as u64,
            max_results: defaults.max_results,
        }
    }
}

/// Console table layout
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Max characters shown in the Title column
    pub title_width: usize,
    /// Max characters shown in any other column
    pub cell_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title_width: 60,
            cell_width: 40,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./pharmalit.toml (current directory)
    /// 2. ~/.config/pharmalit/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("pharmalit.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "pharmalit") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Client configuration, with CLI overrides applied on top
    pub fn client_config(
        &self,
        max_results: Option<usize>,
        prefilter: bool,
    ) -> pharmalit_pubmed::Config {
        let eutils = &self.eutils;
        let max_results = max_results.unwrap_or(eutils.max_results);
        if max_results > MAX_RESULTS_CAP {
            log::warn!("max_results {max_results} exceeds cap, using {MAX_RESULTS_CAP}");
        }
        let timeout = match eutils.timeout_secs {
            0 => {
                let default = pharmalit_pubmed::Config::default().timeout;
                log::warn!("timeout_secs = 0 would fail every request, using {default:?}");
                default
            }
            secs => Duration::from_secs(secs),
        };
        pharmalit_pubmed::Config {
            base_url: eutils.base_url.clone(),
            max_results,
            tool: eutils.tool.clone(),
            email: eutils.email.clone().filter(|e| !e.trim().is_empty()),
            api_key: eutils.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout,
            min_interval: Duration::from_millis(eutils.min_interval_ms),
            prefilter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.eutils.max_results, 50);
        assert_eq!(config.eutils.timeout_secs, 30);
        assert_eq!(config.eutils.min_interval_ms, 334);
        assert_eq!(config.output.title_width, 60);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("PHARMALIT_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${PHARMALIT_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("PHARMALIT_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[eutils]
base_url = "http://localhost:8080/eutils"
email = "me@example.org"
api_key = "abc123"
min_interval_ms = 100
max_results = 20

[output]
title_width = 80
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.eutils.base_url, "http://localhost:8080/eutils");
        assert_eq!(config.eutils.email.as_deref(), Some("me@example.org"));
        assert_eq!(config.eutils.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.eutils.min_interval_ms, 100);
        assert_eq!(config.eutils.max_results, 20);
        assert_eq!(config.eutils.tool, "pharmalit");
        assert_eq!(config.output.title_width, 80);
        assert_eq!(config.output.cell_width, 40);
    }

    #[test]
    fn client_config_applies_overrides() {
        let mut config = Config::default();
        config.eutils.min_interval_ms = 500;
        config.eutils.email = Some("  ".to_string());

        let client = config.client_config(Some(10), true);
        assert_eq!(client.max_results, 10);
        assert!(client.prefilter);
        assert_eq!(client.min_interval, Duration::from_millis(500));
        assert_eq!(client.email, None);

        let client = config.client_config(None, false);
        assert_eq!(client.max_results, 50);
        assert!(!client.prefilter);
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config: Config = toml::from_str("[eutils]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.client_config(None, false).timeout, Duration::from_secs(30));

        let config: Config = toml::from_str("[eutils]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.client_config(None, false).timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[eutils\nbase_url = 1").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::client::DEFAULT_API_PATH;
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "STORJ_EXPORTER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "storj-exporter.yaml";

/// Optional collectors; the node collector always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorKind {
    Payout,
    Satellite,
}

impl FromStr for CollectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payout" => Ok(CollectorKind::Payout),
            "sat" => Ok(CollectorKind::Satellite),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorKind::Payout => f.write_str("payout"),
            CollectorKind::Satellite => f.write_str("sat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub host_address: String,
    pub api_port: u16,
    pub api_path: String,
    pub api_timeout_secs: u64,
    pub api_retries: u32,
    pub listen_address: String,
    pub exporter_port: u16,
    pub collectors: Vec<String>,
    pub satellite_concurrency: usize,
    pub log_level: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            host_address: "127.0.0.1".into(),
            api_port: 14002,
            api_path: DEFAULT_API_PATH.into(),
            api_timeout_secs: 90,
            api_retries: 3,
            listen_address: "0.0.0.0".into(),
            exporter_port: 9651,
            collectors: vec!["payout".into(), "sat".into()],
            satellite_concurrency: 1,
            log_level: "INFO".into(),
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

impl ExporterConfig {
    /// Defaults, then the YAML file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let mut config = Self::from_file(Path::new(&path));
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// A missing file means defaults; an unreadable or invalid one is reported
    /// and also falls back to defaults.
    pub fn from_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let txt = match std::fs::read_to_string(path) {
            Ok(txt) => txt,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file, using defaults");
                return Self::default();
            }
        };
        Self::from_yaml(&txt).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            Self::default()
        })
    }

    pub fn from_yaml(txt: &str) -> Result<Self, serde_yaml::Error> {
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(txt)
    }

    /// Applies `STORJ_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STORJ_HOST_ADDRESS") {
            self.host_address = v;
        }
        if let Some(v) = lookup("STORJ_API_PORT") {
            self.api_port = parse_var("STORJ_API_PORT", &v)?;
        }
        if let Some(v) = lookup("STORJ_API_TIMEOUT") {
            self.api_timeout_secs = parse_var("STORJ_API_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("STORJ_API_RETRIES") {
            self.api_retries = parse_var("STORJ_API_RETRIES", &v)?;
        }
        if let Some(v) = lookup("STORJ_EXPORTER_ADDRESS") {
            self.listen_address = v;
        }
        if let Some(v) = lookup("STORJ_EXPORTER_PORT") {
            self.exporter_port = parse_var("STORJ_EXPORTER_PORT", &v)?;
        }
        if let Some(v) = lookup("STORJ_COLLECTORS") {
            self.collectors = v.split_whitespace().map(str::to_string).collect();
        }
        if let Some(v) = lookup("STORJ_SATELLITE_CONCURRENCY") {
            self.satellite_concurrency = parse_var("STORJ_SATELLITE_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("STORJ_EXPORTER_LOG_LEVEL") {
            self.log_level = v;
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host_address, self.api_port)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_address, self.exporter_port)
    }

    /// Optional collectors in configuration order; unknown names are dropped.
    pub fn enabled_collectors(&self) -> Vec<CollectorKind> {
        let mut kinds = Vec::new();
        for name in &self.collectors {
            match name.parse::<CollectorKind>() {
                Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
                Ok(_) => {}
                Err(unknown) => warn!(collector = %unknown, "ignoring unknown collector"),
            }
        }
        kinds
    }

    pub fn collector_enabled(&self, kind: CollectorKind) -> bool {
        self.enabled_collectors().contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_config() {
        let config = ExporterConfig::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:14002");
        assert_eq!(config.api_timeout_secs, 90);
        assert_eq!(config.exporter_port, 9651);
        assert_eq!(
            config.enabled_collectors(),
            vec![CollectorKind::Payout, CollectorKind::Satellite]
        );
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("STORJ_HOST_ADDRESS", "storagenode"),
            ("STORJ_API_PORT", "14003"),
            ("STORJ_API_TIMEOUT", "15"),
            ("STORJ_EXPORTER_PORT", "9000"),
            ("STORJ_COLLECTORS", "sat  bogus"),
            ("STORJ_SATELLITE_CONCURRENCY", "4"),
        ]);
        let mut config = ExporterConfig::default();
        config.apply_env(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.base_url(), "http://storagenode:14003");
        assert_eq!(config.api_timeout_secs, 15);
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
        assert_eq!(config.satellite_concurrency, 4);
        assert!(config.collector_enabled(CollectorKind::Satellite));
        assert!(!config.collector_enabled(CollectorKind::Payout));
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let vars = env(&[("STORJ_API_PORT", "not-a-port")]);
        let mut config = ExporterConfig::default();
        let err = config.apply_env(|key| vars.get(key).cloned()).unwrap_err();
        assert!(err.to_string().contains("STORJ_API_PORT"));
    }

    #[test]
    fn test_empty_collectors_disables_optional_ones() {
        let vars = env(&[("STORJ_COLLECTORS", "")]);
        let mut config = ExporterConfig::default();
        config.apply_env(|key| vars.get(key).cloned()).unwrap();
        assert!(config.enabled_collectors().is_empty());
    }

    #[test]
    fn test_yaml_partial_file() {
        let config = ExporterConfig::from_yaml("host_address: 10.0.0.5\ncollectors: [payout]\n").unwrap();
        assert_eq!(config.host_address, "10.0.0.5");
        assert_eq!(config.api_port, 14002);
        assert_eq!(config.enabled_collectors(), vec![CollectorKind::Payout]);
        assert_eq!(ExporterConfig::from_yaml("  \n").unwrap(), ExporterConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ExporterConfig::from_file(Path::new("/nonexistent/storj-exporter.yaml"));
        assert_eq!(config, ExporterConfig::default());
    }
}

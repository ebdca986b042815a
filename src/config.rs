use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub data_sources: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub logs: PathBuf,
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
}

impl Config {
    /// Load the pipeline configuration. YAML unless the path ends in `.toml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| EtlError::ConfigLoad {
            path: path.to_path_buf(),
            message: format!("Failed to read config file: {}", e),
        })?;

        let is_toml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content).map_err(|message| EtlError::ConfigLoad {
                path: path.to_path_buf(),
                message,
            })
        } else {
            Self::from_yaml_str(&content).map_err(|message| EtlError::ConfigLoad {
                path: path.to_path_buf(),
                message,
            })
        }
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Resolve a configured source name to its URL
    pub fn source_url(&self, source_name: &str) -> Result<&str> {
        self.data_sources
            .get(source_name)
            .map(String::as_str)
            .ok_or_else(|| EtlError::SourceNotFound(source_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const YAML: &str = r#"
paths:
  logs: ./logs
  raw_data: ./data/raw
  processed_data: ./data/processed
data_sources:
  sample_sales: https://example.com/sales.csv
"#;

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, YAML).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.paths.raw_data, PathBuf::from("./data/raw"));
        assert_eq!(
            config.source_url("sample_sales").unwrap(),
            "https://example.com/sales.csv"
        );
    }

    #[test]
    fn test_load_toml_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[paths]
logs = "logs"
raw_data = "raw"
processed_data = "processed"

[data_sources]
inventory = "http://localhost/inventory.csv"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.paths.logs, PathBuf::from("logs"));
        assert_eq!(config.source_url("inventory").unwrap(), "http://localhost/inventory.csv");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, EtlError::ConfigLoad { .. }));
    }

    #[test]
    fn test_missing_required_key_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "paths:\n  logs: ./logs\ndata_sources: {}\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, EtlError::ConfigLoad { .. }));
    }

    #[test]
    fn test_unknown_source() {
        let config = Config::from_yaml_str(YAML).unwrap();
        let err = config.source_url("weather").unwrap_err();
        assert!(matches!(err, EtlError::SourceNotFound(name) if name == "weather"));
    }
}

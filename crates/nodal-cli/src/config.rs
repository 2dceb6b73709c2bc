//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use nodal_storage::BackendKind;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nodal")
}

/// Location of the config file, unless overridden
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nodal")
        .join("config.toml")
}

/// Config file contents
///
/// Every key is optional; unset keys fall back to command line flags or
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Load from `path`; a missing file is an empty config
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Wrote config to {:?}", path);
        Ok(())
    }

    /// Config written by `config init`: every key set to its default
    pub fn with_defaults() -> Self {
        Self {
            data_dir: Some(default_data_dir()),
            backend: Some(BackendKind::default()),
            format: Some(OutputFormat::default()),
        }
    }

    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "backend", "format"]
    }

    /// Value of `key`, `None` if the key is unknown or unset
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => self.data_dir.as_ref().map(|p| p.display().to_string()),
            "backend" => self.backend.map(|b| b.to_string()),
            "format" => self.format.map(|f| f.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "backend" => self.backend = Some(value.parse().map_err(anyhow::Error::msg)?),
            "format" => self.format = Some(value.parse().map_err(anyhow::Error::msg)?),
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_and_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("backend", "sqlite").unwrap();
        config.set("format", "json").unwrap();
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("backend = \"sqlite\""));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.get("backend").as_deref(), Some("sqlite"));
        assert_eq!(loaded.get("format").as_deref(), Some("json"));
        assert_eq!(loaded.get("data_dir"), None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("backend", "postgres").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend = 3").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}

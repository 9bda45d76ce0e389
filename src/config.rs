use crate::error::{PercolationError, Result};
use crate::settings::PercolationSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: u32 = 1;

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    pub settings: PercolationSettings,
}

impl AppConfig {
    pub fn new(settings: PercolationSettings) -> Self {
        Self {
            version: CONFIG_VERSION,
            settings,
        }
    }

    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("site-percolation").join("config.json"))
            .ok_or(PercolationError::NoConfigDir)
    }

    /// Export config to a JSON file, creating parent directories as needed
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Import config from a JSON file. Out-of-range values are clamped.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        if config.version != CONFIG_VERSION {
            tracing::warn!(version = config.version, "config version differs, loading anyway");
        }
        config.settings = config.settings.normalized();
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(PercolationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::new(PercolationSettings {
            size: 33,
            probability: 0.59,
            seed: Some(1234),
        });

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        AppConfig::default().save_to_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"version":1,"settings":{"size":200,"probability":3.0}}"#,
        )
        .unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.settings.size, 50);
        assert_eq!(loaded.settings.probability, 1.0);
        assert_eq!(loaded.settings.seed, None);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(PercolationError::Serde(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(PercolationError::Io(_))));
    }
}

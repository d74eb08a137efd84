use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{AppConfig, DomainError};
use crate::ports::ConfigStore;

const APP_DIR: &str = "triage-intake";

/// TOML-based configuration store with OS-specific paths.
pub struct TomlConfigStore {
    data_dir: PathBuf,
}

impl TomlConfigStore {
    /// Create a new store rooted at the OS config directory
    /// (~/.config/triage-intake on Linux, the platform equivalents
    /// elsewhere).
    pub fn new() -> Result<Self, DomainError> {
        let data_dir = dirs::config_dir()
            .map(|p| p.join(APP_DIR))
            .ok_or_else(|| {
                DomainError::Config("Could not find application data directory".to_string())
            })?;

        fs::create_dir_all(&data_dir)?;

        info!(data_dir = ?data_dir, "ConfigStore initialized");

        Ok(Self { data_dir })
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, DomainError> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    /// Write the configuration back to disk. Not part of the port; the
    /// intake flow never mutates its configuration.
    pub fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        let config_path = self.config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&config_path, content)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config_path = self.config_path();

        if config_path.exists() {
            debug!(path = ?config_path, "Loading configuration");
            let content = fs::read_to_string(&config_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!(path = ?config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path = ?config_path, "Configuration file not found, creating default");
            let config = AppConfig::new();
            self.save(&config)?;
            Ok(config)
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = env::temp_dir().join("triage_intake_config_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let store = TomlConfigStore::with_data_dir(temp_dir.clone()).unwrap();

        let mut config = AppConfig::new();
        config.language = "hi".to_string();
        config.backend.base_url = "http://triage.example.org".to_string();
        config.geolocation.enabled = false;

        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.language, "hi");
        assert_eq!(loaded.backend.base_url, "http://triage.example.org");
        assert!(!loaded.geolocation.enabled);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_loads_through_the_port() {
        let temp_dir = env::temp_dir().join("triage_intake_config_port_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let store = TomlConfigStore::with_data_dir(temp_dir.clone()).unwrap();
        let mut config = AppConfig::new();
        config.backend.base_url = "http://10.0.0.2:5000".to_string();
        store.save(&config).unwrap();

        // The flow only sees the read-only port surface.
        let port: &dyn ConfigStore = &store;
        assert_eq!(port.load().unwrap().backend.base_url, "http://10.0.0.2:5000");
        assert_eq!(port.logs_dir(), temp_dir.join("logs"));
        assert_eq!(port.data_dir(), temp_dir);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let temp_dir = env::temp_dir().join("triage_intake_config_default_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let store = TomlConfigStore::with_data_dir(temp_dir.clone()).unwrap();
        let config = store.load().unwrap();

        assert_eq!(config.language, "");
        assert!(store.config_path().exists());

        let _ = fs::remove_dir_all(&temp_dir);
    }
}

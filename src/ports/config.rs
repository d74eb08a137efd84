use std::path::PathBuf;

use crate::domain::{AppConfig, DomainError};

/// Store for the persisted intake configuration: the language
/// preference, the triage backend address, and the geolocation,
/// recognition, and logging settings.
///
/// The intake flow only ever reads; writing the config back is an
/// adapter concern.
pub trait ConfigStore: Send + Sync {
    /// Load the configuration, creating the default one on first run.
    fn load(&self) -> Result<AppConfig, DomainError>;

    /// Directory holding the config file and the triage result handoff.
    fn data_dir(&self) -> PathBuf;

    /// Directory the rotated log files land in.
    fn logs_dir(&self) -> PathBuf;
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Triage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the triage service.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// Geolocation query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// When false, no position query is ever issued (the unsupported
    /// path); the location estimate stays empty.
    pub enabled: bool,
    /// IP-geolocation provider returning {"lat": .., "lon": ..} JSON.
    pub provider_url: String,
    /// Client-side timeout for a single query.
    pub timeout_secs: u64,
    /// A cached answer younger than this is served without a new query.
    pub max_age_secs: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider_url: "http://ip-api.com/json".to_string(),
            timeout_secs: 10,
            max_age_secs: 60,
        }
    }
}

/// Speech recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Path to a whisper GGML model. None means the capability is absent
    /// and the voice control is permanently disabled.
    pub model_path: Option<PathBuf>,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Interval between provisional decodes while recording.
    pub interim_interval_ms: u64,
    /// Trailing silence after speech that ends the session on its own.
    pub silence_timeout_ms: u64,
    /// A session in which no speech is heard at all errors out after
    /// this long instead of running until the buffer cap.
    pub no_speech_timeout_ms: u64,
    /// RMS level (0.0-1.0) below which a chunk counts as silence.
    pub silence_threshold: f32,
    /// Decoder threads (0 = auto).
    pub threads: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            sample_rate: 16_000,
            interim_interval_ms: 800,
            silence_timeout_ms: 1_600,
            no_speech_timeout_ms: 8_000,
            silence_threshold: 0.01,
            threads: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Persisted language preference: "en" or "hi". Read at load, never
    /// mutated by the intake components.
    pub language: String,
    pub backend: BackendConfig,
    pub geolocation: GeolocationConfig,
    pub recognition: RecognitionConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

use thiserror::Error;

/// Domain-level errors for the intake client.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network request blocked: {reason}")]
    NetworkBlocked { reason: String },

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("Triage request failed: {}", .detail.as_deref().unwrap_or("Analysis failed. Please try again."))]
    Backend { detail: Option<String> },

    #[error("Please describe your symptoms or use voice recording")]
    EmptySymptoms,

    #[error("A symptom analysis is already in progress")]
    SubmissionInFlight,

    #[error("Geolocation unavailable: {0}")]
    Geolocation(String),

    #[error("Voice input not supported: {reason}")]
    RecognitionUnsupported { reason: String },

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Already recording")]
    AlreadyRecording,
}

impl DomainError {
    /// Backend-provided detail for a failed submission, when the payload
    /// carried one.
    pub fn backend_detail(&self) -> Option<&str> {
        match self {
            DomainError::Backend { detail } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::recognition::RecognitionLocale;
use crate::domain::DomainError;

/// Language preference for the intake flow.
///
/// Read once from persisted configuration at load; defaults to English
/// when absent. Carried verbatim in every symptom report and used to fix
/// the recognition locale at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Parse a persisted preference string. Anything other than "hi"
    /// falls back to English.
    pub fn from_pref(pref: &str) -> Self {
        if pref.trim() == "hi" {
            Language::Hi
        } else {
            Language::En
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// The transcription locale this preference maps to.
    pub fn recognition_locale(&self) -> RecognitionLocale {
        match self {
            Language::Hi => RecognitionLocale::HiIn,
            Language::En => RecognitionLocale::EnIn,
        }
    }
}

/// A geographic position, in the wire shape the triage backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Fallback position (Delhi) substituted when a geolocation query is
/// denied or fails.
pub const FALLBACK_LOCATION: Coordinates = Coordinates {
    lat: 28.6139,
    lng: 77.2090,
};

/// A single symptom report, assembled on submit and dropped after the
/// response is handled. Serializes to the exact body the triage endpoint
/// consumes.
#[derive(Debug, Clone, Serialize)]
pub struct SymptomReport {
    pub symptoms: String,
    pub language: Language,
    pub ayushman_card: bool,
    pub location: Option<Coordinates>,
}

impl SymptomReport {
    /// Build a report from raw field text. The text is trimmed; an empty
    /// result aborts assembly before any network activity.
    pub fn new(
        symptoms: &str,
        language: Language,
        ayushman_card: bool,
        location: Option<Coordinates>,
    ) -> Result<Self, DomainError> {
        let trimmed = symptoms.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptySymptoms);
        }
        Ok(Self {
            symptoms: trimmed.to_string(),
            language,
            ayushman_card,
            location,
        })
    }
}

/// The backend's successful triage payload, held verbatim.
///
/// The shape is opaque to this client; accessors exist for the fields the
/// results surface is known to read, without constraining the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult(serde_json::Value);

impl TriageResult {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn severity(&self) -> Option<&str> {
        self.0.get("severity").and_then(|v| v.as_str())
    }

    pub fn advice(&self) -> Option<&str> {
        self.0.get("advice").and_then(|v| v.as_str())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.0.get("session_id").and_then(|v| v.as_str())
    }
}

/// Response of the backend's health probe.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

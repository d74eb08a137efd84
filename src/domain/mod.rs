pub mod config;
pub mod error;
pub mod recognition;
pub mod report;

pub use config::AppConfig;
pub use error::DomainError;
pub use recognition::{
    RecognitionEvent, RecognitionLocale, SampleBuffer, SessionMachine, SessionState, StatusTone,
    StatusView, ToggleView,
};
pub use report::{
    BackendHealth, Coordinates, Language, SymptomReport, TriageResult, FALLBACK_LOCATION,
};

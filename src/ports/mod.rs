pub mod config;
pub mod geolocator;
pub mod handoff;
pub mod http;
pub mod recognizer;

pub use config::ConfigStore;
pub use geolocator::Geolocator;
pub use handoff::HandoffStore;
pub use http::{HttpClient, HttpResponse};
pub use recognizer::{RecognitionSession, RecognizerCapability, SpeechRecognizer};

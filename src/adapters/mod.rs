pub mod config_store;
pub mod geolocator_ip;
pub mod handoff_store;
pub mod http_reqwest;
pub mod recognizer_whisper;

pub use config_store::TomlConfigStore;
pub use geolocator_ip::IpGeolocator;
pub use handoff_store::JsonHandoffStore;
pub use http_reqwest::ReqwestHttpClient;
pub use recognizer_whisper::WhisperRecognizer;

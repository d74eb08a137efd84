pub mod controller;
pub mod state;
pub mod submission;
pub mod voice;

#[cfg(test)]
pub mod test_support;

pub use controller::IntakeController;
pub use state::{LoadingFlag, LocationEstimate, SymptomField};
pub use submission::TriageGateway;
pub use voice::{VoiceCapture, VoiceSnapshot};

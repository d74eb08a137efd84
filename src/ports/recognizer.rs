use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{DomainError, RecognitionEvent, RecognitionLocale};

/// Handle to a live transcription session.
///
/// Events arrive in order on the channel; a session terminates with
/// `Ended` (possibly preceded by `Error`), after which the sender side is
/// dropped.
pub struct RecognitionSession {
    events: mpsc::Receiver<RecognitionEvent>,
    stop: Arc<AtomicBool>,
}

impl RecognitionSession {
    pub fn new(events: mpsc::Receiver<RecognitionEvent>, stop: Arc<AtomicBool>) -> Self {
        Self { events, stop }
    }

    /// Ask the session to wind down. The session still emits its final
    /// transcript and `Ended` before going away.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Await the next event. `None` once the session is gone.
    pub async fn next_event(&mut self) -> Option<RecognitionEvent> {
        self.events.recv().await
    }

    /// Non-blocking poll for a pending event.
    pub fn try_next(&mut self) -> Result<RecognitionEvent, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }
}

/// A discarded handle must not leave the capture worker running; stop is
/// requested whether or not the owner asked for it first.
impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Speech transcription port. One call, one session; continuous capture
/// across sessions is not part of the contract.
pub trait SpeechRecognizer: Send + Sync {
    fn start(&self, locale: RecognitionLocale) -> Result<RecognitionSession, DomainError>;
}

/// The speech capability, resolved exactly once at initialization and
/// injected. There is no ad-hoc probing after construction.
pub enum RecognizerCapability {
    Available(Arc<dyn SpeechRecognizer>),
    Unavailable { reason: String },
}

impl RecognizerCapability {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RecognizerCapability::Available(_))
    }
}

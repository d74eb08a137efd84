use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::app::state::SymptomField;
use crate::domain::{
    DomainError, Language, RecognitionEvent, RecognitionLocale, SessionMachine, StatusView,
    ToggleView,
};
use crate::ports::{RecognitionSession, RecognizerCapability};

/// Everything a rendering surface needs after a voice transition: the one
/// toggle control, the one status line, and the mirrored field text.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSnapshot {
    pub toggle: ToggleView,
    pub status: StatusView,
    pub field_text: String,
    pub recording: bool,
}

/// The voice capture component.
///
/// Wraps a live transcription session behind the two-button toggle and
/// mirrors transcribed text into the shared symptom field. The speech
/// capability is resolved before construction and injected; when it is
/// absent the component spends its whole life in the disabled state.
pub struct VoiceCapture {
    capability: RecognizerCapability,
    locale: RecognitionLocale,
    machine: SessionMachine,
    session: Option<RecognitionSession>,
    field: SymptomField,
}

impl VoiceCapture {
    /// The locale is fixed here, from the persisted language preference,
    /// and never re-evaluated while a session is active.
    pub fn new(capability: RecognizerCapability, language: Language, field: SymptomField) -> Self {
        let machine = match &capability {
            RecognizerCapability::Unavailable { reason } => {
                info!(reason = %reason, "Voice capture disabled");
                SessionMachine::disabled(reason)
            }
            RecognizerCapability::Available(_) => SessionMachine::new(),
        };

        Self {
            capability,
            locale: language.recognition_locale(),
            machine,
            session: None,
            field,
        }
    }

    pub fn locale(&self) -> RecognitionLocale {
        self.locale
    }

    pub fn is_recording(&self) -> bool {
        self.machine.is_recording()
    }

    /// Whether a session is live and events may still arrive.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            toggle: self.machine.toggle_view(),
            status: self.machine.status_view().clone(),
            field_text: self.field.get(),
            recording: self.machine.is_recording(),
        }
    }

    /// The toggle click: start while idle, stop while recording.
    pub fn toggle(&mut self) -> Result<(), DomainError> {
        if self.machine.is_recording() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    fn start(&mut self) -> Result<(), DomainError> {
        let recognizer = match &self.capability {
            RecognizerCapability::Unavailable { reason } => {
                return Err(DomainError::RecognitionUnsupported {
                    reason: reason.clone(),
                });
            }
            RecognizerCapability::Available(recognizer) => recognizer,
        };

        if self.session.is_some() {
            return Err(DomainError::AlreadyRecording);
        }

        match recognizer.start(self.locale) {
            Ok(session) => {
                debug!(locale = self.locale.bcp47(), "Voice session requested");
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Voice session failed to start");
                self.machine.start_failed(&e.to_string());
                Err(e)
            }
        }
    }

    /// The stop command. The session still delivers its final transcript
    /// and end event, picked up by a later pump.
    pub fn stop(&mut self) {
        if let Some(session) = &self.session {
            session.stop();
        }
    }

    /// Drain pending session events through the state machine, mirroring
    /// transcription results into the shared field. Returns the number of
    /// events applied.
    pub fn pump(&mut self) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };

        let mut applied = 0;
        let mut terminal = false;

        loop {
            match session.try_next() {
                Ok(event) => {
                    if matches!(
                        event,
                        RecognitionEvent::Interim(_) | RecognitionEvent::Final(_)
                    ) {
                        self.machine.apply(&event);
                        self.field.set(self.machine.field_text());
                    } else {
                        terminal |= matches!(
                            event,
                            RecognitionEvent::Ended | RecognitionEvent::Error(_)
                        );
                        self.machine.apply(&event);
                    }
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // A session that vanished without an end event must
                    // still release the recording indicator.
                    if self.machine.is_recording() {
                        self.machine.apply(&RecognitionEvent::Error(
                            "recognition session terminated unexpectedly".to_string(),
                        ));
                        applied += 1;
                    }
                    terminal = true;
                    break;
                }
            }
        }

        if terminal && !self.machine.is_recording() {
            self.session = None;
        }

        applied
    }
}

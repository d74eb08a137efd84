use zeroize::Zeroize;

/// Transcription locale, fixed when a voice component is constructed and
/// never re-evaluated while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionLocale {
    EnIn,
    HiIn,
}

impl RecognitionLocale {
    /// BCP 47 tag, as a transcription facility expects it.
    pub fn bcp47(&self) -> &'static str {
        match self {
            RecognitionLocale::EnIn => "en-IN",
            RecognitionLocale::HiIn => "hi-IN",
        }
    }

    /// ISO 639-1 code for decoders that take a bare language.
    pub fn language_code(&self) -> &'static str {
        match self {
            RecognitionLocale::EnIn => "en",
            RecognitionLocale::HiIn => "hi",
        }
    }
}

/// Events emitted by a live transcription session, delivered in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// The session is live and capturing.
    Started,
    /// Provisional text; replaces any previous interim fragment.
    Interim(String),
    /// Committed text; appended permanently to the transcript.
    Final(String),
    /// The session ended, either on command or on its own.
    Ended,
    /// The session failed; recording halts and idle state is restored.
    Error(String),
}

/// Recognition session state.
///
/// State transitions:
/// - Idle -> Recording (start command accepted by the recognizer)
/// - Recording -> Idle (stop command, spontaneous end, or session error)
/// - Disabled is terminal and only entered at construction, when the
///   platform capability is absent.
///
/// Recording and idle presentation are mutually exclusive by construction:
/// both are derived from this single state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Disabled,
}

/// Tone of the status line, driving its presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

/// The one status element a session transition is allowed to touch.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusView {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Info,
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Success,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Error,
        }
    }
}

/// The one toggle control a session transition is allowed to touch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleView {
    pub label: &'static str,
    pub enabled: bool,
    pub engaged: bool,
}

/// Reducer over the recognition event stream.
///
/// Pure state: no platform handle, no I/O. A voice component feeds it
/// events from a live session (or a test feeds it a script) and reads the
/// field text and the two views back out.
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    transcript: String,
    interim: String,
    status: StatusView,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            transcript: String::new(),
            interim: String::new(),
            status: StatusView::info(""),
        }
    }

    /// Construct in the terminal disabled state, with an explanatory
    /// status. No event or command leaves this state.
    pub fn disabled(reason: &str) -> Self {
        Self {
            state: SessionState::Disabled,
            transcript: String::new(),
            interim: String::new(),
            status: StatusView::error(format!("Voice input not supported: {reason}")),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    pub fn is_disabled(&self) -> bool {
        self.state == SessionState::Disabled
    }

    /// Accumulated final transcript, without the provisional tail.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// What the shared text field should show: committed transcript plus
    /// the current interim fragment.
    pub fn field_text(&self) -> String {
        let mut text = self.transcript.clone();
        text.push_str(&self.interim);
        text
    }

    /// The start command was rejected by the platform. State stays idle;
    /// only the status surfaces the failure.
    pub fn start_failed(&mut self, detail: &str) {
        if self.state == SessionState::Disabled {
            return;
        }
        self.status = StatusView::error(format!("Error: {detail}. Please try again."));
    }

    pub fn apply(&mut self, event: &RecognitionEvent) {
        if self.state == SessionState::Disabled {
            return;
        }
        match event {
            RecognitionEvent::Started => {
                self.transcript.clear();
                self.interim.clear();
                self.state = SessionState::Recording;
                self.status = StatusView::info("Listening... speak now");
            }
            RecognitionEvent::Interim(text) => {
                if self.state == SessionState::Recording {
                    self.interim.clear();
                    self.interim.push_str(text);
                    if !text.is_empty() {
                        self.status = StatusView::info(format!("Listening: {text}"));
                    }
                }
            }
            RecognitionEvent::Final(text) => {
                if self.state == SessionState::Recording {
                    self.transcript.push_str(text);
                    self.interim.clear();
                }
            }
            RecognitionEvent::Ended => {
                if self.state == SessionState::Recording {
                    self.state = SessionState::Idle;
                    self.interim.clear();
                    if !self.transcript.is_empty() {
                        self.status = StatusView::success("Recording completed");
                    }
                }
            }
            RecognitionEvent::Error(detail) => {
                self.state = SessionState::Idle;
                self.interim.clear();
                self.status = StatusView::error(format!("Error: {detail}. Please try again."));
            }
        }
    }

    pub fn status_view(&self) -> &StatusView {
        &self.status
    }

    pub fn toggle_view(&self) -> ToggleView {
        match self.state {
            SessionState::Recording => ToggleView {
                label: "Stop recording",
                enabled: true,
                engaged: true,
            },
            SessionState::Idle => ToggleView {
                label: "Record voice description",
                enabled: true,
                engaged: false,
            },
            SessionState::Disabled => ToggleView {
                label: "Voice not supported",
                enabled: false,
                engaged: false,
            },
        }
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// PCM sample buffer that is securely zeroed on drop. Captured audio
/// never touches disk and is cleared from memory after decoding.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    pub fn push_samples(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_machine() -> SessionMachine {
        let mut machine = SessionMachine::new();
        machine.apply(&RecognitionEvent::Started);
        assert!(machine.is_recording());
        machine
    }

    #[test]
    fn test_final_events_concatenate_in_order() {
        let mut machine = recording_machine();
        machine.apply(&RecognitionEvent::Final("fever".to_string()));
        machine.apply(&RecognitionEvent::Final("cough".to_string()));
        assert_eq!(machine.transcript(), "fevercough");

        machine.apply(&RecognitionEvent::Ended);
        assert_eq!(machine.state(), SessionState::Idle);
        assert_eq!(machine.transcript(), "fevercough");
        assert_eq!(machine.status_view().tone, StatusTone::Success);
    }

    #[test]
    fn test_field_shows_transcript_plus_interim() {
        let mut machine = recording_machine();
        machine.apply(&RecognitionEvent::Final("chest ".to_string()));
        machine.apply(&RecognitionEvent::Interim("pai".to_string()));
        assert_eq!(machine.field_text(), "chest pai");
        assert_eq!(machine.status_view().text, "Listening: pai");

        // A newer interim replaces the provisional tail, never appends.
        machine.apply(&RecognitionEvent::Interim("pain".to_string()));
        assert_eq!(machine.field_text(), "chest pain");

        machine.apply(&RecognitionEvent::Final("pain".to_string()));
        assert_eq!(machine.field_text(), "chest pain");
    }

    #[test]
    fn test_start_clears_previous_transcript() {
        let mut machine = recording_machine();
        machine.apply(&RecognitionEvent::Final("fever".to_string()));
        machine.apply(&RecognitionEvent::Ended);

        machine.apply(&RecognitionEvent::Started);
        assert_eq!(machine.transcript(), "");
        assert_eq!(machine.field_text(), "");
    }

    #[test]
    fn test_error_restores_idle_and_allows_restart() {
        let mut machine = recording_machine();
        machine.apply(&RecognitionEvent::Error("no-speech".to_string()));
        assert_eq!(machine.state(), SessionState::Idle);
        assert_eq!(machine.status_view().tone, StatusTone::Error);
        assert!(machine.toggle_view().enabled);
        assert!(!machine.toggle_view().engaged);

        // The spontaneous end that follows a platform error is a no-op.
        machine.apply(&RecognitionEvent::Ended);
        assert_eq!(machine.state(), SessionState::Idle);

        machine.apply(&RecognitionEvent::Started);
        assert!(machine.is_recording());
    }

    #[test]
    fn test_ended_without_transcript_keeps_status_quiet() {
        let mut machine = recording_machine();
        machine.apply(&RecognitionEvent::Ended);
        assert_ne!(machine.status_view().tone, StatusTone::Success);
    }

    #[test]
    fn test_recording_and_idle_views_are_mutually_exclusive() {
        let mut machine = SessionMachine::new();
        assert!(!machine.toggle_view().engaged);

        machine.apply(&RecognitionEvent::Started);
        assert!(machine.toggle_view().engaged);

        machine.apply(&RecognitionEvent::Ended);
        assert!(!machine.toggle_view().engaged);
    }

    #[test]
    fn test_disabled_is_terminal() {
        let mut machine = SessionMachine::disabled("no model installed");
        assert!(machine.is_disabled());
        assert!(!machine.toggle_view().enabled);

        machine.apply(&RecognitionEvent::Started);
        machine.apply(&RecognitionEvent::Final("fever".to_string()));
        assert!(machine.is_disabled());
        assert_eq!(machine.transcript(), "");
    }

    #[test]
    fn test_start_failure_keeps_idle_with_error_status() {
        let mut machine = SessionMachine::new();
        machine.start_failed("audio device busy");
        assert_eq!(machine.state(), SessionState::Idle);
        assert_eq!(machine.status_view().tone, StatusTone::Error);
        assert!(machine.status_view().text.contains("audio device busy"));
    }

    #[test]
    fn test_sample_buffer_duration() {
        let mut buffer = SampleBuffer::new(16_000);
        assert!(buffer.is_empty());
        buffer.push_samples(&vec![0i16; 16_000]);
        assert_eq!(buffer.len(), 16_000);
        assert!((buffer.duration_secs() - 1.0).abs() < 0.001);
    }
}

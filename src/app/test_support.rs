//! Shared fakes for exercising the flows without a live network or a
//! live transcription platform.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use crate::domain::{Coordinates, DomainError, RecognitionEvent, RecognitionLocale, TriageResult};
use crate::ports::{
    Geolocator, HandoffStore, HttpClient, HttpResponse, RecognitionSession, SpeechRecognizer,
};

/// Scripted HTTP transport. Records every request; answers from a queue,
/// or with an empty 200 when the queue runs dry. A gate, when armed,
/// parks the next request until notified.
pub struct MockHttpClient {
    posts: Mutex<Vec<(String, serde_json::Value)>>,
    gets: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<HttpResponse, DomainError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            gets: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
        }
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: DomainError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Park the next request until the returned handle is notified.
    pub fn arm_gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&notify));
        notify
    }

    pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
        self.posts.lock().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.posts.lock().len() + self.gets.lock().len()
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().take();
        if let Some(notify) = gate {
            notify.notified().await;
        }
    }

    fn answer(&self) -> Result<HttpResponse, DomainError> {
        self.responses.lock().pop_front().unwrap_or(Ok(HttpResponse {
            status: 200,
            body: "{}".to_string(),
        }))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, DomainError> {
        self.gets.lock().push(url.to_string());
        self.wait_gate().await;
        self.answer()
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, DomainError> {
        self.posts.lock().push((url.to_string(), body.clone()));
        self.wait_gate().await;
        self.answer()
    }
}

/// Geolocator answering from a fixed script.
pub struct MockGeolocator {
    answer: Mutex<Option<Result<Coordinates, DomainError>>>,
}

impl MockGeolocator {
    pub fn answering(coords: Coordinates) -> Self {
        Self {
            answer: Mutex::new(Some(Ok(coords))),
        }
    }

    pub fn denying() -> Self {
        Self {
            answer: Mutex::new(Some(Err(DomainError::Geolocation(
                "permission denied".to_string(),
            )))),
        }
    }
}

#[async_trait]
impl Geolocator for MockGeolocator {
    async fn locate(&self) -> Result<Coordinates, DomainError> {
        match self.answer.lock().take() {
            Some(result) => result,
            None => Err(DomainError::Geolocation("no scripted answer".to_string())),
        }
    }
}

/// In-memory handoff store.
#[derive(Default)]
pub struct MemoryHandoffStore {
    result: Mutex<Option<TriageResult>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn save_result(&self, result: &TriageResult) -> Result<(), DomainError> {
        *self.result.lock() = Some(result.clone());
        Ok(())
    }

    fn load_result(&self) -> Result<Option<TriageResult>, DomainError> {
        Ok(self.result.lock().clone())
    }

    fn clear(&self) -> Result<(), DomainError> {
        *self.result.lock() = None;
        Ok(())
    }
}

/// Recognizer that replays scripted event sequences, one per session.
///
/// A session's channel stays open after the script plays out, so a
/// consumer sees the stream as still live; `push_closing_session` closes
/// it instead, the way a session that died mid-flight would.
pub struct ScriptedRecognizer {
    sessions: Mutex<VecDeque<(Vec<RecognitionEvent>, bool)>>,
    reject_start: Mutex<bool>,
    started_locales: Mutex<Vec<RecognitionLocale>>,
    open_senders: Mutex<Vec<mpsc::Sender<RecognitionEvent>>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            reject_start: Mutex::new(false),
            started_locales: Mutex::new(Vec::new()),
            open_senders: Mutex::new(Vec::new()),
        }
    }

    pub fn push_session(&self, events: Vec<RecognitionEvent>) {
        self.sessions.lock().push_back((events, false));
    }

    /// Like `push_session`, but the channel closes once the script has
    /// played out, without any terminal event.
    pub fn push_closing_session(&self, events: Vec<RecognitionEvent>) {
        self.sessions.lock().push_back((events, true));
    }

    /// Make the next start command fail the way a busy platform would.
    pub fn reject_next_start(&self) {
        *self.reject_start.lock() = true;
    }

    pub fn started_locales(&self) -> Vec<RecognitionLocale> {
        self.started_locales.lock().clone()
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, locale: RecognitionLocale) -> Result<RecognitionSession, DomainError> {
        if std::mem::take(&mut *self.reject_start.lock()) {
            return Err(DomainError::Recognition("audio device busy".to_string()));
        }

        self.started_locales.lock().push(locale);

        let (events, close) = self.sessions.lock().pop_front().unwrap_or_default();
        let (tx, rx) = mpsc::channel(64);
        for event in events {
            let _ = tx.try_send(event);
        }
        if !close {
            self.open_senders.lock().push(tx);
        }
        Ok(RecognitionSession::new(rx, Arc::new(AtomicBool::new(false))))
    }
}

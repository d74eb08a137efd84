use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{
    IpGeolocator, JsonHandoffStore, ReqwestHttpClient, TomlConfigStore, WhisperRecognizer,
};
use crate::app::state::{LoadingFlag, LocationEstimate, SymptomField};
use crate::app::submission::TriageGateway;
use crate::app::voice::{VoiceCapture, VoiceSnapshot};
use crate::domain::{
    AppConfig, BackendHealth, Coordinates, DomainError, Language, SymptomReport, TriageResult,
    FALLBACK_LOCATION,
};
use crate::ports::{ConfigStore, Geolocator, HandoffStore, HttpClient, RecognizerCapability};

/// The intake controller: owns every piece of per-session state and the
/// wired adapters, and exposes the operations a front surface drives.
///
/// All session state lives here. Initialization resolves the speech
/// capability exactly once and hands it to the voice component; nothing
/// re-probes afterwards.
pub struct IntakeController {
    language: Language,
    field: SymptomField,
    location: LocationEstimate,
    loading: LoadingFlag,
    ayushman_card: AtomicBool,
    share_location: AtomicBool,
    gateway: TriageGateway,
    geolocator: Option<Arc<dyn Geolocator>>,
    handoff: Arc<dyn HandoffStore>,
    voice: Mutex<VoiceCapture>,
}

impl IntakeController {
    /// Wire the real adapters: config from disk, logging, HTTP transport
    /// restricted to the configured hosts, IP geolocation, and the local
    /// transcription capability.
    ///
    /// The returned guard keeps the log writer alive; hold it for the
    /// life of the process.
    pub fn new() -> Result<(Self, Option<WorkerGuard>), DomainError> {
        let store = TomlConfigStore::new()?;
        let config = store.load()?;

        let log_guard = crate::infrastructure::init_logging(
            &store.logs_dir(),
            &config.logging.level,
            config.logging.file_logging,
        )?;

        let mut allowed_hosts = Vec::new();
        if let Some(host) = ReqwestHttpClient::host_of(&config.backend.base_url) {
            allowed_hosts.push(host);
        }
        if let Some(host) = ReqwestHttpClient::host_of(&config.geolocation.provider_url) {
            allowed_hosts.push(host);
        }
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(allowed_hosts)?);

        let geolocator: Option<Arc<dyn Geolocator>> = if config.geolocation.enabled {
            Some(Arc::new(IpGeolocator::new(
                Arc::clone(&http),
                &config.geolocation,
            )))
        } else {
            None
        };

        let handoff: Arc<dyn HandoffStore> = Arc::new(JsonHandoffStore::new(store.data_dir()));
        let capability = WhisperRecognizer::probe(&config.recognition);

        let controller = Self::from_parts(&config, http, geolocator, handoff, capability)?;
        info!(
            backend = %config.backend.base_url,
            voice = controller.voice_supported(),
            "Intake controller initialized"
        );
        Ok((controller, log_guard))
    }

    /// Assemble from already-built parts. Tests use this with fakes.
    pub fn from_parts(
        config: &AppConfig,
        http: Arc<dyn HttpClient>,
        geolocator: Option<Arc<dyn Geolocator>>,
        handoff: Arc<dyn HandoffStore>,
        capability: RecognizerCapability,
    ) -> Result<Self, DomainError> {
        let language = Language::from_pref(&config.language);
        let field = SymptomField::new();
        let voice = VoiceCapture::new(capability, language, field.clone());

        Ok(Self {
            language,
            field,
            location: LocationEstimate::new(),
            loading: LoadingFlag::new(),
            ayushman_card: AtomicBool::new(false),
            share_location: AtomicBool::new(false),
            gateway: TriageGateway::new(http, &config.backend.base_url)?,
            geolocator,
            handoff,
            voice: Mutex::new(voice),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn symptom_text(&self) -> String {
        self.field.get()
    }

    pub fn set_symptoms(&self, text: impl Into<String>) {
        self.field.set(text);
    }

    pub fn ayushman_card(&self) -> bool {
        self.ayushman_card.load(Ordering::Relaxed)
    }

    pub fn set_ayushman_card(&self, held: bool) {
        self.ayushman_card.store(held, Ordering::Relaxed);
    }

    pub fn share_location(&self) -> bool {
        self.share_location.load(Ordering::Relaxed)
    }

    /// Consent toggle for attaching a location estimate. Turning it off
    /// drops nothing already estimated; the estimate is simply not sent.
    pub fn set_share_location(&self, share: bool) {
        self.share_location.store(share, Ordering::Relaxed);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Current location estimate, if a query has completed.
    pub fn location(&self) -> Option<Coordinates> {
        self.location.current()
    }

    /// Run a location query and record the estimate.
    ///
    /// A failed or denied query records the fallback coordinates, so that
    /// a submission after a broken provider still carries a usable
    /// location. Until any query completes, the estimate stays empty.
    pub async fn refresh_location(&self) {
        let Some(geolocator) = &self.geolocator else {
            return;
        };
        if !self.share_location() {
            return;
        }

        match geolocator.locate().await {
            Ok(coords) => {
                info!(lat = coords.lat, lng = coords.lng, "Location estimated");
                self.location.set(coords);
            }
            Err(e) => {
                warn!(error = %e, "Location query failed, using fallback");
                self.location.set(FALLBACK_LOCATION);
            }
        }
    }

    /// Submit the current intake to the triage backend.
    ///
    /// Validation runs before anything touches the network: empty
    /// symptoms never produce a request. At most one submission is in
    /// flight; a second call while one runs is rejected without a
    /// request. A successful result is persisted for the results surface
    /// before it is returned.
    pub async fn submit(&self) -> Result<TriageResult, DomainError> {
        let report = SymptomReport::new(
            &self.field.trimmed(),
            self.language,
            self.ayushman_card(),
            self.share_location()
                .then(|| self.location.current())
                .flatten(),
        )?;

        let _guard = self.loading.acquire()?;

        let result = self.gateway.submit(&report).await?;
        self.handoff.save_result(&result)?;
        info!(
            severity = result.severity().unwrap_or("unknown"),
            "Triage result received"
        );
        Ok(result)
    }

    pub async fn backend_health(&self) -> Result<BackendHealth, DomainError> {
        self.gateway.health().await
    }

    /// Last persisted triage result, if any.
    pub fn last_result(&self) -> Result<Option<TriageResult>, DomainError> {
        self.handoff.load_result()
    }

    pub fn voice_supported(&self) -> bool {
        self.voice.lock().snapshot().toggle.enabled
    }

    pub fn voice_active(&self) -> bool {
        self.voice.lock().is_active()
    }

    /// The voice toggle: start recording while idle, stop while
    /// recording.
    pub fn toggle_voice(&self) -> Result<(), DomainError> {
        self.voice.lock().toggle()
    }

    pub fn stop_voice(&self) {
        self.voice.lock().stop();
    }

    /// Drain pending transcription events into the symptom field.
    /// Returns the number of events applied.
    pub fn pump_voice(&self) -> usize {
        self.voice.lock().pump()
    }

    pub fn voice_snapshot(&self) -> VoiceSnapshot {
        self.voice.lock().snapshot()
    }
}

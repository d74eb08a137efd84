use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::domain::config::RecognitionConfig;
use crate::domain::{DomainError, RecognitionEvent, RecognitionLocale, SampleBuffer};
use crate::ports::{RecognitionSession, RecognizerCapability, SpeechRecognizer};

type RingProducer = ringbuf::HeapProd<i16>;
type RingConsumer = ringbuf::HeapCons<i16>;

/// Hard cap on a single session; the ring buffer is sized to it.
const MAX_SESSION_SECS: usize = 120;

/// Minimum audio before a provisional decode is worth running.
const MIN_DECODE_SAMPLES_SECS: f32 = 0.5;

/// Speech transcription backed by whisper.cpp, fed by a cpal capture
/// stream through a lock-free ring buffer.
///
/// Each session runs on a dedicated thread (the cpal Stream is not Send)
/// and emits the ordered event stream the session state machine consumes:
/// periodic provisional decodes as `Interim`, one full decode as `Final`,
/// then `Ended`. Trailing silence after speech ends the session on its
/// own, the way a one-shot transcription facility does.
pub struct WhisperRecognizer {
    context: Arc<WhisperContext>,
    config: RecognitionConfig,
    threads: u32,
}

impl WhisperRecognizer {
    /// Resolve the speech capability once, at initialization.
    ///
    /// Available only when a model is configured and loadable AND an
    /// audio input device is present; any missing piece disables the
    /// voice control permanently with the reason surfaced to the user.
    pub fn probe(config: &RecognitionConfig) -> RecognizerCapability {
        let Some(path) = config.model_path.as_ref() else {
            info!("No recognition model configured, voice input disabled");
            return RecognizerCapability::unavailable("no recognition model configured");
        };

        if !path.exists() {
            warn!(path = ?path, "Recognition model not found, voice input disabled");
            return RecognizerCapability::unavailable(format!(
                "model not found: {}",
                path.display()
            ));
        }

        if cpal::default_host().default_input_device().is_none() {
            warn!("No audio input device, voice input disabled");
            return RecognizerCapability::unavailable("no audio input device");
        }

        let context = match WhisperContext::new_with_params(
            &path.to_string_lossy(),
            WhisperContextParameters::default(),
        ) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to load recognition model");
                return RecognizerCapability::unavailable(format!("model failed to load: {e}"));
            }
        };

        let threads = if config.threads == 0 {
            std::thread::available_parallelism()
                .map(|p| std::cmp::max(1, p.get() as u32 - 1))
                .unwrap_or(1)
        } else {
            config.threads
        };

        info!(path = ?path, threads, "Speech recognition available");

        RecognizerCapability::Available(Arc::new(Self {
            context: Arc::new(context),
            config: config.clone(),
            threads,
        }))
    }
}

fn decode(
    context: &WhisperContext,
    threads: u32,
    buffer: &SampleBuffer,
    locale: RecognitionLocale,
) -> Result<String, DomainError> {
    if buffer.is_empty() {
        return Ok(String::new());
    }

    let samples = dsp::to_f32(buffer.samples());

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(threads as i32);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_language(Some(locale.language_code()));
    params.set_suppress_non_speech_tokens(true);

    let mut state = context
        .create_state()
        .map_err(|e| DomainError::Recognition(format!("failed to create decoder state: {e}")))?;

    state
        .full(params, &samples)
        .map_err(|e| DomainError::Recognition(format!("decoding failed: {e}")))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| DomainError::Recognition(format!("failed to read segments: {e}")))?;

    let mut text = String::new();
    for i in 0..num_segments {
        if let Ok(segment) = state.full_get_segment_text(i) {
            text.push_str(&segment);
        }
    }

    Ok(text.trim().to_string())
}

impl SpeechRecognizer for WhisperRecognizer {
    fn start(&self, locale: RecognitionLocale) -> Result<RecognitionSession, DomainError> {
        let (tx, rx) = mpsc::channel(64);
        let stop = Arc::new(AtomicBool::new(false));

        let worker = SessionWorker {
            context: Arc::clone(&self.context),
            config: self.config.clone(),
            threads: self.threads,
            locale,
            stop: Arc::clone(&stop),
            events: tx,
        };

        thread::Builder::new()
            .name("voice-capture".to_string())
            .spawn(move || worker.run())
            .map_err(|e| DomainError::Recognition(format!("failed to spawn capture thread: {e}")))?;

        Ok(RecognitionSession::new(rx, stop))
    }
}

/// One live capture-and-decode session. Owns the cpal Stream for its
/// whole lifetime on its own thread.
struct SessionWorker {
    context: Arc<WhisperContext>,
    config: RecognitionConfig,
    threads: u32,
    locale: RecognitionLocale,
    stop: Arc<AtomicBool>,
    events: mpsc::Sender<RecognitionEvent>,
}

impl SessionWorker {
    fn run(self) {
        let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let capacity = MAX_SESSION_SECS * self.config.sample_rate as usize;
        let ring = HeapRb::<i16>::new(capacity);
        let (producer, mut consumer) = ring.split();

        let _stream = match self.build_capture_stream(producer, Arc::clone(&stream_error)) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Failed to open capture stream");
                let _ = self.events.blocking_send(RecognitionEvent::Error(e.to_string()));
                let _ = self.events.blocking_send(RecognitionEvent::Ended);
                return;
            }
        };

        let _ = self.events.blocking_send(RecognitionEvent::Started);
        debug!(locale = self.locale.bcp47(), "Recognition session started");

        let interim_interval = Duration::from_millis(self.config.interim_interval_ms);
        let min_decode_samples =
            (self.config.sample_rate as f32 * MIN_DECODE_SAMPLES_SECS) as usize;

        let mut buffer = SampleBuffer::new(self.config.sample_rate);
        let mut chunk = vec![0i16; self.config.sample_rate as usize];
        let mut last_interim = String::new();
        let mut watchdog = SilenceWatchdog::new(
            self.config.silence_threshold,
            Duration::from_millis(self.config.silence_timeout_ms),
            Duration::from_millis(self.config.no_speech_timeout_ms),
            Instant::now(),
        );
        let mut failure: Option<String> = None;

        loop {
            thread::sleep(interim_interval);

            // Drain whatever the capture callback produced since the last
            // tick, measuring each pop on its own so the watchdog never
            // sees stale residue from the reused chunk buffer.
            let mut drained = 0usize;
            loop {
                let n = consumer.pop_slice(&mut chunk);
                if n == 0 {
                    break;
                }
                buffer.push_samples(&chunk[..n]);
                watchdog.observe(dsp::rms(&chunk[..n]), Instant::now());
                drained += n;
            }

            if let Some(detail) = stream_error.lock().take() {
                failure = Some(detail);
                break;
            }

            if self.stop.load(Ordering::Acquire) {
                break;
            }

            match watchdog.verdict(Instant::now()) {
                Verdict::EndOfSpeech => {
                    debug!("Trailing silence, ending session");
                    break;
                }
                Verdict::NoSpeech => {
                    debug!("No speech heard, ending session");
                    failure = Some("no speech detected".to_string());
                    break;
                }
                Verdict::Continue => {}
            }

            if buffer.len() >= capacity {
                debug!("Session buffer full, ending session");
                break;
            }

            if drained > 0 && buffer.len() >= min_decode_samples {
                match decode(&self.context, self.threads, &buffer, self.locale) {
                    Ok(text) => {
                        if !text.is_empty() && text != last_interim {
                            last_interim = text.clone();
                            let _ = self.events.try_send(RecognitionEvent::Interim(text));
                        }
                    }
                    Err(e) => {
                        failure = Some(e.to_string());
                        break;
                    }
                }
            }
        }

        // The final decode still runs on an orderly stop; a failed
        // session surfaces its error and skips straight to the end.
        if let Some(detail) = failure {
            error!(error = %detail, "Recognition session failed");
            let _ = self.events.blocking_send(RecognitionEvent::Error(detail));
        } else {
            match decode(&self.context, self.threads, &buffer, self.locale) {
                Ok(text) if !text.is_empty() => {
                    let _ = self.events.blocking_send(RecognitionEvent::Final(text));
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Final decode failed");
                    let _ = self.events.blocking_send(RecognitionEvent::Error(e.to_string()));
                }
            }
        }

        let _ = self.events.blocking_send(RecognitionEvent::Ended);
        info!(
            duration_secs = buffer.duration_secs(),
            "Recognition session ended"
        );
    }

    fn build_capture_stream(
        &self,
        mut producer: RingProducer,
        stream_error: Arc<Mutex<Option<String>>>,
    ) -> Result<Stream, DomainError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| DomainError::Recognition("no audio input device".to_string()))?;

        let supported = device.default_input_config().map_err(|e| {
            DomainError::Recognition(format!("failed to read device config: {e}"))
        })?;

        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };
        let channels = stream_config.channels as usize;
        let device_rate = stream_config.sample_rate.0;
        let target_rate = self.config.sample_rate;

        debug!(
            device = device.name().unwrap_or_else(|_| "unknown".to_string()),
            device_rate,
            channels,
            format = ?supported.sample_format(),
            "Opening capture stream"
        );

        let err_slot = Arc::clone(&stream_error);
        let on_error = move |err: cpal::StreamError| {
            error!(?err, "Capture stream error");
            *err_slot.lock() = Some(err.to_string());
        };

        let stream = match supported.sample_format() {
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = dsp::downmix(data, channels);
                    let resampled = dsp::resample(&mono, device_rate, target_rate);
                    let _ = producer.push_slice(&resampled);
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let as_i16: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                        .collect();
                    let mono = dsp::downmix(&as_i16, channels);
                    let resampled = dsp::resample(&mono, device_rate, target_rate);
                    let _ = producer.push_slice(&resampled);
                },
                on_error,
                None,
            ),
            other => {
                return Err(DomainError::Recognition(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        }
        .map_err(|e| DomainError::Recognition(format!("failed to build stream: {e}")))?;

        stream
            .play()
            .map_err(|e| DomainError::Recognition(format!("failed to start stream: {e}")))?;

        Ok(stream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Continue,
    /// Speech was heard and has trailed off; end the session normally.
    EndOfSpeech,
    /// Nothing was ever heard; the session errors out instead of
    /// recording silence until the buffer cap.
    NoSpeech,
}

/// Decides when a session should end on its own, from the RMS level of
/// each drained capture chunk.
///
/// The trailing-silence end only arms once speech has been heard;
/// before that, a separate no-speech deadline applies.
struct SilenceWatchdog {
    threshold: f32,
    silence_timeout: Duration,
    no_speech_timeout: Duration,
    started: Instant,
    speech_seen: bool,
    silence_since: Option<Instant>,
}

impl SilenceWatchdog {
    fn new(
        threshold: f32,
        silence_timeout: Duration,
        no_speech_timeout: Duration,
        started: Instant,
    ) -> Self {
        Self {
            threshold,
            silence_timeout,
            no_speech_timeout,
            started,
            speech_seen: false,
            silence_since: None,
        }
    }

    fn observe(&mut self, level: f32, now: Instant) {
        if level >= self.threshold {
            self.speech_seen = true;
            self.silence_since = None;
        } else if self.speech_seen && self.silence_since.is_none() {
            self.silence_since = Some(now);
        }
    }

    fn verdict(&self, now: Instant) -> Verdict {
        if let Some(since) = self.silence_since {
            if now.duration_since(since) >= self.silence_timeout {
                return Verdict::EndOfSpeech;
            }
        }
        if !self.speech_seen && now.duration_since(self.started) >= self.no_speech_timeout {
            return Verdict::NoSpeech;
        }
        Verdict::Continue
    }
}

/// Sample-processing helpers shared by the capture callbacks.
mod dsp {
    pub fn downmix(data: &[i16], channels: usize) -> Vec<i16> {
        if channels <= 1 {
            return data.to_vec();
        }
        data.chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
        if from_rate == to_rate || samples.is_empty() {
            return samples.to_vec();
        }

        let ratio = from_rate as f64 / to_rate as f64;
        let output_len = (samples.len() as f64 / ratio).ceil() as usize;
        let mut output = Vec::with_capacity(output_len);

        for i in 0..output_len {
            let src_pos = i as f64 * ratio;
            let src_idx = src_pos.floor() as usize;
            let frac = src_pos.fract();

            let sample = if src_idx + 1 < samples.len() {
                let s0 = samples[src_idx] as f64;
                let s1 = samples[src_idx + 1] as f64;
                (s0 + (s1 - s0) * frac) as i16
            } else if src_idx < samples.len() {
                samples[src_idx]
            } else {
                0
            };
            output.push(sample);
        }
        output
    }

    pub fn rms(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = samples.iter().map(|&s| (s as f64).powi(2)).sum();
        let rms = (sum_squares / samples.len() as f64).sqrt();
        (rms / 32767.0).min(1.0) as f32
    }

    pub fn to_f32(samples: &[i16]) -> Vec<f32> {
        samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }
}

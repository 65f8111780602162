//! Phrase dispatcher — shared voice listener feeding per-trigger channels.
//!
//! A fixed pool of worker threads takes turns on one exclusive capture
//! device. Each captured clip is transcribed outside the capture lock, so
//! recognition and matching run concurrently while capture stays serial.
//! A transcript is scored against every registered phrase and, when the best
//! score reaches the threshold, the raw transcript is sent to that phrase's
//! channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use vocom_domain::error::{CaptureError, PhraseError, VocomError};
use vocom_domain::phrase::{self, DEFAULT_MATCH_THRESHOLD, PhraseMatcher};

use crate::ports::{CaptureDevice, SpeechToText};
use crate::sync::{lock, read, write};

/// Tuning knobs of the listener pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of listener threads.
    pub workers: usize,
    /// Longest a single capture may block.
    pub capture_timeout: Duration,
    /// Minimum score (0–100) for a transcript to be dispatched.
    pub match_threshold: u8,
    /// Sleep between checks while listening is paused.
    pub idle_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            capture_timeout: Duration::from_secs(5),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            idle_interval: Duration::from_secs(1),
        }
    }
}

struct Route {
    phrase: String,
    sender: Sender<String>,
}

struct Shared {
    config: DispatcherConfig,
    matcher: PhraseMatcher,
    capture: Mutex<Box<dyn CaptureDevice>>,
    transcriber: Arc<dyn SpeechToText>,
    routes: RwLock<Vec<Route>>,
    running: AtomicBool,
    listening: AtomicBool,
}

/// Process-wide voice listener shared by every voice trigger.
pub struct PhraseDispatcher {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl PhraseDispatcher {
    pub fn new(
        config: DispatcherConfig,
        capture: Box<dyn CaptureDevice>,
        transcriber: Arc<dyn SpeechToText>,
    ) -> Self {
        let matcher = PhraseMatcher::new(config.match_threshold);
        Self::with_matcher(config, matcher, capture, transcriber)
    }

    /// Like [`PhraseDispatcher::new`] with a custom matcher; the config's
    /// `match_threshold` is ignored in favour of the matcher's own.
    pub fn with_matcher(
        config: DispatcherConfig,
        matcher: PhraseMatcher,
        capture: Box<dyn CaptureDevice>,
        transcriber: Arc<dyn SpeechToText>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                matcher,
                capture: Mutex::new(capture),
                transcriber,
                routes: RwLock::new(Vec::new()),
                running: AtomicBool::new(false),
                listening: AtomicBool::new(false),
            }),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Register `phrases` to one new channel and return its receiving end.
    ///
    /// Every phrase is checked before any is inserted, so a failure leaves
    /// the table untouched.
    ///
    /// # Errors
    ///
    /// [`PhraseError::Empty`] for a blank phrase, or
    /// [`PhraseError::AlreadyRegistered`] if a phrase is already routed
    /// (or repeated in `phrases`).
    pub fn add_trigger_phrases<S: AsRef<str>>(
        &self,
        phrases: &[S],
    ) -> Result<Receiver<String>, PhraseError> {
        let normalized = normalize_all(phrases)?;
        let mut routes = write(&self.shared.routes);
        for (index, phrase) in normalized.iter().enumerate() {
            let repeated = normalized[..index].contains(phrase);
            if repeated || routes.iter().any(|route| &route.phrase == phrase) {
                return Err(PhraseError::AlreadyRegistered {
                    phrase: phrase.clone(),
                });
            }
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        for phrase in normalized {
            tracing::debug!(%phrase, "registered trigger phrase");
            routes.push(Route {
                phrase,
                sender: sender.clone(),
            });
        }
        Ok(receiver)
    }

    /// Release `phrases`. All must be registered, otherwise nothing is
    /// removed.
    ///
    /// # Errors
    ///
    /// [`PhraseError::NotRegistered`] or [`PhraseError::Empty`].
    pub fn remove_trigger_phrases<S: AsRef<str>>(&self, phrases: &[S]) -> Result<(), PhraseError> {
        let normalized = normalize_all(phrases)?;
        let mut routes = write(&self.shared.routes);
        if let Some(missing) = normalized
            .iter()
            .find(|phrase| !routes.iter().any(|route| &route.phrase == *phrase))
        {
            return Err(PhraseError::NotRegistered {
                phrase: missing.clone(),
            });
        }
        routes.retain(|route| !normalized.contains(&route.phrase));
        Ok(())
    }

    /// Registered phrases in registration order.
    #[must_use]
    pub fn registered_phrases(&self) -> Vec<String> {
        read(&self.shared.routes)
            .iter()
            .map(|route| route.phrase.clone())
            .collect()
    }

    /// Spawn the listener pool. Calling it while running does nothing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a worker thread cannot be spawned; workers
    /// already started are stopped again.
    pub fn start(&self) -> Result<(), VocomError> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.shared.listening.store(true, Ordering::SeqCst);

        let mut workers = lock(&self.workers);
        for index in 0..self.shared.config.workers {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("vocom-listener-{index}"))
                .spawn(move || worker_loop(&shared, index));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(workers);
                    self.stop();
                    return Err(err.into());
                }
            }
        }
        tracing::info!(workers = self.shared.config.workers, "phrase dispatcher started");
        Ok(())
    }

    /// Stop and join every worker. A worker blocked in capture finishes
    /// that capture first, so this may take up to one capture timeout.
    /// Calling it while stopped does nothing.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.shared.listening.store(false, Ordering::SeqCst);

        let handles: Vec<_> = lock(&self.workers).drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("listener worker panicked");
            }
        }
        tracing::info!("phrase dispatcher stopped");
    }

    /// Resume capturing after [`PhraseDispatcher::stop_listening`].
    pub fn start_listening(&self) {
        self.shared.listening.store(true, Ordering::SeqCst);
    }

    /// Pause capturing without tearing the workers down.
    pub fn stop_listening(&self) {
        self.shared.listening.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }

    /// Number of worker threads currently owned.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        lock(&self.workers).len()
    }

    /// Match a transcript against the registered phrases and forward it to
    /// the winning channel. Returns whether it was delivered.
    pub fn dispatch(&self, transcript: &str) -> bool {
        self.shared.dispatch(transcript)
    }
}

impl Drop for PhraseDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn dispatch(&self, transcript: &str) -> bool {
        let routes = read(&self.routes);
        let candidates = routes.iter().map(|route| route.phrase.as_str());
        let Some(found) = self.matcher.best_match(transcript, candidates) else {
            tracing::debug!(transcript, "no phrase matched");
            return false;
        };
        let Some(route) = routes.iter().find(|route| route.phrase == found.phrase) else {
            return false;
        };
        tracing::debug!(transcript, phrase = found.phrase, score = found.score, "phrase matched");
        if route.sender.send(transcript.to_string()).is_err() {
            tracing::debug!(phrase = found.phrase, "phrase channel closed");
            return false;
        }
        true
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn worker_loop(shared: &Shared, index: usize) {
    let _span = tracing::debug_span!("listener", worker = index).entered();
    tracing::debug!("listener worker started");
    while shared.is_running() {
        if !shared.listening.load(Ordering::SeqCst) {
            thread::sleep(shared.config.idle_interval);
            continue;
        }
        listen_once(shared);
    }
    tracing::debug!("listener worker exited");
}

fn listen_once(shared: &Shared) {
    let clip = {
        let mut device = lock(&shared.capture);
        if !shared.is_running() {
            return;
        }
        device.capture(shared.config.capture_timeout)
    };

    let clip = match clip {
        Ok(clip) => clip,
        Err(CaptureError::Timeout(waited)) => {
            tracing::debug!(?waited, "no utterance captured");
            return;
        }
        Err(err) => {
            tracing::warn!(error = %err, "capture failed");
            return;
        }
    };

    match shared.transcriber.transcribe(&clip) {
        Ok(transcript) => {
            shared.dispatch(&transcript);
        }
        Err(err) => tracing::warn!(error = %err, "transcription failed"),
    }
}

fn normalize_all<S: AsRef<str>>(phrases: &[S]) -> Result<Vec<String>, PhraseError> {
    phrases
        .iter()
        .map(|phrase| phrase::normalize(phrase.as_ref()))
        .collect()
}

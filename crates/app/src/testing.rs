//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use vocom_domain::axis::AxisKey;
use vocom_domain::error::{BackendError, CaptureError, TranscriptionError};
use vocom_domain::window::WindowCriteria;

use crate::axis_sampler::AxisSampler;
use crate::context::EngineContext;
use crate::dispatcher::{DispatcherConfig, PhraseDispatcher};
use crate::ports::{AudioClip, AutomationBackend, CaptureDevice, HotkeyCallback, SpeechToText};
use crate::sync::lock;

#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<String>>,
    hotkeys: Mutex<HashMap<String, HotkeyCallback>>,
    axes: Mutex<HashMap<AxisKey, f64>>,
    windows: Mutex<Vec<String>>,
    active_window: Mutex<Option<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeBackend {
    pub(crate) fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Simulate a key press; returns whether a hotkey was installed.
    pub(crate) fn press(&self, spec: &str) -> bool {
        let callback = lock(&self.hotkeys).get(spec).cloned();
        callback.map(|callback| callback()).is_some()
    }

    pub(crate) fn installed_hotkeys(&self) -> Vec<String> {
        let mut specs: Vec<_> = lock(&self.hotkeys).keys().cloned().collect();
        specs.sort();
        specs
    }

    pub(crate) fn set_axis(&self, key: AxisKey, value: f64) {
        lock(&self.axes).insert(key, value);
    }

    pub(crate) fn clear_axis(&self, key: AxisKey) {
        lock(&self.axes).remove(&key);
    }

    pub(crate) fn open_window(&self, title: &str) {
        lock(&self.windows).push(title.to_string());
    }

    pub(crate) fn focus_window(&self, title: &str) {
        *lock(&self.active_window) = Some(title.to_string());
    }

    /// Make every later call to `operation` fail.
    pub(crate) fn fail(&self, operation: &'static str) {
        lock(&self.failing).insert(operation);
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<(), BackendError> {
        if lock(&self.failing).contains(operation) {
            return Err(BackendError::Failed {
                operation,
                message: "injected failure".to_string(),
            });
        }
        lock(&self.calls).push(format!("{operation}:{detail}"));
        Ok(())
    }

    fn matches(criteria: &WindowCriteria, title: &str) -> bool {
        criteria.title.as_deref().is_none_or(|wanted| title.contains(wanted))
    }
}

impl AutomationBackend for FakeBackend {
    fn install_hotkey(&self, spec: &str, callback: HotkeyCallback) -> Result<(), BackendError> {
        self.record("install_hotkey", spec.to_string())?;
        lock(&self.hotkeys).insert(spec.to_string(), callback);
        Ok(())
    }

    fn uninstall_hotkey(&self, spec: &str) -> Result<(), BackendError> {
        self.record("uninstall_hotkey", spec.to_string())?;
        lock(&self.hotkeys).remove(spec);
        Ok(())
    }

    fn send_input(&self, input: &str) -> Result<(), BackendError> {
        self.record("send_input", input.to_string())
    }

    fn key_down(&self, key: &str) -> Result<(), BackendError> {
        self.record("key_down", key.to_string())
    }

    fn key_up(&self, key: &str) -> Result<(), BackendError> {
        self.record("key_up", key.to_string())
    }

    fn window_exists(&self, criteria: &WindowCriteria) -> Result<bool, BackendError> {
        self.record("window_exists", criteria.to_string())?;
        Ok(lock(&self.windows)
            .iter()
            .any(|title| Self::matches(criteria, title)))
    }

    fn window_active(&self, criteria: &WindowCriteria) -> Result<bool, BackendError> {
        self.record("window_active", criteria.to_string())?;
        Ok(lock(&self.active_window)
            .as_deref()
            .is_some_and(|title| Self::matches(criteria, title)))
    }

    fn activate_window(&self, criteria: &WindowCriteria) -> Result<(), BackendError> {
        let found = lock(&self.windows)
            .iter()
            .find(|title| Self::matches(criteria, title))
            .cloned();
        let Some(title) = found else {
            return Err(BackendError::WindowNotFound {
                criteria: criteria.to_string(),
            });
        };
        self.record("activate_window", title.clone())?;
        *lock(&self.active_window) = Some(title);
        Ok(())
    }

    fn play_sound(&self, path: &Path) -> Result<(), BackendError> {
        self.record("play_sound", path.display().to_string())
    }

    fn spawn_process(&self, program: &str, args: &[String]) -> Result<(), BackendError> {
        let mut detail = program.to_string();
        for arg in args {
            detail.push(' ');
            detail.push_str(arg);
        }
        self.record("spawn_process", detail)
    }

    fn read_axis(&self, key: AxisKey) -> Result<f64, BackendError> {
        lock(&self.axes)
            .get(&key)
            .copied()
            .ok_or_else(|| BackendError::AxisUnavailable {
                joystick: key.joystick,
                axis: key.axis.to_string(),
            })
    }
}

/// Never hears anything.
pub(crate) struct SilentMicrophone;

impl CaptureDevice for SilentMicrophone {
    fn capture(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError> {
        thread::sleep(timeout.min(Duration::from_millis(10)));
        Err(CaptureError::Timeout(timeout))
    }
}

/// Reads the clip bytes back as text.
pub(crate) struct EchoTranscriber;

impl SpeechToText for EchoTranscriber {
    fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscriptionError> {
        String::from_utf8(clip.data.clone()).map_err(|_| TranscriptionError::UnknownSpeech)
    }
}

pub(crate) fn dispatcher_config() -> DispatcherConfig {
    DispatcherConfig {
        workers: 1,
        capture_timeout: Duration::from_millis(10),
        idle_interval: Duration::from_millis(5),
        ..DispatcherConfig::default()
    }
}

/// A context over `backend` with a silent microphone and a fast sampler.
pub(crate) fn context(backend: &Arc<FakeBackend>) -> EngineContext {
    let backend: Arc<dyn AutomationBackend> = Arc::clone(backend) as Arc<dyn AutomationBackend>;
    let dispatcher = PhraseDispatcher::new(
        dispatcher_config(),
        Box::new(SilentMicrophone),
        Arc::new(EchoTranscriber),
    );
    let sampler = AxisSampler::new(Arc::clone(&backend), 200);
    EngineContext::new(backend, Arc::new(dispatcher), Arc::new(sampler))
}

//! In-memory automation backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vocom_app::ports::{AutomationBackend, HotkeyCallback};
use vocom_domain::axis::AxisKey;
use vocom_domain::error::BackendError;
use vocom_domain::window::{TitleMatchMode, WindowCriteria};

use crate::sync::lock;

/// A side effect requested from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SendInput(String),
    KeyDown(String),
    KeyUp(String),
    ActivateWindow(String),
    PlaySound(PathBuf),
    SpawnProcess { program: String, args: Vec<String> },
}

/// A simulated top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWindow {
    pub title: String,
    pub text: String,
    pub hidden: bool,
}

impl VirtualWindow {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: String::new(),
            hidden: false,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn matches(&self, criteria: &WindowCriteria) -> Result<bool, BackendError> {
        if self.hidden && !criteria.detect_hidden_windows.unwrap_or(false) {
            return Ok(false);
        }
        let mode = criteria.title_match_mode.unwrap_or(TitleMatchMode::StartsWith);
        if let Some(title) = &criteria.title
            && !title_matches(mode, &self.title, title)?
        {
            return Ok(false);
        }
        if let Some(excluded) = &criteria.exclude_title
            && title_matches(mode, &self.title, excluded)?
        {
            return Ok(false);
        }
        if let Some(text) = &criteria.text
            && !self.text.contains(text.as_str())
        {
            return Ok(false);
        }
        if let Some(excluded) = &criteria.exclude_text
            && self.text.contains(excluded.as_str())
        {
            return Ok(false);
        }
        Ok(true)
    }
}

fn title_matches(mode: TitleMatchMode, title: &str, wanted: &str) -> Result<bool, BackendError> {
    match mode {
        TitleMatchMode::StartsWith => Ok(title.starts_with(wanted)),
        TitleMatchMode::Contains => Ok(title.contains(wanted)),
        TitleMatchMode::Exact => Ok(title == wanted),
        TitleMatchMode::Regex => Err(BackendError::Unsupported {
            operation: "regex title matching",
        }),
    }
}

#[derive(Default)]
struct Desktop {
    windows: Vec<VirtualWindow>,
    active: Option<usize>,
}

impl Desktop {
    fn find(&self, criteria: &WindowCriteria) -> Result<Option<usize>, BackendError> {
        for (index, window) in self.windows.iter().enumerate() {
            if window.matches(criteria)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

/// Simulated desktop: hotkeys are fired with [`press`](Self::press), side
/// effects are journaled and can be read back with
/// [`calls`](Self::calls).
#[derive(Default)]
pub struct VirtualBackend {
    hotkeys: Mutex<HashMap<String, HotkeyCallback>>,
    desktop: Mutex<Desktop>,
    axes: Mutex<HashMap<AxisKey, f64>>,
    journal: Mutex<Vec<BackendCall>>,
}

impl VirtualBackend {
    /// Simulate a hotkey press. Returns `false` when no hook is installed
    /// for `spec`.
    pub fn press(&self, spec: &str) -> bool {
        let callback = lock(&self.hotkeys).get(spec).cloned();
        match callback {
            Some(callback) => {
                tracing::debug!(spec, "virtual hotkey pressed");
                callback();
                true
            }
            None => false,
        }
    }

    /// Installed hotkey specs, sorted.
    #[must_use]
    pub fn hotkeys(&self) -> Vec<String> {
        let mut specs: Vec<_> = lock(&self.hotkeys).keys().cloned().collect();
        specs.sort();
        specs
    }

    /// Open a window. It becomes the active window unless hidden.
    pub fn open_window(&self, window: VirtualWindow) {
        let mut desktop = lock(&self.desktop);
        let hidden = window.hidden;
        desktop.windows.push(window);
        if !hidden {
            desktop.active = Some(desktop.windows.len() - 1);
        }
    }

    /// Close every window with exactly this title.
    pub fn close_window(&self, title: &str) {
        let mut desktop = lock(&self.desktop);
        let active_title = desktop
            .active
            .map(|index| desktop.windows[index].title.clone());
        desktop.windows.retain(|window| window.title != title);
        let active = active_title
            .and_then(|active| desktop.windows.iter().position(|window| window.title == active));
        desktop.active = active;
    }

    #[must_use]
    pub fn active_title(&self) -> Option<String> {
        let desktop = lock(&self.desktop);
        desktop
            .active
            .map(|index| desktop.windows[index].title.clone())
    }

    /// Set the value reported for an axis, in percent.
    pub fn set_axis(&self, key: AxisKey, value: f64) {
        lock(&self.axes).insert(key, value);
    }

    /// Forget an axis, as if the joystick were unplugged.
    pub fn remove_axis(&self, key: AxisKey) {
        lock(&self.axes).remove(&key);
    }

    /// Side effects performed so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.journal).clone()
    }

    /// Return and forget the journal.
    pub fn take_calls(&self) -> Vec<BackendCall> {
        std::mem::take(&mut *lock(&self.journal))
    }

    fn record(&self, call: BackendCall) {
        tracing::debug!(?call, "virtual backend call");
        lock(&self.journal).push(call);
    }
}

impl AutomationBackend for VirtualBackend {
    fn install_hotkey(&self, spec: &str, callback: HotkeyCallback) -> Result<(), BackendError> {
        let mut hotkeys = lock(&self.hotkeys);
        if hotkeys.contains_key(spec) {
            return Err(BackendError::Failed {
                operation: "install_hotkey",
                message: format!("hotkey `{spec}` is already hooked"),
            });
        }
        hotkeys.insert(spec.to_string(), callback);
        Ok(())
    }

    fn uninstall_hotkey(&self, spec: &str) -> Result<(), BackendError> {
        lock(&self.hotkeys)
            .remove(spec)
            .map(|_| ())
            .ok_or_else(|| BackendError::Failed {
                operation: "uninstall_hotkey",
                message: format!("hotkey `{spec}` is not hooked"),
            })
    }

    fn send_input(&self, input: &str) -> Result<(), BackendError> {
        self.record(BackendCall::SendInput(input.to_string()));
        Ok(())
    }

    fn key_down(&self, key: &str) -> Result<(), BackendError> {
        self.record(BackendCall::KeyDown(key.to_string()));
        Ok(())
    }

    fn key_up(&self, key: &str) -> Result<(), BackendError> {
        self.record(BackendCall::KeyUp(key.to_string()));
        Ok(())
    }

    fn window_exists(&self, criteria: &WindowCriteria) -> Result<bool, BackendError> {
        Ok(lock(&self.desktop).find(criteria)?.is_some())
    }

    fn window_active(&self, criteria: &WindowCriteria) -> Result<bool, BackendError> {
        let desktop = lock(&self.desktop);
        match desktop.active {
            Some(index) => desktop.windows[index].matches(criteria),
            None => Ok(false),
        }
    }

    fn activate_window(&self, criteria: &WindowCriteria) -> Result<(), BackendError> {
        let title = {
            let mut desktop = lock(&self.desktop);
            let index = desktop
                .find(criteria)?
                .ok_or_else(|| BackendError::WindowNotFound {
                    criteria: criteria.to_string(),
                })?;
            desktop.active = Some(index);
            desktop.windows[index].title.clone()
        };
        self.record(BackendCall::ActivateWindow(title));
        Ok(())
    }

    fn play_sound(&self, path: &Path) -> Result<(), BackendError> {
        self.record(BackendCall::PlaySound(path.to_path_buf()));
        Ok(())
    }

    fn spawn_process(&self, program: &str, args: &[String]) -> Result<(), BackendError> {
        self.record(BackendCall::SpawnProcess {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(())
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

//! Automation backend port — hotkeys, synthetic input, windows, sound,
//! processes and joystick axes.

use std::path::Path;
use std::sync::Arc;

use vocom_domain::axis::AxisKey;
use vocom_domain::error::BackendError;
use vocom_domain::window::WindowCriteria;

/// Invoked by the backend on its own thread each time a hotkey is pressed.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Everything the engine asks of the host desktop.
///
/// Implementations must be callable from any thread.
pub trait AutomationBackend: Send + Sync {
    /// Start calling `callback` whenever `spec` is pressed.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the hotkey cannot be registered.
    fn install_hotkey(&self, spec: &str, callback: HotkeyCallback) -> Result<(), BackendError>;

    /// Stop reacting to `spec`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the hotkey cannot be released.
    fn uninstall_hotkey(&self, spec: &str) -> Result<(), BackendError>;

    /// Type `input` as synthetic keystrokes.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the input cannot be sent.
    fn send_input(&self, input: &str) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Returns a backend error if the key event cannot be sent.
    fn key_down(&self, key: &str) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Returns a backend error if the key event cannot be sent.
    fn key_up(&self, key: &str) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Returns a backend error if windows cannot be enumerated.
    fn window_exists(&self, criteria: &WindowCriteria) -> Result<bool, BackendError>;

    /// # Errors
    ///
    /// Returns a backend error if the foreground window cannot be queried.
    fn window_active(&self, criteria: &WindowCriteria) -> Result<bool, BackendError>;

    /// Bring the first matching window to the foreground.
    ///
    /// # Errors
    ///
    /// [`BackendError::WindowNotFound`] when nothing matches.
    fn activate_window(&self, criteria: &WindowCriteria) -> Result<(), BackendError>;

    /// Play a wav file.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the file cannot be played.
    fn play_sound(&self, path: &Path) -> Result<(), BackendError>;

    /// Launch `program` with `args` without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the process cannot be spawned.
    fn spawn_process(&self, program: &str, args: &[String]) -> Result<(), BackendError>;

    /// Current position of one joystick axis.
    ///
    /// # Errors
    ///
    /// [`BackendError::AxisUnavailable`] when the joystick does not report
    /// the axis.
    fn read_axis(&self, key: AxisKey) -> Result<f64, BackendError>;
}

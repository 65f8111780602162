//! Built-in effects.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::error::{ActionError, ArgumentError, VocomError};
use vocom_domain::window::WindowCriteria;

use super::Effect;
use crate::condition::window_criteria;
use crate::context::EngineContext;
use crate::ports::AutomationBackend;

type Restored = Result<Box<dyn Effect>, VocomError>;

/// Type `send_string` as synthetic input.
pub struct SendInput {
    send_string: String,
    backend: Arc<dyn AutomationBackend>,
}

impl SendInput {
    pub const TYPE: &'static str = "send_input";

    pub fn new(backend: Arc<dyn AutomationBackend>, send_string: impl Into<String>) -> Self {
        Self {
            send_string: send_string.into(),
            backend,
        }
    }

    pub(crate) fn restore(ctx: &EngineContext, args: &Arguments) -> Restored {
        args.expect_only(&["send_string"], false)?;
        let send_string: String = args.required("send_string")?;
        Ok(Box::new(Self::new(Arc::clone(ctx.backend()), send_string)))
    }
}

impl Effect for SendInput {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        Ok(self.backend.send_input(&self.send_string)?)
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new().with("send_string", self.send_string.as_str())
    }
}

/// Press and release one key, holding it long enough for games to notice.
pub struct PressKey {
    key: String,
    hold: Duration,
    backend: Arc<dyn AutomationBackend>,
}

impl PressKey {
    pub const TYPE: &'static str = "press_key";
    pub const DEFAULT_HOLD_MS: u64 = 100;

    pub fn new(backend: Arc<dyn AutomationBackend>, key: impl Into<String>, hold: Duration) -> Self {
        Self {
            key: key.into(),
            hold,
            backend,
        }
    }

    pub(crate) fn restore(ctx: &EngineContext, args: &Arguments) -> Restored {
        args.expect_only(&["key", "hold_ms"], false)?;
        let key: String = args.required("key")?;
        let hold_ms = args.optional("hold_ms")?.unwrap_or(Self::DEFAULT_HOLD_MS);
        Ok(Box::new(Self::new(
            Arc::clone(ctx.backend()),
            key,
            Duration::from_millis(hold_ms),
        )))
    }

    fn hold_ms(&self) -> u64 {
        u64::try_from(self.hold.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Effect for PressKey {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        self.backend.key_down(&self.key)?;
        thread::sleep(self.hold);
        self.backend.key_up(&self.key)?;
        thread::sleep(self.hold);
        Ok(())
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new()
            .with("key", self.key.as_str())
            .with("hold_ms", self.hold_ms())
    }
}

/// Play a wav file. The path is made absolute when the action is built.
pub struct PlaySound {
    sound_file_path: PathBuf,
    backend: Arc<dyn AutomationBackend>,
}

impl PlaySound {
    pub const TYPE: &'static str = "play_sound";

    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when the path cannot be made absolute.
    pub fn new(
        backend: Arc<dyn AutomationBackend>,
        sound_file_path: impl Into<PathBuf>,
    ) -> Result<Self, ArgumentError> {
        let path = sound_file_path.into();
        let sound_file_path = std::path::absolute(&path).map_err(|err| ArgumentError::Invalid {
            name: "sound_file_path".to_string(),
            expected: format!("a usable path ({err})"),
        })?;
        Ok(Self {
            sound_file_path,
            backend,
        })
    }

    pub(crate) fn restore(ctx: &EngineContext, args: &Arguments) -> Restored {
        args.expect_only(&["sound_file_path"], false)?;
        let path: String = args.required("sound_file_path")?;
        Ok(Box::new(Self::new(Arc::clone(ctx.backend()), path)?))
    }
}

impl Effect for PlaySound {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        Ok(self.backend.play_sound(&self.sound_file_path)?)
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new().with(
            "sound_file_path",
            self.sound_file_path.to_string_lossy().into_owned(),
        )
    }
}

/// Bring a window to the foreground.
pub struct ActivateWindow {
    criteria: WindowCriteria,
    backend: Arc<dyn AutomationBackend>,
}

impl ActivateWindow {
    pub const TYPE: &'static str = "activate_window";

    pub fn new(backend: Arc<dyn AutomationBackend>, criteria: WindowCriteria) -> Self {
        Self { criteria, backend }
    }

    pub(crate) fn restore(ctx: &EngineContext, args: &Arguments) -> Restored {
        let criteria = window_criteria(args)?;
        Ok(Box::new(Self::new(Arc::clone(ctx.backend()), criteria)))
    }
}

impl Effect for ActivateWindow {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        Ok(self.backend.activate_window(&self.criteria)?)
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::from(&self.criteria)
    }
}

/// Sleep the acting thread.
pub struct Pause {
    seconds: f64,
    duration: Duration,
}

impl Pause {
    pub const TYPE: &'static str = "pause";

    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] for a negative, non-finite or
    /// unrepresentably long duration.
    pub fn new(seconds: f64) -> Result<Self, ArgumentError> {
        let duration = Duration::try_from_secs_f64(seconds).map_err(|_| ArgumentError::Invalid {
            name: "seconds".to_string(),
            expected: "a finite, non-negative number of seconds".to_string(),
        })?;
        Ok(Self { seconds, duration })
    }

    pub(crate) fn restore(_ctx: &EngineContext, args: &Arguments) -> Restored {
        args.expect_only(&["seconds"], false)?;
        Ok(Box::new(Self::new(args.required("seconds")?)?))
    }
}

impl Effect for Pause {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        thread::sleep(self.duration);
        Ok(())
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new().with("seconds", self.seconds)
    }
}

/// Launch a program without waiting for it. `args` is the variadic
/// parameter.
pub struct RunProcess {
    program: String,
    args: Vec<String>,
    backend: Arc<dyn AutomationBackend>,
}

impl RunProcess {
    pub const TYPE: &'static str = "run_process";
    pub const VARIADIC: &'static str = "args";

    pub fn new(backend: Arc<dyn AutomationBackend>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            backend,
        }
    }

    pub(crate) fn restore(ctx: &EngineContext, args: &Arguments) -> Restored {
        args.expect_only(&["program"], true)?;
        let program: String = args.required("program")?;
        let process_args = args.variadic_values()?;
        Ok(Box::new(Self::new(Arc::clone(ctx.backend()), program, process_args)))
    }
}

impl Effect for RunProcess {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn perform(&self) -> Result<(), ActionError> {
        Ok(self.backend.spawn_process(&self.program, &self.args)?)
    }

    fn config(&self) -> ConfigMap {
        let config = ConfigMap::new().with("program", self.program.as_str());
        if self.args.is_empty() {
            return config;
        }
        let values = self.args.iter().map(|arg| arg.as_str().into()).collect();
        config.with_variadic(Self::VARIADIC, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, context};
    use serde_json::json;
    use std::time::Instant;

    fn args(value: serde_json::Value) -> Arguments {
        let config: ConfigMap = serde_json::from_value(value).unwrap();
        config.arguments().unwrap()
    }

    #[test]
    fn should_send_input_through_backend() {
        let backend = Arc::new(FakeBackend::default());
        SendInput::new(backend.clone(), "{F1}").perform().unwrap();
        assert_eq!(backend.calls(), vec!["send_input:{F1}"]);
    }

    #[test]
    fn should_press_then_release_key() {
        let backend = Arc::new(FakeBackend::default());
        PressKey::new(backend.clone(), "l", Duration::from_millis(1))
            .perform()
            .unwrap();
        assert_eq!(backend.calls(), vec!["key_down:l", "key_up:l"]);
    }

    #[test]
    fn should_default_hold_to_hundred_millis() {
        let backend = Arc::new(FakeBackend::default());
        let effect = PressKey::restore(&context(&backend), &args(json!({"key": "l"}))).unwrap();
        assert_eq!(effect.config(), ConfigMap::new().with("key", "l").with("hold_ms", 100));
    }

    #[test]
    fn should_make_sound_path_absolute_at_construction() {
        let backend = Arc::new(FakeBackend::default());
        let effect = PlaySound::new(backend, "sounds/beep.wav").unwrap();
        let path = effect.config().get("sound_file_path").cloned().unwrap();
        let path = PathBuf::from(path.as_str().unwrap());
        assert!(path.is_absolute());
        assert!(path.ends_with("sounds/beep.wav"));
    }

    #[test]
    fn should_report_window_not_found_when_activating_missing_window() {
        let backend = Arc::new(FakeBackend::default());
        let effect = ActivateWindow::new(backend, WindowCriteria::titled("Nowhere"));
        let result = effect.perform();
        assert!(matches!(
            result,
            Err(ActionError::Backend(vocom_domain::error::BackendError::WindowNotFound { .. }))
        ));
    }

    #[test]
    fn should_activate_matching_window() {
        let backend = Arc::new(FakeBackend::default());
        backend.open_window("Elite Dangerous");
        ActivateWindow::new(backend.clone(), WindowCriteria::titled("Elite"))
            .perform()
            .unwrap();
        assert_eq!(backend.calls(), vec!["activate_window:Elite Dangerous"]);
    }

    #[test]
    fn should_sleep_for_pause_duration() {
        let started = Instant::now();
        Pause::new(0.02).unwrap().perform().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn should_reject_negative_pause() {
        assert!(Pause::new(-1.0).is_err());
        assert!(Pause::new(f64::NAN).is_err());
    }

    #[test]
    fn should_reject_pause_too_long_for_duration() {
        let backend = Arc::new(FakeBackend::default());
        let result = Pause::restore(&context(&backend), &args(json!({"seconds": 1e20})));
        assert!(matches!(
            result,
            Err(VocomError::Argument(ArgumentError::Invalid { .. }))
        ));
        assert!(Pause::new(f64::INFINITY).is_err());
    }

    #[test]
    fn should_pass_variadic_args_to_process() {
        let backend = Arc::new(FakeBackend::default());
        let effect = RunProcess::restore(
            &context(&backend),
            &args(json!({"program": "notepad.exe", "*args": ["a.txt", "b.txt"]})),
        )
        .unwrap();
        effect.perform().unwrap();
        assert_eq!(backend.calls(), vec!["spawn_process:notepad.exe a.txt b.txt"]);
        assert_eq!(effect.config().get("*args"), Some(&json!(["a.txt", "b.txt"])));
    }

    #[test]
    fn should_reject_variadic_for_send_input() {
        let backend = Arc::new(FakeBackend::default());
        let result = SendInput::restore(
            &context(&backend),
            &args(json!({"send_string": "x", "*extra": ["y"]})),
        );
        assert!(matches!(
            result,
            Err(VocomError::Argument(ArgumentError::UnexpectedVariadic { .. }))
        ));
    }

    #[test]
    fn should_report_missing_required_parameter() {
        let backend = Arc::new(FakeBackend::default());
        let result = SendInput::restore(&context(&backend), &args(json!({})));
        assert!(matches!(
            result,
            Err(VocomError::Argument(ArgumentError::Missing { .. }))
        ));
    }

    #[test]
    fn should_wrap_backend_failure_as_action_error() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("send_input");
        let result = SendInput::new(backend, "x").perform();
        assert!(matches!(result, Err(ActionError::Backend(_))));
    }
}

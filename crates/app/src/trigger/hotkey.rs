//! Hotkey and joystick-button triggers, both backed by the backend's hotkey
//! hook.

use std::sync::Arc;

use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::axis::JoystickPart;
use vocom_domain::error::{ArgumentError, VocomError};

use super::{Fire, TriggerSource};
use crate::context::EngineContext;
use crate::ports::AutomationBackend;

/// Fires when a key combination is pressed.
pub struct HotkeySource {
    hotkey: String,
    backend: Arc<dyn AutomationBackend>,
}

impl HotkeySource {
    pub const TYPE: &'static str = "hotkey";

    pub fn new(backend: Arc<dyn AutomationBackend>, hotkey: impl Into<String>) -> Self {
        Self {
            hotkey: hotkey.into(),
            backend,
        }
    }

    #[must_use]
    pub fn hotkey(&self) -> &str {
        &self.hotkey
    }

    pub(crate) fn restore(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn TriggerSource>, VocomError> {
        args.expect_only(&["hotkey"], false)?;
        let hotkey: String = args.required("hotkey")?;
        Ok(Box::new(Self::new(Arc::clone(ctx.backend()), hotkey)))
    }
}

impl TriggerSource for HotkeySource {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new().with("hotkey", self.hotkey.as_str())
    }

    fn install(&mut self, fire: Fire) -> Result<(), VocomError> {
        self.backend.install_hotkey(&self.hotkey, fire)?;
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), VocomError> {
        self.backend.uninstall_hotkey(&self.hotkey)?;
        Ok(())
    }
}

/// Fires when a joystick button is pressed; the backend sees it as the
/// hotkey `"{index}Joy{button}"`, or `"Joy{button}"` for an empty index.
pub struct JoystickButtonSource {
    joystick_index: JoystickPart,
    joystick_button: JoystickPart,
    hotkey: HotkeySource,
}

impl JoystickButtonSource {
    pub const TYPE: &'static str = "joystick_button";

    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when the button is blank.
    pub fn new(
        backend: Arc<dyn AutomationBackend>,
        joystick_index: impl Into<JoystickPart>,
        joystick_button: impl Into<JoystickPart>,
    ) -> Result<Self, ArgumentError> {
        let joystick_index = joystick_index.into();
        let joystick_button = joystick_button.into();
        if joystick_button.is_empty() {
            return Err(ArgumentError::Invalid {
                name: "joystick_button".to_string(),
                expected: "a button number".to_string(),
            });
        }
        let spec = format!("{joystick_index}Joy{joystick_button}");
        Ok(Self {
            joystick_index,
            joystick_button,
            hotkey: HotkeySource::new(backend, spec),
        })
    }

    pub(crate) fn restore(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn TriggerSource>, VocomError> {
        args.expect_only(&["joystick_index", "joystick_button"], false)?;
        Ok(Box::new(Self::new(
            Arc::clone(ctx.backend()),
            args.required::<JoystickPart>("joystick_index")?,
            args.required::<JoystickPart>("joystick_button")?,
        )?))
    }
}

impl TriggerSource for JoystickButtonSource {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new()
            .with("joystick_index", self.joystick_index.clone())
            .with("joystick_button", self.joystick_button.clone())
    }

    fn install(&mut self, fire: Fire) -> Result<(), VocomError> {
        self.hotkey.install(fire)
    }

    fn uninstall(&mut self) -> Result<(), VocomError> {
        self.hotkey.uninstall()
    }
}

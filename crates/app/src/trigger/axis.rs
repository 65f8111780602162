//! Joystick-axis trigger.
//!
//! While installed, a poller thread reads the axis snapshot kept by the
//! shared [`AxisSampler`] every `1 / polling_frequency` seconds and feeds it
//! to an [`EdgeDetector`]; the rule only runs on a qualifying transition.

use std::sync::{Arc, Mutex};

use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::axis::{AxisKey, AxisMode, AxisName, EdgeDetector, TriggerValue};
use vocom_domain::error::{ArgumentError, VocomError};

use super::{Fire, TriggerSource};
use crate::axis_sampler::AxisSampler;
use crate::context::EngineContext;
use crate::sync::lock;
use crate::ticker::{Ticker, period_of};

/// Polling frequency used when none is configured, in Hz.
pub const DEFAULT_POLLING_FREQUENCY: u32 = 30;

/// Reads the sampler snapshot and runs the edge detector.
pub struct AxisPoller {
    key: AxisKey,
    sampler: Arc<AxisSampler>,
    detector: Mutex<EdgeDetector>,
}

impl AxisPoller {
    #[must_use]
    pub fn new(key: AxisKey, mode: AxisMode, sampler: Arc<AxisSampler>) -> Self {
        Self {
            key,
            sampler,
            detector: Mutex::new(EdgeDetector::new(mode)),
        }
    }

    /// Take one sample. Returns `true` when the trigger should fire.
    /// Nothing happens while the sampler has no value for the axis.
    pub fn poll(&self) -> bool {
        let Some(value) = self.sampler.latest(self.key) else {
            return false;
        };
        lock(&self.detector).observe(value)
    }

    #[must_use]
    pub fn awaiting_reset(&self) -> bool {
        lock(&self.detector).awaiting_reset()
    }
}

/// Fires when an axis enters the configured region.
pub struct AxisSource {
    key: AxisKey,
    mode: AxisMode,
    polling_frequency: u32,
    sampler: Arc<AxisSampler>,
    ticker: Option<Ticker>,
}

impl AxisSource {
    pub const TYPE: &'static str = "joystick_axis";

    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when `polling_frequency` is zero.
    pub fn new(
        sampler: Arc<AxisSampler>,
        key: AxisKey,
        mode: AxisMode,
        polling_frequency: u32,
    ) -> Result<Self, ArgumentError> {
        if polling_frequency == 0 {
            return Err(ArgumentError::Invalid {
                name: "polling_frequency".to_string(),
                expected: "a positive number of polls per second".to_string(),
            });
        }
        Ok(Self {
            key,
            mode,
            polling_frequency,
            sampler,
            ticker: None,
        })
    }

    #[must_use]
    pub fn key(&self) -> AxisKey {
        self.key
    }

    #[must_use]
    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    pub(crate) fn restore(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn TriggerSource>, VocomError> {
        args.expect_only(
            &[
                "joystick_index",
                "axis_name",
                "trigger_mode",
                "trigger_value",
                "polling_frequency",
            ],
            false,
        )?;
        let key = AxisKey {
            joystick: args.required("joystick_index")?,
            axis: args.required::<AxisName>("axis_name")?,
        };
        let mode = AxisMode::from_parts(
            args.required("trigger_mode")?,
            args.required::<TriggerValue>("trigger_value")?,
        )?;
        let polling_frequency = args
            .optional("polling_frequency")?
            .unwrap_or(DEFAULT_POLLING_FREQUENCY);
        Ok(Box::new(Self::new(
            Arc::clone(ctx.axis_sampler()),
            key,
            mode,
            polling_frequency,
        )?))
    }
}

impl TriggerSource for AxisSource {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn config(&self) -> ConfigMap {
        let trigger_value: serde_json::Value = match self.mode.trigger_value() {
            TriggerValue::Single(value) => value.into(),
            TriggerValue::Range([low, high]) => vec![low, high].into(),
        };
        ConfigMap::new()
            .with("joystick_index", self.key.joystick)
            .with("axis_name", self.key.axis.to_string())
            .with("trigger_mode", self.mode.code())
            .with("trigger_value", trigger_value)
            .with("polling_frequency", self.polling_frequency)
    }

    fn install(&mut self, fire: Fire) -> Result<(), VocomError> {
        self.sampler.track(self.key)?;
        let poller = AxisPoller::new(self.key, self.mode, Arc::clone(&self.sampler));
        let spawned = Ticker::spawn(
            format!("vocom-axis-{}", self.key),
            period_of(self.polling_frequency),
            move || {
                if poller.poll() {
                    fire();
                }
            },
        );
        match spawned {
            Ok(ticker) => {
                self.ticker = Some(ticker);
                Ok(())
            }
            Err(err) => {
                self.sampler.untrack(self.key);
                Err(err.into())
            }
        }
    }

    fn uninstall(&mut self) -> Result<(), VocomError> {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.sampler.untrack(self.key);
        Ok(())
    }
}

//! Joystick axes and the debounced edge detector.
//!
//! An [`EdgeDetector`] turns a stream of sampled axis values into discrete
//! firings. Each [`AxisMode`] defines a *firing region*; the detector fires
//! once when the value enters the region while armed, then stays latched
//! (`awaiting_reset`) until the value leaves the region again. The same rule
//! applies to every mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;

/// A joystick axis as named by the automation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisName {
    X,
    Y,
    Z,
    R,
    U,
    V,
    #[serde(rename = "POV")]
    Pov,
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::R => "R",
            Self::U => "U",
            Self::V => "V",
            Self::Pov => "POV",
        };
        f.write_str(name)
    }
}

impl FromStr for AxisName {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Z" => Ok(Self::Z),
            "R" => Ok(Self::R),
            "U" => Ok(Self::U),
            "V" => Ok(Self::V),
            "POV" => Ok(Self::Pov),
            _ => Err(invalid("axis_name", "one of X, Y, Z, R, U, V, POV")),
        }
    }
}

/// Identifies one axis of one joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisKey {
    pub joystick: u8,
    pub axis: AxisName,
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Joy{}", self.joystick, self.axis)
    }
}

/// A joystick index or button number as written in documents, either a
/// number or a string. An empty index addresses the default joystick, so
/// button 3 becomes the hotkey `Joy3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoystickPart {
    Number(u32),
    Text(String),
}

impl JoystickPart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for JoystickPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => number.fmt(f),
            Self::Text(text) => f.write_str(text.trim()),
        }
    }
}

impl From<u32> for JoystickPart {
    fn from(number: u32) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for JoystickPart {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<JoystickPart> for serde_json::Value {
    fn from(part: JoystickPart) -> Self {
        match part {
            JoystickPart::Number(number) => number.into(),
            JoystickPart::Text(text) => text.into(),
        }
    }
}

/// The `trigger_value` parameter: one threshold or a `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerValue {
    Single(f64),
    Range([f64; 2]),
}

/// Comparison applied to each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisMode {
    /// Region is the open interval `(low, high)`.
    Between { low: f64, high: f64 },
    /// Region is `value > threshold`.
    Above(f64),
    /// Region is `value < threshold`.
    Below(f64),
    /// Region is `value == target`.
    Equals(f64),
}

impl AxisMode {
    pub const BETWEEN: u8 = 1;
    pub const ABOVE: u8 = 2;
    pub const BELOW: u8 = 3;
    pub const EQUALS: u8 = 4;

    /// Build a mode from its wire code and value.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] for an unknown code, a value of the wrong
    /// shape for the code, or a range whose bounds are out of order.
    pub fn from_parts(code: u8, value: TriggerValue) -> Result<Self, ArgumentError> {
        let mode = match (code, value) {
            (Self::BETWEEN, TriggerValue::Range([low, high])) if low < high => {
                Self::Between { low, high }
            }
            (Self::BETWEEN, _) => {
                return Err(invalid("trigger_value", "an ascending [low, high] pair"));
            }
            (Self::ABOVE, TriggerValue::Single(threshold)) => Self::Above(threshold),
            (Self::BELOW, TriggerValue::Single(threshold)) => Self::Below(threshold),
            (Self::EQUALS, TriggerValue::Single(target)) => Self::Equals(target),
            (Self::ABOVE | Self::BELOW | Self::EQUALS, TriggerValue::Range(_)) => {
                return Err(invalid("trigger_value", "a single number"));
            }
            _ => return Err(invalid("trigger_mode", "one of 1, 2, 3 or 4")),
        };
        Ok(mode)
    }

    /// Wire code of this mode.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Between { .. } => Self::BETWEEN,
            Self::Above(_) => Self::ABOVE,
            Self::Below(_) => Self::BELOW,
            Self::Equals(_) => Self::EQUALS,
        }
    }

    /// Wire value of this mode.
    #[must_use]
    pub fn trigger_value(&self) -> TriggerValue {
        match *self {
            Self::Between { low, high } => TriggerValue::Range([low, high]),
            Self::Above(v) | Self::Below(v) | Self::Equals(v) => TriggerValue::Single(v),
        }
    }

    /// Whether `value` lies inside this mode's firing region.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Self::Between { low, high } => low < value && value < high,
            Self::Above(threshold) => value > threshold,
            Self::Below(threshold) => value < threshold,
            Self::Equals(target) => value == target,
        }
    }
}

fn invalid(name: &str, expected: &str) -> ArgumentError {
    ArgumentError::Invalid {
        name: name.to_string(),
        expected: expected.to_string(),
    }
}

/// Hysteresis state machine for one axis.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    mode: AxisMode,
    awaiting_reset: bool,
    last_value: Option<f64>,
}

impl EdgeDetector {
    #[must_use]
    pub fn new(mode: AxisMode) -> Self {
        Self {
            mode,
            awaiting_reset: false,
            last_value: None,
        }
    }

    /// Feed one sample. Returns `true` exactly on a qualifying transition.
    ///
    /// The first sample only establishes the baseline: a value already in
    /// the region latches the detector without firing.
    pub fn observe(&mut self, value: f64) -> bool {
        let inside = self.mode.contains(value);
        let primed = self.last_value.replace(value).is_some();

        if !inside {
            self.awaiting_reset = false;
            return false;
        }
        if self.awaiting_reset {
            return false;
        }
        self.awaiting_reset = true;
        primed
    }

    #[must_use]
    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    #[must_use]
    pub fn awaiting_reset(&self) -> bool {
        self.awaiting_reset
    }

    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }
}

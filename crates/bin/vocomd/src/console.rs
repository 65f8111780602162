//! Line-oriented console that drives the virtual adapter from stdin.
//!
//! ```text
//! say <utterance>              speak into the scripted microphone
//! press <hotkey>               press a hotkey (e.g. `^!a`, `1Joy3`)
//! axis <joystick> <axis> <v>   set an axis value in percent
//! window <title>               open and focus a window
//! ```
//!
//! Any other non-empty line is spoken as-is.

use std::io::BufRead;

use vocom_adapter_virtual::{Speaker, VirtualBackend, VirtualWindow};
use vocom_domain::axis::{AxisKey, AxisName};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Say(String),
    Press(String),
    Axis(AxisKey, f64),
    Window(String),
}

impl Command {
    /// Parse one console line. Returns `None` for blank lines and
    /// malformed `axis` commands.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match verb {
            "say" if !rest.is_empty() => Some(Self::Say(rest.to_string())),
            "press" if !rest.is_empty() => Some(Self::Press(rest.to_string())),
            "window" if !rest.is_empty() => Some(Self::Window(rest.to_string())),
            "axis" => {
                let mut parts = rest.split_whitespace();
                let joystick = parts.next()?.parse().ok()?;
                let axis = parts.next()?.parse::<AxisName>().ok()?;
                let value = parts.next()?.parse().ok()?;
                Some(Self::Axis(AxisKey { joystick, axis }, value))
            }
            _ => Some(Self::Say(line.to_string())),
        }
    }

    pub fn apply(self, backend: &VirtualBackend, speaker: &Speaker) {
        match self {
            Self::Say(text) => speaker.say(text),
            Self::Press(spec) => {
                if !backend.press(&spec) {
                    tracing::warn!(%spec, "no hook installed for hotkey");
                }
            }
            Self::Axis(key, value) => backend.set_axis(key, value),
            Self::Window(title) => backend.open_window(VirtualWindow::new(title)),
        }
    }
}

/// Read commands until `input` is exhausted.
pub fn run(input: impl BufRead, backend: &VirtualBackend, speaker: &Speaker) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "console input failed");
                break;
            }
        };
        match Command::parse(&line) {
            Some(command) => command.apply(backend, speaker),
            None if !line.trim().is_empty() => tracing::warn!(%line, "unrecognised command"),
            None => {}
        }
    }
    tracing::debug!("console input closed");
}

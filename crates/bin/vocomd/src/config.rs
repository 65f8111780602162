//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `vocomd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use vocom_app::axis_sampler::DEFAULT_SAMPLER_FREQUENCY;
use vocom_app::dispatcher::DispatcherConfig;
use vocom_domain::phrase::DEFAULT_MATCH_THRESHOLD;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile to activate on start-up.
    pub profile: ProfileConfig,
    /// Voice listener settings.
    pub dispatcher: DispatcherSection,
    /// Joystick sampling settings.
    pub axis: AxisConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Which profile document to load.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// JSON or YAML profile document. Takes precedence over `name`.
    pub path: Option<PathBuf>,
    /// Profile loaded from `directory` as `<name>.vcp.json` or
    /// `<name>.vcp.yaml`. An empty profile is used when neither this nor
    /// `path` is set.
    pub name: Option<String>,
    /// Directory searched for named profiles.
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatcherSection {
    /// Number of listener threads.
    pub workers: usize,
    /// Longest a single capture may block, in milliseconds.
    pub capture_timeout_ms: u64,
    /// Minimum fuzzy-match score (0–100).
    pub match_threshold: u8,
    /// Sleep between checks while listening is paused, in milliseconds.
    pub idle_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Refresh rate of the shared axis sampler, in Hz.
    pub sampler_frequency: u32,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `vocomd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("vocomd.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply `VOCOM_*` overrides looked up through `var`. Unparsable
    /// numbers are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("VOCOM_PROFILE") {
            self.profile.path = Some(PathBuf::from(val));
        }
        if let Some(val) = var("VOCOM_PROFILE_NAME") {
            self.profile.name = Some(val);
        }
        if let Some(val) = var("VOCOM_PROFILE_DIR") {
            self.profile.directory = PathBuf::from(val);
        }
        if let Some(workers) = var("VOCOM_WORKERS").and_then(|val| val.parse().ok()) {
            self.dispatcher.workers = workers;
        }
        if let Some(ms) = var("VOCOM_CAPTURE_TIMEOUT_MS").and_then(|val| val.parse().ok()) {
            self.dispatcher.capture_timeout_ms = ms;
        }
        if let Some(threshold) = var("VOCOM_MATCH_THRESHOLD").and_then(|val| val.parse().ok()) {
            self.dispatcher.match_threshold = threshold;
        }
        if let Some(ms) = var("VOCOM_IDLE_INTERVAL_MS").and_then(|val| val.parse().ok()) {
            self.dispatcher.idle_interval_ms = ms;
        }
        if let Some(hz) = var("VOCOM_SAMPLER_FREQUENCY").and_then(|val| val.parse().ok()) {
            self.axis.sampler_frequency = hz;
        }
        if let Some(val) = var("VOCOM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatcher.workers == 0 {
            return Err(ConfigError::Validation(
                "dispatcher.workers must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.match_threshold > 100 {
            return Err(ConfigError::Validation(
                "dispatcher.match_threshold must be between 0 and 100".to_string(),
            ));
        }
        if self.dispatcher.capture_timeout_ms == 0 || self.dispatcher.idle_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "dispatcher intervals must be non-zero".to_string(),
            ));
        }
        if self.axis.sampler_frequency == 0 {
            return Err(ConfigError::Validation(
                "axis.sampler_frequency must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Dispatcher settings in the engine's own terms.
    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            workers: self.dispatcher.workers,
            capture_timeout: Duration::from_millis(self.dispatcher.capture_timeout_ms),
            match_threshold: self.dispatcher.match_threshold,
            idle_interval: Duration::from_millis(self.dispatcher.idle_interval_ms),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: None,
            name: None,
            directory: PathBuf::from("profiles"),
        }
    }
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self {
            workers: 3,
            capture_timeout_ms: 5_000,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            idle_interval_ms: 1_000,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            sampler_frequency: DEFAULT_SAMPLER_FREQUENCY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "vocomd=info,vocom_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

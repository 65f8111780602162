//! Shared joystick listener.
//!
//! One background thread refreshes the latest value of every tracked axis
//! from the backend. Axis triggers read this snapshot instead of calling
//! the backend themselves, so many triggers watching the same axis cost a
//! single read per sampling period.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use vocom_domain::axis::AxisKey;
use vocom_domain::error::VocomError;

use crate::ports::AutomationBackend;
use crate::sync::lock;
use crate::ticker::{Ticker, period_of};

/// Sampling frequency used when none is configured, in Hz.
pub const DEFAULT_SAMPLER_FREQUENCY: u32 = 20;

#[derive(Debug, Default)]
struct Tracked {
    refs: usize,
    value: Option<f64>,
}

struct Shared {
    backend: Arc<dyn AutomationBackend>,
    axes: Mutex<HashMap<AxisKey, Tracked>>,
}

pub struct AxisSampler {
    shared: Arc<Shared>,
    frequency: u32,
    ticker: Mutex<Option<Ticker>>,
}

impl AxisSampler {
    pub fn new(backend: Arc<dyn AutomationBackend>, frequency: u32) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                axes: Mutex::new(HashMap::new()),
            }),
            frequency: frequency.max(1),
            ticker: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Start sampling `key`, starting the background thread if needed.
    /// Tracking is reference counted: each `track` needs one `untrack`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sampling thread cannot be spawned; the
    /// reference taken on `key` is released again.
    pub fn track(&self, key: AxisKey) -> Result<(), VocomError> {
        lock(&self.shared.axes).entry(key).or_default().refs += 1;
        self.shared.refresh_one(key);
        if let Err(err) = self.start() {
            self.untrack(key);
            return Err(err);
        }
        Ok(())
    }

    /// Release one reference on `key`; the axis is dropped from the
    /// snapshot when nobody tracks it any more.
    pub fn untrack(&self, key: AxisKey) {
        let mut axes = lock(&self.shared.axes);
        if let Some(tracked) = axes.get_mut(&key) {
            tracked.refs = tracked.refs.saturating_sub(1);
            if tracked.refs == 0 {
                axes.remove(&key);
            }
        }
    }

    /// Latest sampled value, if the axis is tracked and has been read.
    #[must_use]
    pub fn latest(&self, key: AxisKey) -> Option<f64> {
        lock(&self.shared.axes).get(&key).and_then(|t| t.value)
    }

    #[must_use]
    pub fn tracked_axes(&self) -> Vec<AxisKey> {
        lock(&self.shared.axes).keys().copied().collect()
    }

    /// Read every tracked axis once.
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    /// Start the sampling thread. Calling it while running does nothing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn start(&self) -> Result<(), VocomError> {
        let mut ticker = lock(&self.ticker);
        if ticker.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        *ticker = Some(Ticker::spawn(
            "vocom-axis-sampler".to_string(),
            period_of(self.frequency),
            move || shared.refresh(),
        )?);
        tracing::info!(frequency = self.frequency, "axis sampler started");
        Ok(())
    }

    /// Stop the sampling thread. Tracked axes and their last values are
    /// kept. Calling it while stopped does nothing.
    pub fn stop(&self) {
        let ticker = lock(&self.ticker).take();
        if let Some(ticker) = ticker {
            ticker.stop();
            tracing::info!("axis sampler stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.ticker).is_some()
    }
}

impl Drop for AxisSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn refresh(&self) {
        let keys: Vec<AxisKey> = lock(&self.axes).keys().copied().collect();
        for key in keys {
            self.refresh_one(key);
        }
    }

    fn refresh_one(&self, key: AxisKey) {
        match self.backend.read_axis(key) {
            Ok(value) => {
                if let Some(tracked) = lock(&self.axes).get_mut(&key) {
                    tracked.value = Some(value);
                }
            }
            Err(err) => tracing::warn!(axis = %key, error = %err, "axis read failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use std::thread;
    use std::time::{Duration, Instant};
    use vocom_domain::axis::AxisName;

    const STICK_X: AxisKey = AxisKey {
        joystick: 1,
        axis: AxisName::X,
    };

    #[test]
    fn should_read_value_immediately_when_tracked() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_axis(STICK_X, 42.0);
        let sampler = AxisSampler::new(backend, 20);

        sampler.track(STICK_X).unwrap();
        assert_eq!(sampler.latest(STICK_X), Some(42.0));
        assert!(sampler.is_running());
        sampler.stop();
    }

    #[test]
    fn should_refresh_values_in_background() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_axis(STICK_X, 0.0);
        let sampler = AxisSampler::new(Arc::clone(&backend) as Arc<dyn AutomationBackend>, 200);
        sampler.track(STICK_X).unwrap();

        backend.set_axis(STICK_X, 75.0);
        let deadline = Instant::now() + Duration::from_secs(5);
        while sampler.latest(STICK_X) != Some(75.0) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        sampler.stop();
        assert_eq!(sampler.latest(STICK_X), Some(75.0));
    }

    #[test]
    fn should_release_reference_when_sampler_cannot_start() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_axis(STICK_X, 42.0);
        let sampler = AxisSampler::new(backend, 20);

        crate::ticker::refuse_spawns(true);
        let result = sampler.track(STICK_X);
        crate::ticker::refuse_spawns(false);

        assert!(matches!(result, Err(VocomError::Io(_))));
        assert!(sampler.tracked_axes().is_empty());
        assert!(!sampler.is_running());
    }

    #[test]
    fn should_keep_last_value_when_read_fails() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_axis(STICK_X, 10.0);
        let sampler = AxisSampler::new(Arc::clone(&backend) as Arc<dyn AutomationBackend>, 20);
        sampler.track(STICK_X).unwrap();
        sampler.stop();

        backend.clear_axis(STICK_X);
        sampler.refresh();
        assert_eq!(sampler.latest(STICK_X), Some(10.0));
    }

    #[test]
    fn should_drop_axis_after_last_untrack() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_axis(STICK_X, 1.0);
        let sampler = AxisSampler::new(backend, 20);
        sampler.track(STICK_X).unwrap();
        sampler.track(STICK_X).unwrap();

        sampler.untrack(STICK_X);
        assert_eq!(sampler.tracked_axes(), vec![STICK_X]);
        sampler.untrack(STICK_X);
        assert!(sampler.tracked_axes().is_empty());
        assert_eq!(sampler.latest(STICK_X), None);
        sampler.stop();
    }

    #[test]
    fn should_ignore_repeated_start_and_stop() {
        let sampler = AxisSampler::new(Arc::new(FakeBackend::default()), 20);
        sampler.start().unwrap();
        sampler.start().unwrap();
        assert!(sampler.is_running());
        sampler.stop();
        sampler.stop();
        assert!(!sampler.is_running());
    }
}

//! Audio capture port.

use std::time::Duration;

use vocom_domain::error::CaptureError;

/// One captured utterance, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub data: Vec<u8>,
}

impl AudioClip {
    #[must_use]
    pub fn new(sample_rate: u32, data: Vec<u8>) -> Self {
        Self { sample_rate, data }
    }
}

/// A microphone-like source. Only one caller may capture at a time, which
/// is why capture takes `&mut self`; the dispatcher serialises access.
pub trait CaptureDevice: Send {
    /// Block until one utterance has been recorded or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Timeout`] when nothing was heard in time,
    /// [`CaptureError::Device`] on hardware failure.
    fn capture(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError>;
}

//! Speech-to-text port.

use vocom_domain::error::TranscriptionError;

use super::capture::AudioClip;

/// Turns captured audio into text. Called concurrently by every dispatcher
/// worker.
pub trait SpeechToText: Send + Sync {
    /// # Errors
    ///
    /// [`TranscriptionError::UnknownSpeech`] when nothing intelligible was
    /// said, [`TranscriptionError::ServiceUnavailable`] when the service
    /// cannot be reached.
    fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscriptionError>;
}

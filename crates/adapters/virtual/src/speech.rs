//! Scripted microphone and transcriber.
//!
//! Text handed to a [`Speaker`] comes out of the [`ScriptedMicrophone`] as a
//! clip holding the UTF-8 bytes, which [`ScriptedTranscriber`] decodes back.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use vocom_app::ports::{AudioClip, CaptureDevice, SpeechToText};
use vocom_domain::error::{CaptureError, TranscriptionError};

use crate::sync::lock;

/// Sample rate stamped on every scripted clip.
pub const SCRIPTED_SAMPLE_RATE: u32 = 16_000;

/// Handle used to "say" something into a [`ScriptedMicrophone`].
#[derive(Clone)]
pub struct Speaker {
    sender: Sender<String>,
}

impl Speaker {
    /// Queue one utterance.
    pub fn say(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(%text, "scripted utterance queued");
        // The microphone keeps its own sender alive, so this cannot fail.
        let _ = self.sender.send(text);
    }
}

/// Captures whatever was queued through its [`Speaker`]s.
pub struct ScriptedMicrophone {
    sender: Sender<String>,
    utterances: Receiver<String>,
}

impl Default for ScriptedMicrophone {
    fn default() -> Self {
        let (sender, utterances) = crossbeam_channel::unbounded();
        Self { sender, utterances }
    }
}

impl ScriptedMicrophone {
    #[must_use]
    pub fn speaker(&self) -> Speaker {
        Speaker {
            sender: self.sender.clone(),
        }
    }
}

impl CaptureDevice for ScriptedMicrophone {
    fn capture(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError> {
        match self.utterances.recv_timeout(timeout) {
            Ok(text) => Ok(AudioClip::new(SCRIPTED_SAMPLE_RATE, text.into_bytes())),
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Device {
                message: "scripted microphone disconnected".to_string(),
            }),
        }
    }
}

/// Decodes scripted clips. Failures queued with
/// [`fail_next`](Self::fail_next) are returned first, one per call.
#[derive(Default)]
pub struct ScriptedTranscriber {
    failures: Mutex<VecDeque<TranscriptionError>>,
}

impl ScriptedTranscriber {
    pub fn fail_next(&self, error: TranscriptionError) {
        lock(&self.failures).push_back(error);
    }
}

impl SpeechToText for ScriptedTranscriber {
    fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscriptionError> {
        let queued = lock(&self.failures).pop_front();
        if let Some(error) = queued {
            return Err(error);
        }
        let text = std::str::from_utf8(&clip.data).map_err(|_| TranscriptionError::UnknownSpeech)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::UnknownSpeech);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_capture_what_the_speaker_said() {
        let mut microphone = ScriptedMicrophone::default();
        microphone.speaker().say("deploy landing gear");

        let clip = microphone.capture(Duration::from_millis(10)).unwrap();

        assert_eq!(clip.sample_rate, SCRIPTED_SAMPLE_RATE);
        assert_eq!(clip.data, b"deploy landing gear");
    }

    #[test]
    fn should_time_out_when_nothing_was_said() {
        let mut microphone = ScriptedMicrophone::default();
        let timeout = Duration::from_millis(5);
        assert_eq!(
            microphone.capture(timeout),
            Err(CaptureError::Timeout(timeout))
        );
    }

    #[test]
    fn should_decode_clip_text() {
        let transcriber = ScriptedTranscriber::default();
        let clip = AudioClip::new(SCRIPTED_SAMPLE_RATE, b" boost ".to_vec());
        assert_eq!(transcriber.transcribe(&clip).unwrap(), "boost");
    }

    #[test]
    fn should_reject_blank_or_invalid_audio() {
        let transcriber = ScriptedTranscriber::default();
        let blank = AudioClip::new(SCRIPTED_SAMPLE_RATE, b"   ".to_vec());
        let garbage = AudioClip::new(SCRIPTED_SAMPLE_RATE, vec![0xff, 0xfe]);
        assert_eq!(transcriber.transcribe(&blank), Err(TranscriptionError::UnknownSpeech));
        assert_eq!(transcriber.transcribe(&garbage), Err(TranscriptionError::UnknownSpeech));
    }

    #[test]
    fn should_return_queued_failures_first() {
        let transcriber = ScriptedTranscriber::default();
        transcriber.fail_next(TranscriptionError::ServiceUnavailable {
            message: "offline".to_string(),
        });
        let clip = AudioClip::new(SCRIPTED_SAMPLE_RATE, b"boost".to_vec());

        assert!(matches!(
            transcriber.transcribe(&clip),
            Err(TranscriptionError::ServiceUnavailable { .. })
        ));
        assert_eq!(transcriber.transcribe(&clip).unwrap(), "boost");
    }
}

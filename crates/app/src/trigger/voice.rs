//! Voice trigger.
//!
//! The trigger registers its phrases with the shared [`PhraseDispatcher`]
//! as soon as it is built and receives matching transcripts on its own
//! channel. While installed, a consumer thread waits on that channel and on
//! a cancellation channel; uninstalling drops the cancellation sender, the
//! consumer fires for anything already delivered and exits.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, select};
use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::error::{ArgumentError, VocomError};

use super::{Fire, TriggerSource};
use crate::context::EngineContext;
use crate::dispatcher::PhraseDispatcher;

struct Consumer {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Fires when a spoken utterance matches one of its phrases.
pub struct VoiceSource {
    phrases: Vec<String>,
    dispatcher: Arc<PhraseDispatcher>,
    matches: Receiver<String>,
    consumer: Option<Consumer>,
}

impl VoiceSource {
    pub const TYPE: &'static str = "voice";
    pub const VARIADIC: &'static str = "trigger_phrases";

    /// Register `phrases` with the dispatcher.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Missing`] for an empty phrase list, or a
    /// [`PhraseError`](vocom_domain::error::PhraseError) when a phrase is
    /// blank or already taken.
    pub fn new(dispatcher: Arc<PhraseDispatcher>, phrases: Vec<String>) -> Result<Self, VocomError> {
        if phrases.is_empty() {
            return Err(ArgumentError::Missing {
                name: Self::VARIADIC.to_string(),
            }
            .into());
        }
        let matches = dispatcher.add_trigger_phrases(&phrases)?;
        Ok(Self {
            phrases,
            dispatcher,
            matches,
            consumer: None,
        })
    }

    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub(crate) fn restore(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn TriggerSource>, VocomError> {
        args.expect_only(&[], true)?;
        let phrases = args.variadic_values()?;
        Ok(Box::new(Self::new(Arc::clone(ctx.dispatcher()), phrases)?))
    }

    fn stop_consumer(&mut self) {
        let Some(consumer) = self.consumer.take() else {
            return;
        };
        drop(consumer.cancel);
        if consumer.handle.join().is_err() {
            tracing::error!("voice consumer panicked");
        }
    }
}

impl TriggerSource for VoiceSource {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn config(&self) -> ConfigMap {
        let values = self.phrases.iter().map(|p| p.as_str().into()).collect();
        ConfigMap::new().with_variadic(Self::VARIADIC, values)
    }

    fn install(&mut self, fire: Fire) -> Result<(), VocomError> {
        let stale = self.matches.try_iter().count();
        if stale > 0 {
            tracing::debug!(stale, "discarded transcripts received before install");
        }

        let (cancel, cancelled) = crossbeam_channel::bounded::<()>(0);
        let matches = self.matches.clone();
        let handle = thread::Builder::new()
            .name("vocom-voice-trigger".to_string())
            .spawn(move || consume(&matches, &cancelled, &fire))?;
        self.consumer = Some(Consumer { cancel, handle });

        if let Err(err) = self.dispatcher.start() {
            self.stop_consumer();
            return Err(err);
        }
        self.dispatcher.start_listening();
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), VocomError> {
        self.stop_consumer();
        Ok(())
    }
}

impl Drop for VoiceSource {
    fn drop(&mut self) {
        self.stop_consumer();
        if let Err(err) = self.dispatcher.remove_trigger_phrases(&self.phrases) {
            tracing::warn!(error = %err, "failed to release trigger phrases");
        }
    }
}

fn consume(matches: &Receiver<String>, cancelled: &Receiver<()>, fire: &Fire) {
    loop {
        select! {
            recv(matches) -> transcript => match transcript {
                Ok(transcript) => {
                    tracing::debug!(%transcript, "voice trigger matched");
                    fire();
                }
                Err(_) => break,
            },
            recv(cancelled) -> _ => {
                for transcript in matches.try_iter() {
                    tracing::debug!(%transcript, "voice trigger matched while stopping");
                    fire();
                }
                break;
            }
        }
    }
}

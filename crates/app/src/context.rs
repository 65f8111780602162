//! Engine context — the shared services every factory may depend on.

use std::sync::Arc;

use crate::axis_sampler::AxisSampler;
use crate::dispatcher::PhraseDispatcher;
use crate::ports::AutomationBackend;
use crate::rules::{FailureHandler, LogFailures};

/// Handles to the process-wide collaborators, passed to every registry
/// factory. Cloning is cheap; all clones share the same services.
#[derive(Clone)]
pub struct EngineContext {
    backend: Arc<dyn AutomationBackend>,
    dispatcher: Arc<PhraseDispatcher>,
    axis_sampler: Arc<AxisSampler>,
    failure_handler: Arc<dyn FailureHandler>,
}

impl EngineContext {
    /// Build a context reporting action failures through [`LogFailures`].
    pub fn new(
        backend: Arc<dyn AutomationBackend>,
        dispatcher: Arc<PhraseDispatcher>,
        axis_sampler: Arc<AxisSampler>,
    ) -> Self {
        Self {
            backend,
            dispatcher,
            axis_sampler,
            failure_handler: Arc::new(LogFailures),
        }
    }

    /// Replace the handler told about failed actions.
    #[must_use]
    pub fn with_failure_handler(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.failure_handler = handler;
        self
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn AutomationBackend> {
        &self.backend
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<PhraseDispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn axis_sampler(&self) -> &Arc<AxisSampler> {
        &self.axis_sampler
    }

    #[must_use]
    pub fn failure_handler(&self) -> &Arc<dyn FailureHandler> {
        &self.failure_handler
    }

    /// Stop the shared voice listener and joystick sampler.
    pub fn stop_listeners(&self) {
        self.dispatcher.stop();
        self.axis_sampler.stop();
    }
}

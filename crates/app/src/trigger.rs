//! Triggers — event sources wired to a [`Rule`].
//!
//! A [`Trigger`] pairs a [`TriggerSource`] (what to watch) with a shared
//! [`Rule`] (what to do). Installing the hook hands the source a [`Fire`]
//! callback; the source invokes it on its own thread whenever the event
//! occurs.

pub mod axis;
pub mod hotkey;
pub mod voice;

use std::sync::Arc;

use vocom_domain::arguments::ConfigMap;
use vocom_domain::document::TriggerDocument;
use vocom_domain::error::{LifecycleError, VocomError};
use vocom_domain::id::TriggerId;
use vocom_domain::time::Timestamp;

use crate::action::Action;
use crate::condition::Condition;
use crate::rules::{FailureHandler, LogFailures, Outcome, Rule};

/// Callback a source invokes when its event occurs.
pub type Fire = Arc<dyn Fn() + Send + Sync>;

/// The event-detection half of a trigger.
pub trait TriggerSource: Send {
    /// Identifier this source is registered under.
    fn type_name(&self) -> &'static str;

    /// Parameters that rebuild this source through its factory.
    fn config(&self) -> ConfigMap;

    /// Start watching. Called at most once before each `uninstall`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook cannot be put in place.
    fn install(&mut self, fire: Fire) -> Result<(), VocomError>;

    /// Stop watching and release every resource taken by `install`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook cannot be removed.
    fn uninstall(&mut self) -> Result<(), VocomError>;
}

pub struct Trigger {
    id: TriggerId,
    source: Box<dyn TriggerSource>,
    rule: Arc<Rule>,
    installed: bool,
}

impl Trigger {
    /// A trigger whose failed actions are logged.
    #[must_use]
    pub fn new(source: Box<dyn TriggerSource>) -> Self {
        Self::with_failure_handler(source, Arc::new(LogFailures))
    }

    #[must_use]
    pub fn with_failure_handler(
        source: Box<dyn TriggerSource>,
        failures: Arc<dyn FailureHandler>,
    ) -> Self {
        let id = TriggerId::new();
        Self {
            id,
            source,
            rule: Arc::new(Rule::new(id, failures)),
            installed: false,
        }
    }

    #[must_use]
    pub fn with_action(self, action: Action) -> Self {
        self.rule.add_action(action);
        self
    }

    #[must_use]
    pub fn with_condition(self, condition: Box<dyn Condition>) -> Self {
        self.rule.add_condition(condition);
        self
    }

    /// Append an action; takes effect on the next firing even when
    /// installed.
    pub fn add_action(&self, action: Action) {
        self.rule.add_action(action);
    }

    pub fn add_condition(&self, condition: Box<dyn Condition>) {
        self.rule.add_condition(condition);
    }

    #[must_use]
    pub fn id(&self) -> TriggerId {
        self.id
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.source.type_name()
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    #[must_use]
    pub fn last_fired(&self) -> Option<Timestamp> {
        self.rule.last_fired()
    }

    #[must_use]
    pub fn rule(&self) -> &Arc<Rule> {
        &self.rule
    }

    /// Run the rule as if the event had just occurred.
    pub fn on_trigger(&self) -> Outcome {
        self.rule.on_trigger()
    }

    /// # Errors
    ///
    /// [`LifecycleError::AlreadyInstalled`] on a second install, or the
    /// source's own error.
    #[tracing::instrument(skip(self), fields(trigger = %self.id, kind = self.type_name()))]
    pub fn install_hook(&mut self) -> Result<(), VocomError> {
        if self.installed {
            return Err(LifecycleError::AlreadyInstalled {
                trigger: self.id.to_string(),
            }
            .into());
        }
        let rule = Arc::clone(&self.rule);
        self.source.install(Arc::new(move || {
            rule.on_trigger();
        }))?;
        self.installed = true;
        tracing::debug!("hook installed");
        Ok(())
    }

    /// # Errors
    ///
    /// [`LifecycleError::NotInstalled`] when not installed, or the source's
    /// own error.
    #[tracing::instrument(skip(self), fields(trigger = %self.id, kind = self.type_name()))]
    pub fn uninstall_hook(&mut self) -> Result<(), VocomError> {
        if !self.installed {
            return Err(LifecycleError::NotInstalled {
                trigger: self.id.to_string(),
            }
            .into());
        }
        self.installed = false;
        self.source.uninstall()?;
        tracing::debug!("hook uninstalled");
        Ok(())
    }

    #[must_use]
    pub fn to_document(&self) -> TriggerDocument {
        TriggerDocument {
            trigger_type: self.type_name().to_string(),
            trigger_config: self.source.config(),
            conditions: self.rule.condition_documents(),
            actions: self.rule.action_documents(),
        }
    }
}

impl Drop for Trigger {
    fn drop(&mut self) {
        if self.installed
            && let Err(err) = self.uninstall_hook()
        {
            tracing::warn!(trigger = %self.id, error = %err, "failed to uninstall hook on drop");
        }
    }
}

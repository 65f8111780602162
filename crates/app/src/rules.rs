//! Rule engine — what happens when a trigger fires.
//!
//! A [`Rule`] holds a trigger's guard conditions and its ordered actions.
//! [`Rule::on_trigger`] runs synchronously on whichever thread detected the
//! event: trigger conditions first (AND), then each action in order, each
//! gated by its own conditions. A failing action is handed to the
//! [`FailureHandler`] and never stops the actions after it.

use std::sync::{Arc, Mutex, RwLock};

use vocom_domain::document::{ActionDocument, ConditionDocument};
use vocom_domain::error::ActionError;
use vocom_domain::id::TriggerId;
use vocom_domain::time::{Timestamp, now};

use crate::action::Action;
use crate::condition::{self, Condition};
use crate::sync::{lock, read, write};

/// Details of one failed action.
#[derive(Debug)]
pub struct ActionFailure<'a> {
    pub trigger: TriggerId,
    /// Position of the action within its trigger.
    pub index: usize,
    pub action_type: &'static str,
    pub error: &'a ActionError,
}

/// Told about every action whose `perform` fails.
pub trait FailureHandler: Send + Sync {
    fn action_failed(&self, failure: &ActionFailure<'_>);
}

/// Default handler: log at error level and carry on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailures;

impl FailureHandler for LogFailures {
    fn action_failed(&self, failure: &ActionFailure<'_>) {
        tracing::error!(
            trigger = %failure.trigger,
            index = failure.index,
            action = failure.action_type,
            error = %failure.error,
            "action failed"
        );
    }
}

/// Summary of one firing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// The trigger's own conditions were not met; no action ran.
    pub gated: bool,
    pub performed: usize,
    /// Actions whose conditions were not met.
    pub skipped: usize,
    pub failed: usize,
}

/// Conditions and actions of one trigger, shared with the threads that fire
/// it.
pub struct Rule {
    trigger_id: TriggerId,
    conditions: RwLock<Vec<Box<dyn Condition>>>,
    actions: RwLock<Vec<Action>>,
    last_fired: Mutex<Option<Timestamp>>,
    failures: Arc<dyn FailureHandler>,
}

impl Rule {
    pub fn new(trigger_id: TriggerId, failures: Arc<dyn FailureHandler>) -> Self {
        Self {
            trigger_id,
            conditions: RwLock::new(Vec::new()),
            actions: RwLock::new(Vec::new()),
            last_fired: Mutex::new(None),
            failures,
        }
    }

    #[must_use]
    pub fn trigger_id(&self) -> TriggerId {
        self.trigger_id
    }

    pub fn add_condition(&self, condition: Box<dyn Condition>) {
        write(&self.conditions).push(condition);
    }

    pub fn add_action(&self, action: Action) {
        write(&self.actions).push(action);
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        read(&self.actions).len()
    }

    #[must_use]
    pub fn condition_count(&self) -> usize {
        read(&self.conditions).len()
    }

    /// When `on_trigger` last ran, gated or not.
    #[must_use]
    pub fn last_fired(&self) -> Option<Timestamp> {
        *lock(&self.last_fired)
    }

    #[must_use]
    pub fn condition_documents(&self) -> Vec<ConditionDocument> {
        read(&self.conditions)
            .iter()
            .map(|condition| condition.to_document())
            .collect()
    }

    #[must_use]
    pub fn action_documents(&self) -> Vec<ActionDocument> {
        read(&self.actions).iter().map(Action::to_document).collect()
    }

    /// Evaluate the rule once.
    #[tracing::instrument(skip(self), fields(trigger = %self.trigger_id))]
    pub fn on_trigger(&self) -> Outcome {
        *lock(&self.last_fired) = Some(now());
        let mut outcome = Outcome::default();

        if !condition::all_met(&read(&self.conditions)) {
            tracing::debug!("trigger conditions not met");
            outcome.gated = true;
            return outcome;
        }

        for (index, action) in read(&self.actions).iter().enumerate() {
            if !action.conditions_met() {
                tracing::debug!(index, action = action.type_name(), "action skipped");
                outcome.skipped += 1;
                continue;
            }
            match action.perform() {
                Ok(()) => outcome.performed += 1,
                Err(error) => {
                    outcome.failed += 1;
                    self.failures.action_failed(&ActionFailure {
                        trigger: self.trigger_id,
                        index,
                        action_type: action.type_name(),
                        error: &error,
                    });
                }
            }
        }
        tracing::debug!(?outcome, "trigger handled");
        outcome
    }
}

//! Actions — an effect plus the conditions that gate it.

pub mod builtin;

use vocom_domain::arguments::ConfigMap;
use vocom_domain::document::ActionDocument;
use vocom_domain::error::ActionError;

use crate::condition::{self, Condition};

/// What an action does when performed.
pub trait Effect: Send + Sync {
    /// Identifier this effect is registered under.
    fn type_name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns an [`ActionError`] when the effect could not be carried out.
    fn perform(&self) -> Result<(), ActionError>;

    /// Parameters that rebuild this effect through its factory.
    fn config(&self) -> ConfigMap;
}

/// One step of a trigger's action list.
pub struct Action {
    effect: Box<dyn Effect>,
    conditions: Vec<Box<dyn Condition>>,
}

impl Action {
    #[must_use]
    pub fn new(effect: Box<dyn Effect>) -> Self {
        Self {
            effect,
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Box<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn add_condition(&mut self, condition: Box<dyn Condition>) {
        self.conditions.push(condition);
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.effect.type_name()
    }

    #[must_use]
    pub fn conditions(&self) -> &[Box<dyn Condition>] {
        &self.conditions
    }

    /// Whether every guard condition holds right now.
    #[must_use]
    pub fn conditions_met(&self) -> bool {
        condition::all_met(&self.conditions)
    }

    /// Run the effect, ignoring conditions.
    ///
    /// # Errors
    ///
    /// Propagates the effect's [`ActionError`].
    pub fn perform(&self) -> Result<(), ActionError> {
        self.effect.perform()
    }

    #[must_use]
    pub fn to_document(&self) -> ActionDocument {
        ActionDocument {
            action_type: self.type_name().to_string(),
            action_config: self.effect.config(),
            conditions: self
                .conditions
                .iter()
                .map(|condition| condition.to_document())
                .collect(),
        }
    }
}

//! Conditions — predicates over external state that gate triggers and
//! actions.

use std::sync::Arc;

use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::document::ConditionDocument;
use vocom_domain::error::{BackendError, VocomError};
use vocom_domain::window::WindowCriteria;

use crate::context::EngineContext;
use crate::ports::AutomationBackend;

/// Parameter names accepted by every window-based type.
pub(crate) const WINDOW_PARAMS: &[&str] = &[
    "title",
    "text",
    "exclude_title",
    "exclude_text",
    "title_match_mode",
    "detect_hidden_windows",
];

/// A polymorphic predicate. `check` may be called from any thread.
pub trait Condition: Send + Sync {
    /// Identifier this condition is registered under.
    fn type_name(&self) -> &'static str;

    /// Evaluate against the current state of the world.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the state cannot be queried.
    fn check(&self) -> Result<bool, BackendError>;

    /// Parameters that rebuild this condition through its factory.
    fn config(&self) -> ConfigMap;

    fn to_document(&self) -> ConditionDocument {
        ConditionDocument {
            condition_type: self.type_name().to_string(),
            condition_config: self.config(),
        }
    }
}

/// Logical AND over `conditions`; empty is `true`. A condition that fails
/// to evaluate counts as `false`.
pub(crate) fn all_met(conditions: &[Box<dyn Condition>]) -> bool {
    for condition in conditions {
        match condition.check() {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(condition = condition.type_name(), "condition not met");
                return false;
            }
            Err(err) => {
                tracing::warn!(
                    condition = condition.type_name(),
                    error = %err,
                    "condition check failed, treating as not met"
                );
                return false;
            }
        }
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowCheck {
    Exists,
    Active,
}

/// `window_exists` / `window_active`.
pub struct WindowCondition {
    check: WindowCheck,
    criteria: WindowCriteria,
    backend: Arc<dyn AutomationBackend>,
}

impl WindowCondition {
    pub const EXISTS: &'static str = "window_exists";
    pub const ACTIVE: &'static str = "window_active";

    pub fn exists(backend: Arc<dyn AutomationBackend>, criteria: WindowCriteria) -> Self {
        Self {
            check: WindowCheck::Exists,
            criteria,
            backend,
        }
    }

    pub fn active(backend: Arc<dyn AutomationBackend>, criteria: WindowCriteria) -> Self {
        Self {
            check: WindowCheck::Active,
            criteria,
            backend,
        }
    }

    #[must_use]
    pub fn criteria(&self) -> &WindowCriteria {
        &self.criteria
    }

    pub(crate) fn restore_exists(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn Condition>, VocomError> {
        let criteria = window_criteria(args)?;
        Ok(Box::new(Self::exists(Arc::clone(ctx.backend()), criteria)))
    }

    pub(crate) fn restore_active(
        ctx: &EngineContext,
        args: &Arguments,
    ) -> Result<Box<dyn Condition>, VocomError> {
        let criteria = window_criteria(args)?;
        Ok(Box::new(Self::active(Arc::clone(ctx.backend()), criteria)))
    }
}

impl Condition for WindowCondition {
    fn type_name(&self) -> &'static str {
        match self.check {
            WindowCheck::Exists => Self::EXISTS,
            WindowCheck::Active => Self::ACTIVE,
        }
    }

    fn check(&self) -> Result<bool, BackendError> {
        match self.check {
            WindowCheck::Exists => self.backend.window_exists(&self.criteria),
            WindowCheck::Active => self.backend.window_active(&self.criteria),
        }
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::from(&self.criteria)
    }
}

/// Decode the shared window parameters.
pub(crate) fn window_criteria(args: &Arguments) -> Result<WindowCriteria, VocomError> {
    args.expect_only(WINDOW_PARAMS, false)?;
    Ok(args.named_as()?)
}

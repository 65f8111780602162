//! Profiles — a named, ordered set of triggers activated together.

use vocom_domain::document::{ProfileDocument, SCHEMA_VERSION};
use vocom_domain::error::{LifecycleError, VocomError};
use vocom_domain::id::ProfileId;

use crate::context::EngineContext;
use crate::registry::Registries;
use crate::trigger::Trigger;

/// The top-level unit of persistence.
pub struct Profile {
    id: ProfileId,
    name: String,
    triggers: Vec<Trigger>,
    context: EngineContext,
    active: bool,
}

impl Profile {
    #[must_use]
    pub fn new(name: impl Into<String>, context: EngineContext) -> Self {
        Self {
            id: ProfileId::new(),
            name: name.into(),
            triggers: Vec::new(),
            context,
            active: false,
        }
    }

    /// Validate `document` completely, then build every trigger. Either the
    /// whole profile is built or nothing is: a failure drops the triggers
    /// restored so far, releasing what they registered.
    ///
    /// # Errors
    ///
    /// Any schema, registry, argument or phrase error.
    #[tracing::instrument(skip_all, fields(profile = %document.profile_name))]
    pub fn restore(
        context: EngineContext,
        registries: &Registries,
        document: &ProfileDocument,
    ) -> Result<Self, VocomError> {
        registries.validate(document)?;
        let triggers = document
            .triggers
            .iter()
            .map(|trigger| registries.restore_trigger(&context, trigger))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(triggers = triggers.len(), "profile restored");
        let mut profile = Self::new(document.profile_name.clone(), context);
        profile.triggers = triggers;
        Ok(profile)
    }

    #[must_use]
    pub fn id(&self) -> ProfileId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append a trigger. On an active profile its hook is installed first.
    ///
    /// # Errors
    ///
    /// The trigger's install error; the trigger is not added.
    pub fn add_trigger(&mut self, mut trigger: Trigger) -> Result<(), VocomError> {
        if self.active {
            trigger.install_hook()?;
        }
        self.triggers.push(trigger);
        Ok(())
    }

    /// Install every trigger hook, in order. If one fails, the hooks
    /// installed before it are removed again.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AlreadyActive`], or the first install error.
    #[tracing::instrument(skip(self), fields(profile = %self.name, id = %self.id))]
    pub fn activate(&mut self) -> Result<(), VocomError> {
        if self.active {
            return Err(LifecycleError::AlreadyActive {
                profile: self.name.clone(),
            }
            .into());
        }
        for index in 0..self.triggers.len() {
            if let Err(err) = self.triggers[index].install_hook() {
                for installed in &mut self.triggers[..index] {
                    if let Err(rollback) = installed.uninstall_hook() {
                        tracing::warn!(error = %rollback, "failed to roll back hook");
                    }
                }
                self.context.stop_listeners();
                return Err(err);
            }
        }
        self.active = true;
        tracing::info!(triggers = self.triggers.len(), "profile activated");
        Ok(())
    }

    /// Uninstall every hook and stop the shared listeners. Every trigger is
    /// attempted even if one fails.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotActive`], or the first uninstall error.
    #[tracing::instrument(skip(self), fields(profile = %self.name, id = %self.id))]
    pub fn deactivate(&mut self) -> Result<(), VocomError> {
        if !self.active {
            return Err(LifecycleError::NotActive {
                profile: self.name.clone(),
            }
            .into());
        }
        self.active = false;
        let mut first_error = None;
        for trigger in &mut self.triggers {
            if let Err(err) = trigger.uninstall_hook() {
                tracing::warn!(trigger = %trigger.id(), error = %err, "failed to uninstall hook");
                first_error.get_or_insert(err);
            }
        }
        self.context.stop_listeners();
        tracing::info!("profile deactivated");
        first_error.map_or(Ok(()), Err)
    }

    #[must_use]
    pub fn to_document(&self) -> ProfileDocument {
        ProfileDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            profile_name: self.name.clone(),
            triggers: self.triggers.iter().map(Trigger::to_document).collect(),
        }
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        if self.active
            && let Err(err) = self.deactivate()
        {
            tracing::warn!(profile = %self.name, error = %err, "failed to deactivate on drop");
        }
    }
}

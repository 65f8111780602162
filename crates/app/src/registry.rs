//! Type registries — map stable type identifiers to factories.
//!
//! Each family (triggers, actions, conditions) has its own
//! [`TypeRegistry`]; [`Registries`] groups the three and knows how to
//! validate a whole document and restore its nodes. Nothing registers
//! itself: built-ins are added by [`Registries::with_builtins`].

use std::collections::BTreeMap;
use std::sync::Arc;

use vocom_domain::arguments::{Arguments, ConfigMap};
use vocom_domain::document::{ActionDocument, ConditionDocument, ProfileDocument, TriggerDocument};
use vocom_domain::error::{ArgumentError, RegistryError, TypeKind, VocomError};

use crate::action::builtin::{ActivateWindow, Pause, PlaySound, PressKey, RunProcess, SendInput};
use crate::action::{Action, Effect};
use crate::condition::{Condition, WindowCondition};
use crate::context::EngineContext;
use crate::trigger::axis::AxisSource;
use crate::trigger::hotkey::{HotkeySource, JoystickButtonSource};
use crate::trigger::voice::VoiceSource;
use crate::trigger::{Trigger, TriggerSource};

/// Builds one object from its parameters.
pub type Factory<T> = Box<dyn Fn(&EngineContext, &Arguments) -> Result<T, VocomError> + Send + Sync>;

struct Entry<T> {
    variadic: Option<&'static str>,
    factory: Factory<T>,
}

/// Factories for one family of objects.
pub struct TypeRegistry<T> {
    kind: TypeKind,
    entries: BTreeMap<String, Entry<T>>,
}

impl<T> TypeRegistry<T> {
    #[must_use]
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    /// Register a type that takes named parameters only.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateType`] if `name` is taken.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&EngineContext, &Arguments) -> Result<T, VocomError> + Send + Sync + 'static,
    {
        self.insert(name, None, Box::new(factory))
    }

    /// Register a type whose variadic parameter is called `variadic`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateType`] if `name` is taken.
    pub fn register_variadic<F>(
        &mut self,
        name: &str,
        variadic: &'static str,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&EngineContext, &Arguments) -> Result<T, VocomError> + Send + Sync + 'static,
    {
        self.insert(name, Some(variadic), Box::new(factory))
    }

    fn insert(
        &mut self,
        name: &str,
        variadic: Option<&'static str>,
        factory: Factory<T>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::DuplicateType {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        self.entries
            .insert(name.to_string(), Entry { variadic, factory });
        Ok(())
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered identifiers in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Check that `name` exists and that `config` splits cleanly and only
    /// carries a variadic sequence where the type declares one.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownType`], [`ArgumentError::MultipleVariadic`]
    /// or [`ArgumentError::UnexpectedVariadic`].
    pub fn check(&self, name: &str, config: &ConfigMap) -> Result<Arguments, VocomError> {
        let entry = self.entry(name)?;
        let args = config.arguments()?;
        if let Some(variadic) = args.variadic()
            && entry.variadic != Some(variadic.name.as_str())
        {
            return Err(ArgumentError::UnexpectedVariadic {
                name: variadic.name.clone(),
            }
            .into());
        }
        Ok(args)
    }

    /// Build an object of type `name` from `config`.
    ///
    /// # Errors
    ///
    /// Anything [`TypeRegistry::check`] reports, or the factory's own error.
    pub fn create(
        &self,
        ctx: &EngineContext,
        name: &str,
        config: &ConfigMap,
    ) -> Result<T, VocomError> {
        let args = self.check(name, config)?;
        let entry = self.entry(name)?;
        (entry.factory)(ctx, &args)
    }

    fn entry(&self, name: &str) -> Result<&Entry<T>, RegistryError> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType {
                kind: self.kind,
                name: name.to_string(),
            })
    }
}

/// The three registries consulted when restoring a document.
pub struct Registries {
    pub triggers: TypeRegistry<Box<dyn TriggerSource>>,
    pub actions: TypeRegistry<Box<dyn Effect>>,
    pub conditions: TypeRegistry<Box<dyn Condition>>,
}

impl Default for Registries {
    fn default() -> Self {
        Self::empty()
    }
}

impl Registries {
    /// Registries with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            triggers: TypeRegistry::new(TypeKind::Trigger),
            actions: TypeRegistry::new(TypeKind::Action),
            conditions: TypeRegistry::new(TypeKind::Condition),
        }
    }

    /// Registries holding every built-in type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateType`] if two built-ins share an identifier.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registries = Self::empty();

        let triggers = &mut registries.triggers;
        triggers.register(HotkeySource::TYPE, HotkeySource::restore)?;
        triggers.register(JoystickButtonSource::TYPE, JoystickButtonSource::restore)?;
        triggers.register(AxisSource::TYPE, AxisSource::restore)?;
        triggers.register_variadic(VoiceSource::TYPE, VoiceSource::VARIADIC, VoiceSource::restore)?;

        let actions = &mut registries.actions;
        actions.register(SendInput::TYPE, SendInput::restore)?;
        actions.register(PressKey::TYPE, PressKey::restore)?;
        actions.register(PlaySound::TYPE, PlaySound::restore)?;
        actions.register(ActivateWindow::TYPE, ActivateWindow::restore)?;
        actions.register(Pause::TYPE, Pause::restore)?;
        actions.register_variadic(RunProcess::TYPE, RunProcess::VARIADIC, RunProcess::restore)?;

        let conditions = &mut registries.conditions;
        conditions.register(WindowCondition::EXISTS, WindowCondition::restore_exists)?;
        conditions.register(WindowCondition::ACTIVE, WindowCondition::restore_active)?;

        Ok(registries)
    }

    /// Validate a document without building anything: header, every type
    /// identifier and the variadic rule of every node.
    ///
    /// # Errors
    ///
    /// The first [`SchemaError`](vocom_domain::error::SchemaError),
    /// [`RegistryError`] or [`ArgumentError`] found, in document order.
    #[tracing::instrument(skip_all, fields(profile = %document.profile_name))]
    pub fn validate(&self, document: &ProfileDocument) -> Result<(), VocomError> {
        document.check_header()?;
        for node in document.nodes() {
            match node.kind {
                TypeKind::Trigger => self.triggers.check(node.type_name, node.config)?,
                TypeKind::Action => self.actions.check(node.type_name, node.config)?,
                TypeKind::Condition => self.conditions.check(node.type_name, node.config)?,
            };
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`TypeRegistry::create`].
    pub fn restore_condition(
        &self,
        ctx: &EngineContext,
        document: &ConditionDocument,
    ) -> Result<Box<dyn Condition>, VocomError> {
        self.conditions
            .create(ctx, &document.condition_type, &document.condition_config)
    }

    /// Restore an action together with its conditions.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::create`].
    pub fn restore_action(
        &self,
        ctx: &EngineContext,
        document: &ActionDocument,
    ) -> Result<Action, VocomError> {
        let effect = self
            .actions
            .create(ctx, &document.action_type, &document.action_config)?;
        let mut action = Action::new(effect);
        for condition in &document.conditions {
            action.add_condition(self.restore_condition(ctx, condition)?);
        }
        Ok(action)
    }

    /// Restore a trigger with its conditions and actions. Nothing is
    /// installed.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::create`].
    pub fn restore_trigger(
        &self,
        ctx: &EngineContext,
        document: &TriggerDocument,
    ) -> Result<Trigger, VocomError> {
        let source = self
            .triggers
            .create(ctx, &document.trigger_type, &document.trigger_config)?;
        let trigger = Trigger::with_failure_handler(source, Arc::clone(ctx.failure_handler()));
        for condition in &document.conditions {
            trigger.add_condition(self.restore_condition(ctx, condition)?);
        }
        for action in &document.actions {
            trigger.add_action(self.restore_action(ctx, action)?);
        }
        Ok(trigger)
    }
}

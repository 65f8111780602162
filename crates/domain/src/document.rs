//! Profile documents — the persisted shape of a rule graph.
//!
//! A [`ProfileDocument`] is plain data: it is parsed and emitted by the codec
//! and turned into live objects by the registries. Nothing here knows which
//! type identifiers exist.

use serde::{Deserialize, Serialize};

use crate::arguments::ConfigMap;
use crate::error::{SchemaError, TypeKind};

/// The only schema version this build reads and the one it always writes.
pub const SCHEMA_VERSION: &str = "0";

/// Top-level persisted profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub schema_version: String,
    pub profile_name: String,
    #[serde(default)]
    pub triggers: Vec<TriggerDocument>,
}

/// A trigger with its guard conditions and ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDocument {
    pub trigger_type: String,
    #[serde(default)]
    pub trigger_config: ConfigMap,
    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,
    #[serde(default)]
    pub actions: Vec<ActionDocument>,
}

/// An action with its own guard conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDocument {
    pub action_type: String,
    #[serde(default)]
    pub action_config: ConfigMap,
    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    pub condition_type: String,
    #[serde(default)]
    pub condition_config: ConfigMap,
}

/// One typed node of a document.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub kind: TypeKind,
    pub type_name: &'a str,
    pub config: &'a ConfigMap,
}

impl ProfileDocument {
    /// Create an empty document at the current schema version.
    #[must_use]
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            profile_name: profile_name.into(),
            triggers: Vec::new(),
        }
    }

    /// Check the document-level invariants (version and name).
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnsupportedVersion`] or [`SchemaError::EmptyProfileName`].
    pub fn check_header(&self) -> Result<(), SchemaError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: self.schema_version.clone(),
                expected: SCHEMA_VERSION,
            });
        }
        if self.profile_name.trim().is_empty() {
            return Err(SchemaError::EmptyProfileName);
        }
        Ok(())
    }

    /// Every typed node in document order (trigger, its conditions, then
    /// each action followed by the action's conditions).
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeRef<'_>> {
        let mut nodes = Vec::new();
        for trigger in &self.triggers {
            nodes.push(NodeRef {
                kind: TypeKind::Trigger,
                type_name: &trigger.trigger_type,
                config: &trigger.trigger_config,
            });
            nodes.extend(trigger.conditions.iter().map(ConditionDocument::node));
            for action in &trigger.actions {
                nodes.push(NodeRef {
                    kind: TypeKind::Action,
                    type_name: &action.action_type,
                    config: &action.action_config,
                });
                nodes.extend(action.conditions.iter().map(ConditionDocument::node));
            }
        }
        nodes
    }
}

impl ConditionDocument {
    fn node(&self) -> NodeRef<'_> {
        NodeRef {
            kind: TypeKind::Condition,
            type_name: &self.condition_type,
            config: &self.condition_config,
        }
    }
}

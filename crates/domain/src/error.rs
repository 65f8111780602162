//! Common error types used across the workspace.
//!
//! Each concern has its own typed error; [`VocomError`] aggregates them via
//! `#[from]` so callers can propagate with `?` across layers.

use std::fmt;
use std::time::Duration;

/// Top-level error returned by document loading, registry and lifecycle
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum VocomError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Phrase(#[from] PhraseError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    /// The document text could not be parsed as JSON or YAML.
    #[error("failed to parse profile document")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to encode profile document")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading or writing a profile file failed.
    #[error("profile file I/O failed")]
    Io(#[from] std::io::Error),

    /// The file extension names no known document format.
    #[error("cannot infer document format from `{}`", path.display())]
    UnknownFormat { path: std::path::PathBuf },
}

/// The three families of polymorphic objects kept in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Trigger,
    Action,
    Condition,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => f.write_str("trigger"),
            Self::Action => f.write_str("action"),
            Self::Condition => f.write_str("condition"),
        }
    }
}

/// Type registration and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A factory is already registered under this identifier.
    #[error("{kind} type `{name}` is already registered")]
    DuplicateType { kind: TypeKind, name: String },

    /// No factory is registered under this identifier.
    #[error("unknown {kind} type `{name}`")]
    UnknownType { kind: TypeKind, name: String },
}

/// A configuration map does not fit the parameters of its type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// More than one `*`-prefixed key in a single config map.
    #[error("multiple variadic parameters: `{first}` and `{second}`")]
    MultipleVariadic { first: String, second: String },

    #[error("missing required parameter `{name}`")]
    Missing { name: String },

    #[error("parameter `{name}` is invalid: expected {expected}")]
    Invalid { name: String, expected: String },

    #[error("unexpected parameter `{name}`")]
    Unexpected { name: String },

    /// A variadic sequence was supplied to a type that takes none.
    #[error("unexpected variadic parameter `{name}`")]
    UnexpectedVariadic { name: String },
}

/// Document-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unsupported schema version `{found}` (expected `{expected}`)")]
    UnsupportedVersion { found: String, expected: &'static str },

    #[error("profile name must not be empty")]
    EmptyProfileName,
}

/// Phrase registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhraseError {
    /// A phrase may be registered to at most one channel at a time.
    #[error("phrase `{phrase}` is already registered")]
    AlreadyRegistered { phrase: String },

    #[error("phrase `{phrase}` is not registered")]
    NotRegistered { phrase: String },

    #[error("phrase must not be empty")]
    Empty,
}

/// Start/stop misuse. These indicate a programming error in the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("trigger `{trigger}` is already installed")]
    AlreadyInstalled { trigger: String },

    #[error("trigger `{trigger}` is not installed")]
    NotInstalled { trigger: String },

    #[error("profile `{profile}` is already active")]
    AlreadyActive { profile: String },

    #[error("profile `{profile}` is not active")]
    NotActive { profile: String },
}

/// Misuse of the set of named profiles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("a profile named `{name}` already exists")]
    DuplicateProfile { name: String },

    #[error("no profile named `{name}`")]
    UnknownProfile { name: String },
}

/// Failures reported by the automation backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("{operation} failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },

    #[error("no window matches {criteria}")]
    WindowNotFound { criteria: String },

    #[error("joystick {joystick} has no value for axis {axis}")]
    AxisUnavailable { joystick: u8, axis: String },

    #[error("{operation} is not supported by this backend")]
    Unsupported { operation: &'static str },
}

/// Raised by an action's `perform()`. Isolated per action by the rule engine.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("backend call failed")]
    Backend(#[from] BackendError),

    /// Any failure not originating in the backend.
    #[error("action `{action}` failed: {message}")]
    Failed { action: String, message: String },
}

/// No utterance could be captured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Nothing was heard within the capture timeout.
    #[error("no utterance within {0:?}")]
    Timeout(Duration),

    #[error("capture device failed: {message}")]
    Device { message: String },
}

/// Transcription failures. Both are non-fatal for the listening loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptionError {
    /// The audio contained no usable speech.
    #[error("speech was not recognised")]
    UnknownSpeech,

    /// The transcription service could not be reached.
    #[error("transcription service unavailable: {message}")]
    ServiceUnavailable { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_duplicate_type_with_kind() {
        let err = RegistryError::DuplicateType {
            kind: TypeKind::Action,
            name: "pause".to_string(),
        };
        assert_eq!(err.to_string(), "action type `pause` is already registered");
    }

    #[test]
    fn should_display_unknown_type_with_kind() {
        let err = RegistryError::UnknownType {
            kind: TypeKind::Trigger,
            name: "telepathy".to_string(),
        };
        assert_eq!(err.to_string(), "unknown trigger type `telepathy`");
    }

    #[test]
    fn should_convert_registry_error_into_vocom_error() {
        let err: VocomError = RegistryError::UnknownType {
            kind: TypeKind::Condition,
            name: "x".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            VocomError::Registry(RegistryError::UnknownType { .. })
        ));
    }

    #[test]
    fn should_display_multiple_variadic_with_both_names() {
        let err = ArgumentError::MultipleVariadic {
            first: "*a".to_string(),
            second: "*b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "multiple variadic parameters: `*a` and `*b`"
        );
    }

    #[test]
    fn should_keep_argument_message_when_wrapped_transparently() {
        let err: VocomError = ArgumentError::Missing {
            name: "hotkey".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "missing required parameter `hotkey`");
    }

    #[test]
    fn should_display_capture_timeout() {
        let err = CaptureError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "no utterance within 5s");
    }

    #[test]
    fn should_display_unsupported_schema_version() {
        let err = SchemaError::UnsupportedVersion {
            found: "7".to_string(),
            expected: "0",
        };
        assert_eq!(
            err.to_string(),
            "unsupported schema version `7` (expected `0`)"
        );
    }
}

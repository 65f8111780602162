//! Profile codec: profile documents to and from JSON or YAML text and files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use vocom_domain::document::ProfileDocument;
use vocom_domain::error::VocomError;

use crate::context::EngineContext;
use crate::profile::Profile;
use crate::registry::Registries;

/// Marker between a profile name and its format extension in a profile
/// directory: `elite.vcp.json`.
pub const PROFILE_SUFFIX: &str = "vcp";

/// Text encoding of a profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Infer the format from a file extension (`.json`, `.yaml` or `.yml`).
    ///
    /// # Errors
    ///
    /// [`VocomError::UnknownFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, VocomError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(VocomError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Extension written for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Parse `text` into a document. No type identifier is checked here.
    ///
    /// # Errors
    ///
    /// [`VocomError::Parse`] when the text is malformed or does not have the
    /// document shape.
    pub fn parse(self, text: &str) -> Result<ProfileDocument, VocomError> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|err| VocomError::Parse(Box::new(err))),
            Self::Yaml => serde_yaml::from_str(text).map_err(|err| VocomError::Parse(Box::new(err))),
        }
    }

    /// # Errors
    ///
    /// [`VocomError::Encode`] if serialization fails.
    pub fn render(self, document: &ProfileDocument) -> Result<String, VocomError> {
        match self {
            Self::Json => {
                serde_json::to_string_pretty(document).map_err(|err| VocomError::Encode(Box::new(err)))
            }
            Self::Yaml => {
                serde_yaml::to_string(document).map_err(|err| VocomError::Encode(Box::new(err)))
            }
        }
    }
}

/// Loads and saves profiles against a set of registries.
pub struct ProfileCodec {
    registries: Registries,
    context: EngineContext,
}

impl ProfileCodec {
    #[must_use]
    pub fn new(registries: Registries, context: EngineContext) -> Self {
        Self {
            registries,
            context,
        }
    }

    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Parse and restore a profile. The document is validated in full
    /// before any object is built.
    ///
    /// # Errors
    ///
    /// Parse, schema, registry, argument or phrase errors.
    #[tracing::instrument(skip(self, text))]
    pub fn decode(&self, text: &str, format: DocumentFormat) -> Result<Profile, VocomError> {
        let document = format.parse(text)?;
        Profile::restore(self.context.clone(), &self.registries, &document)
    }

    /// Emit `profile` at the current schema version.
    ///
    /// # Errors
    ///
    /// [`VocomError::Encode`] if serialization fails.
    pub fn encode(&self, profile: &Profile, format: DocumentFormat) -> Result<String, VocomError> {
        format.render(&profile.to_document())
    }

    /// # Errors
    ///
    /// [`VocomError::UnknownFormat`], [`VocomError::Io`] or any
    /// [`decode`](Self::decode) error.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub fn load_file(&self, path: &Path) -> Result<Profile, VocomError> {
        let format = DocumentFormat::from_path(path)?;
        let text = fs::read_to_string(path)?;
        let profile = self.decode(&text, format)?;
        tracing::info!(profile = profile.name(), "profile loaded");
        Ok(profile)
    }

    /// Write `profile` to `path` in the format named by its extension.
    /// An existing file is only replaced when `overwrite` is set.
    ///
    /// # Errors
    ///
    /// [`VocomError::UnknownFormat`], [`VocomError::Encode`], or
    /// [`VocomError::Io`] (kind `AlreadyExists` when the file exists and
    /// `overwrite` is false).
    #[tracing::instrument(skip(self, profile), fields(path = %path.display(), profile = profile.name()))]
    pub fn save_file(&self, profile: &Profile, path: &Path, overwrite: bool) -> Result<(), VocomError> {
        let format = DocumentFormat::from_path(path)?;
        let text = self.encode(profile, format)?;
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(path)?;
        file.write_all(text.as_bytes())?;
        tracing::info!("profile saved");
        Ok(())
    }

    /// Load the profile called `name` from `directory`, trying
    /// `<name>.vcp.json` then `<name>.vcp.yaml`.
    ///
    /// # Errors
    ///
    /// [`VocomError::Io`] of kind `NotFound` when neither file exists, or
    /// any [`load_file`](Self::load_file) error.
    #[tracing::instrument(skip(self), fields(directory = %directory.display()))]
    pub fn load_named(&self, directory: &Path, name: &str) -> Result<Profile, VocomError> {
        let found = [DocumentFormat::Json, DocumentFormat::Yaml]
            .into_iter()
            .map(|format| named_path(directory, name, format))
            .find(|path| path.is_file());
        let Some(path) = found else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no profile named `{name}` in {}", directory.display()),
            )
            .into());
        };
        self.load_file(&path)
    }

    /// Save `profile` into `directory` as `<profile name>.vcp.<ext>`,
    /// creating the directory if needed. Returns the written path.
    ///
    /// # Errors
    ///
    /// See [`save_file`](Self::save_file); also [`VocomError::Io`] when the
    /// directory cannot be created.
    pub fn save_named(
        &self,
        profile: &Profile,
        directory: &Path,
        format: DocumentFormat,
        overwrite: bool,
    ) -> Result<PathBuf, VocomError> {
        fs::create_dir_all(directory)?;
        let path = named_path(directory, profile.name(), format);
        self.save_file(profile, &path, overwrite)?;
        Ok(path)
    }
}

fn named_path(directory: &Path, name: &str, format: DocumentFormat) -> PathBuf {
    directory.join(format!("{name}.{PROFILE_SUFFIX}.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, context};
    use serde_json::json;
    use std::sync::Arc;
    use vocom_domain::error::{RegistryError, SchemaError};

    fn codec() -> ProfileCodec {
        let backend = Arc::new(FakeBackend::default());
        ProfileCodec::new(Registries::with_builtins().unwrap(), context(&backend))
    }

    /// One node of every built-in type.
    fn every_variant() -> ProfileDocument {
        serde_json::from_value(json!({
            "schema_version": "0",
            "profile_name": "everything",
            "triggers": [
                {
                    "trigger_type": "hotkey",
                    "trigger_config": {"hotkey": "^!g"},
                    "conditions": [
                        {"condition_type": "window_exists", "condition_config": {"title": "Elite"}}
                    ],
                    "actions": [
                        {"action_type": "send_input", "action_config": {"send_string": "{Enter}"}},
                        {
                            "action_type": "press_key",
                            "action_config": {"key": "g", "hold_ms": 250},
                            "conditions": [
                                {
                                    "condition_type": "window_active",
                                    "condition_config": {"title": "Elite", "title_match_mode": "exact"}
                                }
                            ]
                        }
                    ]
                },
                {
                    "trigger_type": "joystick_button",
                    "trigger_config": {"joystick_index": 1, "joystick_button": 3},
                    "actions": [
                        {"action_type": "play_sound", "action_config": {"sound_file_path": "/tmp/gear.wav"}},
                        {"action_type": "activate_window", "action_config": {"title": "Notepad"}}
                    ]
                },
                {
                    "trigger_type": "joystick_axis",
                    "trigger_config": {
                        "joystick_index": 2, "axis_name": "R", "trigger_mode": 1,
                        "trigger_value": [20.0, 40.0], "polling_frequency": 15
                    },
                    "actions": [{"action_type": "pause", "action_config": {"seconds": 1.5}}]
                },
                {
                    "trigger_type": "voice",
                    "trigger_config": {"*trigger_phrases": ["request docking", "boost"]},
                    "actions": [
                        {"action_type": "run_process", "action_config": {"program": "notify-send", "*args": ["docking"]}}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn should_infer_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")).unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")).unwrap(), DocumentFormat::Yaml);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("a.toml")),
            Err(VocomError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn should_round_trip_every_variant_through_json() {
        let codec = codec();
        let text = DocumentFormat::Json.render(&every_variant()).unwrap();

        let profile = codec.decode(&text, DocumentFormat::Json).unwrap();

        assert_eq!(profile.to_document(), every_variant());
        assert_eq!(codec.encode(&profile, DocumentFormat::Json).unwrap(), text);
    }

    #[test]
    fn should_round_trip_every_variant_through_yaml() {
        let codec = codec();
        let text = DocumentFormat::Yaml.render(&every_variant()).unwrap();

        let profile = codec.decode(&text, DocumentFormat::Yaml).unwrap();

        assert_eq!(profile.to_document(), every_variant());
    }

    #[test]
    fn should_reject_malformed_text() {
        assert!(matches!(
            codec().decode("{ not json", DocumentFormat::Json),
            Err(VocomError::Parse(_))
        ));
    }

    #[test]
    fn should_reject_unsupported_schema_version() {
        let text = r#"{"schema_version": "2", "profile_name": "old", "triggers": []}"#;
        assert!(matches!(
            codec().decode(text, DocumentFormat::Json),
            Err(VocomError::Schema(SchemaError::UnsupportedVersion { .. }))
        ));
    }

    #[test]
    fn should_reject_unregistered_action_type() {
        let text = r#"
schema_version: "0"
profile_name: yaml
triggers:
  - trigger_type: hotkey
    trigger_config:
      hotkey: F1
    actions:
      - action_type: teleport
"#;
        assert!(matches!(
            codec().decode(text, DocumentFormat::Yaml),
            Err(VocomError::Registry(RegistryError::UnknownType { .. }))
        ));
    }

    #[test]
    fn should_save_and_load_file() {
        let codec = codec();
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("profile.yaml");
        let profile = codec.decode(&DocumentFormat::Json.render(&every_variant()).unwrap(), DocumentFormat::Json);
        let profile = profile.unwrap();

        codec.save_file(&profile, &path, false).unwrap();
        drop(profile);
        let loaded = codec.load_file(&path).unwrap();

        assert_eq!(loaded.to_document(), every_variant());
    }

    #[test]
    fn should_refuse_to_overwrite_unless_asked() {
        let codec = codec();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "keep me").unwrap();
        let profile = Profile::new("fresh", codec.context().clone());

        let refused = codec.save_file(&profile, &path, false);
        assert!(matches!(
            refused,
            Err(VocomError::Io(ref err)) if err.kind() == std::io::ErrorKind::AlreadyExists
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        codec.save_file(&profile, &path, true).unwrap();
        assert_eq!(codec.load_file(&path).unwrap().name(), "fresh");
    }

    #[test]
    fn should_load_profile_by_name_from_directory() {
        let codec = codec();
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new("elite", codec.context().clone());

        let path = codec
            .save_named(&profile, &dir.path().join("profiles"), DocumentFormat::Yaml, false)
            .unwrap();
        assert!(path.ends_with("profiles/elite.vcp.yaml"));

        let loaded = codec.load_named(&dir.path().join("profiles"), "elite").unwrap();
        assert_eq!(loaded.name(), "elite");
    }

    #[test]
    fn should_prefer_json_when_both_named_files_exist() {
        let codec = codec();
        let dir = tempfile::tempdir().unwrap();
        let json = Profile::new("twin", codec.context().clone());
        codec.save_named(&json, dir.path(), DocumentFormat::Json, false).unwrap();
        fs::write(dir.path().join("twin.vcp.yaml"), "not: [valid").unwrap();

        assert_eq!(codec.load_named(dir.path(), "twin").unwrap().name(), "twin");
    }

    #[test]
    fn should_report_not_found_when_no_named_profile_exists() {
        let codec = codec();
        let dir = tempfile::tempdir().unwrap();
        let result = codec.load_named(dir.path(), "ghost");
        assert!(matches!(
            result,
            Err(VocomError::Io(ref err)) if err.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn should_emit_current_schema_version() {
        let codec = codec();
        let profile = Profile::new("empty", codec.context().clone());
        let text = codec.encode(&profile, DocumentFormat::Json).unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["schema_version"], json!("0"));
        assert_eq!(document["triggers"], json!([]));
    }
}

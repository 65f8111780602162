//! Profile library — the named profiles known to the application, at most
//! one of which is active.
//!
//! Switching the active profile deactivates the current one before the new
//! one is activated, so two profiles never hold hooks at the same time.

use vocom_domain::error::{LibraryError, VocomError};

use crate::context::EngineContext;
use crate::profile::Profile;

/// Name of the empty profile created by [`ProfileLibrary::with_default`].
pub const DEFAULT_PROFILE: &str = "default";

struct Entry {
    name: String,
    profile: Profile,
}

/// Named profiles in insertion order.
#[derive(Default)]
pub struct ProfileLibrary {
    entries: Vec<Entry>,
    active: Option<String>,
}

impl ProfileLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding one empty, inactive profile named
    /// [`DEFAULT_PROFILE`].
    #[must_use]
    pub fn with_default(context: EngineContext) -> Self {
        Self {
            entries: vec![Entry {
                name: DEFAULT_PROFILE.to_string(),
                profile: Profile::new(DEFAULT_PROFILE, context),
            }],
            active: None,
        }
    }

    /// # Errors
    ///
    /// [`LibraryError::DuplicateProfile`] if `name` is taken; `profile` is
    /// dropped.
    pub fn add(&mut self, name: impl Into<String>, profile: Profile) -> Result<(), LibraryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(LibraryError::DuplicateProfile { name });
        }
        tracing::debug!(%name, "profile added");
        self.entries.push(Entry { name, profile });
        Ok(())
    }

    /// Take `name` out of the library. The active profile is deactivated
    /// first and the library is left with none active.
    ///
    /// # Errors
    ///
    /// [`LibraryError::UnknownProfile`], or the deactivation error (the
    /// profile is removed regardless).
    pub fn remove(&mut self, name: &str) -> Result<Profile, VocomError> {
        let index = self.position(name)?;
        let mut profile = self.entries.remove(index).profile;
        if self.active.as_deref() == Some(name) {
            self.active = None;
            profile.deactivate()?;
        }
        tracing::debug!(name, "profile removed");
        Ok(profile)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.profile)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| &mut entry.profile)
    }

    /// Profile names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn active(&self) -> Option<&Profile> {
        self.active.as_deref().and_then(|name| self.get(name))
    }

    /// Make `name` the active profile, or leave none active for `None`.
    /// The current profile is deactivated first, even when `name` is the
    /// same profile.
    ///
    /// # Errors
    ///
    /// [`LibraryError::UnknownProfile`] before anything changes, otherwise
    /// the deactivation or activation error. After an activation error no
    /// profile is active.
    #[tracing::instrument(skip(self))]
    pub fn switch_to(&mut self, name: Option<&str>) -> Result<(), VocomError> {
        let next = name.map(|name| self.position(name)).transpose()?;

        if let Some(current) = self.active.take() {
            let index = self.position(&current)?;
            self.entries[index].profile.deactivate()?;
        }
        if let Some(index) = next {
            let entry = &mut self.entries[index];
            entry.profile.activate()?;
            self.active = Some(entry.name.clone());
        }
        tracing::info!(active = ?self.active, "active profile switched");
        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize, LibraryError> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| LibraryError::UnknownProfile {
                name: name.to_string(),
            })
    }
}

//! # vocom-adapter-virtual
//!
//! Simulated implementations of every vocom port, for tests and
//! demonstration.
//!
//! ## Provided ports
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualBackend`] | `AutomationBackend` | In-memory desktop: hotkeys fired with `press`, windows, axes, journaled side effects |
//! | [`ScriptedMicrophone`] | `CaptureDevice` | Yields text queued through a [`Speaker`] |
//! | [`ScriptedTranscriber`] | `SpeechToText` | Decodes scripted clips, optionally failing first |
//!
//! ## Dependency rule
//!
//! Depends on `vocom-app` (port traits) and `vocom-domain` only.

mod backend;
mod speech;
mod sync;

pub use backend::{BackendCall, VirtualBackend, VirtualWindow};
pub use speech::{SCRIPTED_SAMPLE_RATE, ScriptedMicrophone, ScriptedTranscriber, Speaker};

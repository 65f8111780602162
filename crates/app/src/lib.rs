//! # vocom-app
//!
//! Application layer: **port definitions** (traits) and the rule engine
//! built on top of them.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `AutomationBackend` — hotkeys, synthetic input, windows, sound,
//!     processes and joystick axes
//!   - `CaptureDevice` — records one utterance at a time
//!   - `SpeechToText` — turns a clip into a transcript
//! - Provide the **type registries** that turn profile documents into live
//!   triggers, conditions and actions
//! - Run the **in-process infrastructure** shared by all triggers: the
//!   phrase dispatcher (listener workers + fuzzy routing) and the axis
//!   sampler
//! - Load and save **profiles** as JSON or YAML, by path or by name
//! - Keep the **profile library**: named profiles, one of them active
//!
//! ## Dependency rule
//! Depends on `vocom-domain` only (plus `crossbeam-channel` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action;
pub mod axis_sampler;
pub mod codec;
pub mod condition;
pub mod context;
pub mod dispatcher;
pub mod library;
pub mod ports;
pub mod profile;
pub mod registry;
pub mod rules;
pub mod trigger;

mod sync;
mod ticker;

#[cfg(test)]
mod testing;

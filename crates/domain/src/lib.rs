//! # vocom-domain
//!
//! Pure domain model for the vocom automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the persisted **profile document** (triggers, actions, conditions)
//! - Define **config maps** and the typed argument view handed to factories
//! - Define **axis modes** and the debounced edge detector
//! - Define **phrase** normalisation and fuzzy best-match scoring
//! - Define **window criteria** shared by window conditions and actions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod arguments;
pub mod axis;
pub mod document;
pub mod phrase;
pub mod window;

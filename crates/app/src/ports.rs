//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engine and the outside world: the
//! desktop automation backend, the audio capture device and the
//! speech-to-text service. They are defined here (in `app`) so that both the
//! engine and the adapter layer can depend on them without creating circular
//! dependencies.
//!
//! All ports are synchronous: the engine runs on plain OS threads.

pub mod backend;
pub mod capture;
pub mod speech;

pub use backend::{AutomationBackend, HotkeyCallback};
pub use capture::{AudioClip, CaptureDevice};
pub use speech::SpeechToText;

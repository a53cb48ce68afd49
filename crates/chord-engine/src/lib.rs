//! Chord matching and activation-state engine.
//!
//! This crate is the core of playkey: it decides, for each normalized
//! press/release event, whether the event completes a primary hotkey, a
//! sub-hotkey of a currently-held primary, or nothing, and it tracks which
//! primaries are held so chords like "hold A, press B" resolve correctly.
//!
//! Public surface:
//! - [`Registry`] and [`HotkeyBinding`]: the configured hotkey set
//! - [`Engine`]: the per-event matching state machine
//! - [`Dispatcher`] / [`EventSender`]: the serialization boundary between
//!   concurrent backend workers and the engine

mod dispatch;
mod engine;
mod error;
mod event;
mod registry;

pub use dispatch::{Dispatcher, EventSender};
pub use engine::Engine;
pub use error::ActionError;
pub use event::{action, Action, DeviceClass, EventKind, KeyEvent, Modifiers};
pub use registry::{HotkeyBinding, Registry};

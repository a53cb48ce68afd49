//! Normalized input events and the types they are built from.

use std::{fmt, sync::Arc};

use crate::error::ActionError;

/// Identifies which input backend (and, for evdev, which device) an event or
/// binding belongs to. Bindings with different device classes never match the
/// same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Keyboard events from any configured X11 display.
    X11Keyboard,
    /// Mouse button events from any configured X11 display.
    X11Mouse,
    /// A raw input device, numbered by its position in the listen config.
    Evdev(u16),
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X11Keyboard => write!(f, "x11kb"),
            Self::X11Mouse => write!(f, "x11m"),
            Self::Evdev(n) => write!(f, "evdev{}", n),
        }
    }
}

/// Modifier requirement of a binding: an exact mask or "match anything".
///
/// The mask uses X11 state-field bits (shift=1, ctrl=4, alt=8); the evdev
/// backend synthesizes the same bits so bindings mean the same thing on
/// either backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifiers {
    /// Wildcard: matches any incoming modifier state.
    Any,
    /// Matches only this exact modifier mask.
    Only(u16),
}

impl Modifiers {
    /// The single matching rule used by registry lookup, sub-key search and
    /// activation-entry removal.
    pub fn matches(self, state: u16) -> bool {
        match self {
            Self::Any => true,
            Self::Only(mask) => mask == state,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Only(mask) => write!(f, "{}", mask),
        }
    }
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key or button went down (includes autorepeat on backends that emit it).
    Press,
    /// Key or button went up.
    Release,
}

/// A normalized input event as produced by a backend worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Originating backend/device.
    pub device: DeviceClass,
    /// Raw key or button code; meaning is defined by the device class.
    pub code: u32,
    /// Modifier state at the time of the event.
    pub modifiers: u16,
    /// Press or release.
    pub kind: EventKind,
}

impl KeyEvent {
    /// Build a press event.
    pub fn press(device: DeviceClass, code: u32, modifiers: u16) -> Self {
        Self {
            device,
            code,
            modifiers,
            kind: EventKind::Press,
        }
    }

    /// Build a release event.
    pub fn release(device: DeviceClass, code: u32, modifiers: u16) -> Self {
        Self {
            device,
            code,
            modifiers,
            kind: EventKind::Release,
        }
    }
}

/// An opaque hotkey action. Invoked at most once per matched event, always
/// from the dispatcher task, never concurrently with another action.
pub type Action = Arc<dyn Fn() -> Result<(), ActionError> + Send + Sync>;

/// Wrap a closure as an [`Action`].
pub fn action<F>(f: F) -> Action
where
    F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

//! Error types for configuration loading and resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, parsing, or resolving a configuration.
///
/// All of these are fatal at startup: the daemon must not enter its run loop
/// with a partially resolved registry.
#[derive(Debug, Error)]
pub enum Error {
    /// The config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No config file was found at any candidate location.
    #[error("no config found; create {} or pass --config", path.display())]
    NotFound {
        /// The preferred default path.
        path: PathBuf,
    },

    /// The config file is not valid RON.
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// An event binding references a key name that was never defined.
    #[error("event \"{event}\" references undefined key \"{key}\"")]
    UndefinedKey {
        /// The unresolved key name.
        key: String,
        /// The event whose binding used it.
        event: String,
    },

    /// A key definition names a device string the daemon does not know.
    #[error("key \"{key}\" uses unknown device \"{device}\" (expected x11kb, x11m, or evdev<N>)")]
    UnknownDevice {
        /// The offending device string.
        device: String,
        /// The key definition it appeared in.
        key: String,
    },

    /// The listen section declares no input sources at all.
    #[error("config declares no input sources; add listen.x11 or listen.evdev entries")]
    NoListeners,
}

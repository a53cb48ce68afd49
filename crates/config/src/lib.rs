//! Configuration for the playkey daemon.
//!
//! The config file is RON. It declares the input sources to listen on, named
//! key definitions (a name may map to several physical keys across devices),
//! and event bindings that attach playback events to single keys or two-key
//! chords written as `"main+sub"`:
//!
//! ```ron
//! (
//!     listen: (
//!         x11: ["default"],
//!         evdev: ["/dev/input/event1"],
//!     ),
//!     keys: {
//!         "playbtn": [(device: "x11kb", code: 162)],
//!         "nextbtn": [(device: "x11kb", code: 163, modifiers: Some(0))],
//!     },
//!     events: [
//!         (playpause, "playbtn"),
//!         (skipnext, "playbtn+nextbtn"),
//!     ],
//! )
//! ```
//!
//! A key spec without `modifiers` matches any modifier state. Event bindings
//! resolve in declaration order; that order decides between overlapping
//! bindings, so it is preserved all the way into the registry.

use std::{
    collections::HashMap,
    env, fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

mod error;
mod resolve;

pub use error::Error;
pub use resolve::{resolve, ResolvedBinding};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input sources to listen on.
    #[serde(default)]
    pub listen: Listen,
    /// Relative seek distance in milliseconds.
    #[serde(default = "default_seek_step")]
    pub seek_step: u32,
    /// Volume change step in percent.
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    /// Log the raw code of every key press (evdev sources only).
    #[serde(default)]
    pub show_keycodes: bool,
    /// Named key definitions.
    #[serde(default)]
    pub keys: HashMap<String, Vec<KeySpec>>,
    /// Event bindings, in declaration order.
    #[serde(default)]
    pub events: Vec<(PlaybackEvent, String)>,
}

fn default_seek_step() -> u32 {
    5000
}

fn default_volume_step() -> u8 {
    5
}

impl Config {
    /// Reject configurations with nothing to listen on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.listen.x11.is_empty() && self.listen.evdev.is_empty() {
            return Err(Error::NoListeners);
        }
        Ok(())
    }
}

/// Input sources to open at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Listen {
    /// X11 display names; `"default"` means the `DISPLAY` environment.
    #[serde(default)]
    pub x11: Vec<String>,
    /// Paths of evdev device nodes, e.g. `/dev/input/event3`. The position in
    /// this list is the device's class index (`evdev0`, `evdev1`, ...).
    #[serde(default)]
    pub evdev: Vec<String>,
}

/// One physical key or button a key name maps to.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeySpec {
    /// Device string: `"x11kb"`, `"x11m"`, or `"evdev<N>"`.
    pub device: String,
    /// Raw key/button code on that device.
    pub code: u32,
    /// Exact modifier mask, or `None` to match any modifier state.
    #[serde(default)]
    pub modifiers: Option<u16>,
}

/// Playback events a chord can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackEvent {
    /// Start playback.
    Play,
    /// Stop playback.
    Stop,
    /// Pause playback.
    Pause,
    /// Toggle between playing and paused.
    PlayPause,
    /// Seek forward by `seek_step` milliseconds.
    SeekFwd,
    /// Seek backward by `seek_step` milliseconds.
    SeekBack,
    /// Skip to the next track.
    SkipNext,
    /// Skip to the previous track.
    SkipPrev,
    /// Raise volume by `volume_step` percent.
    VolUp,
    /// Lower volume by `volume_step` percent.
    VolDown,
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "play",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::PlayPause => "playpause",
            Self::SeekFwd => "seekfwd",
            Self::SeekBack => "seekback",
            Self::SkipNext => "skipnext",
            Self::SkipPrev => "skipprev",
            Self::VolUp => "volup",
            Self::VolDown => "voldown",
        };
        f.write_str(name)
    }
}

/// Preferred user config path: `~/.config/playkey/config.ron`.
pub fn default_config_path() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from).unwrap_or_else(|| {
        let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
        p.push(".config");
        p
    });
    base.join("playkey").join("config.ron")
}

/// Resolve the effective config path: an explicit `--config` wins, else the
/// default path when it exists, else a clear error.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let preferred = default_config_path();
    if preferred.exists() {
        return Ok(preferred);
    }
    Err(Error::NotFound { path: preferred })
}

/// Read and parse a config file.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = ron::from_str(&text)?;
    Ok(cfg)
}

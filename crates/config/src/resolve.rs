//! Resolution of named key references into registry-ready bindings.

use chord_engine::{DeviceClass, Modifiers};
use tracing::debug;

use crate::{Config, Error, KeySpec, PlaybackEvent};

/// One fully resolved binding, ready to hand to `Registry::register` in
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBinding {
    /// Backend/device the binding applies to.
    pub device: DeviceClass,
    /// Primary key code.
    pub code: u32,
    /// Modifier requirement.
    pub modifiers: Modifiers,
    /// Sub-key code for two-key chords.
    pub subcode: Option<u32>,
    /// The playback event this binding triggers.
    pub event: PlaybackEvent,
}

/// Parse a key spec's device string.
fn device_class(spec: &KeySpec, key: &str) -> Result<DeviceClass, Error> {
    match spec.device.as_str() {
        "x11kb" => Ok(DeviceClass::X11Keyboard),
        "x11m" => Ok(DeviceClass::X11Mouse),
        other => match other.strip_prefix("evdev").and_then(|n| n.parse::<u16>().ok()) {
            Some(index) => Ok(DeviceClass::Evdev(index)),
            None => Err(Error::UnknownDevice {
                device: spec.device.clone(),
                key: key.to_string(),
            }),
        },
    }
}

fn modifiers(spec: &KeySpec) -> Modifiers {
    match spec.modifiers {
        Some(mask) => Modifiers::Only(mask),
        None => Modifiers::Any,
    }
}

/// Look up a key name, converting absence into the fatal reference error.
fn key_defs<'a>(cfg: &'a Config, key: &str, event: PlaybackEvent) -> Result<&'a [KeySpec], Error> {
    cfg.keys
        .get(key)
        .map(Vec::as_slice)
        .ok_or_else(|| Error::UndefinedKey {
            key: key.to_string(),
            event: event.to_string(),
        })
}

/// Resolve every event binding to concrete `(device, code, modifiers,
/// subcode)` tuples, in declaration order.
///
/// A chord string `"main+sub"` expands to one binding per main key spec and
/// sub key spec pair that share a device class; specs on different device
/// classes never pair with each other.
pub fn resolve(cfg: &Config) -> Result<Vec<ResolvedBinding>, Error> {
    let mut out = Vec::new();

    for (event, chord) in &cfg.events {
        let (main_name, sub_name) = match chord.split_once('+') {
            Some((main, sub)) => (main, Some(sub)),
            None => (chord.as_str(), None),
        };

        let main_defs = key_defs(cfg, main_name, *event)?;
        let sub_defs = match sub_name {
            Some(name) => Some(key_defs(cfg, name, *event)?),
            None => None,
        };

        for main in main_defs {
            let device = device_class(main, main_name)?;
            match sub_defs {
                Some(subs) => {
                    for sub in subs {
                        if device_class(sub, sub_name.unwrap_or_default())? == device {
                            out.push(ResolvedBinding {
                                device,
                                code: main.code,
                                modifiers: modifiers(main),
                                subcode: Some(sub.code),
                                event: *event,
                            });
                        }
                    }
                }
                None => out.push(ResolvedBinding {
                    device,
                    code: main.code,
                    modifiers: modifiers(main),
                    subcode: None,
                    event: *event,
                }),
            }
        }
    }

    debug!(bindings = out.len(), "resolved event bindings");
    Ok(out)
}

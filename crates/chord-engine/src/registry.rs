//! Configured hotkey bindings and registry construction.

use tracing::{debug, warn};

use crate::event::{Action, DeviceClass, Modifiers};

/// A configured chord entry: a primary hotkey or one of its sub-hotkeys.
///
/// Primaries may carry an action, a list of sub-bindings, or both. A primary
/// without an action exists only to host sub-bindings (a placeholder created
/// when a sub-key was declared before its parent). Sub-bindings never nest
/// further; chords are at most two levels deep.
#[derive(Clone)]
pub struct HotkeyBinding {
    /// Backend/device this binding applies to.
    pub device: DeviceClass,
    /// Key or button code, interpreted by the device class.
    pub code: u32,
    /// Modifier requirement.
    pub modifiers: Modifiers,
    /// Action to invoke when this binding matches a press.
    pub action: Option<Action>,
    /// Sub-bindings, meaningful only while this primary is held.
    pub subkeys: Vec<HotkeyBinding>,
}

impl std::fmt::Debug for HotkeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyBinding")
            .field("device", &self.device)
            .field("code", &self.code)
            .field("modifiers", &self.modifiers)
            .field("action", &self.action.is_some())
            .field("subkeys", &self.subkeys.len())
            .finish()
    }
}

/// First-match-wins search over an ordered binding list.
///
/// An entry matches when its device and code are equal and its modifier
/// requirement is wildcard or equal to the probe. Registration order decides
/// between overlapping wildcard/specific entries; that ordering policy is
/// deliberate, not an error.
pub(crate) fn search(
    bindings: &[HotkeyBinding],
    device: DeviceClass,
    code: u32,
    probe: Modifiers,
) -> Option<usize> {
    bindings.iter().position(|b| {
        b.device == device && b.code == code && (b.modifiers == Modifiers::Any || b.modifiers == probe)
    })
}

/// The set of configured primary hotkeys, built once at startup and read-only
/// during the run.
#[derive(Default)]
pub struct Registry {
    bindings: Vec<HotkeyBinding>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one resolved binding.
    ///
    /// With `subcode == None` this declares a primary hotkey; with
    /// `subcode == Some(c)` it declares a sub-hotkey `c` under the primary
    /// `(device, code, modifiers)`, creating a placeholder parent if that
    /// primary has not been declared yet. Registration never fails:
    /// duplicate primaries with distinct actions keep the first action and
    /// log a warning.
    pub fn register(
        &mut self,
        device: DeviceClass,
        code: u32,
        modifiers: Modifiers,
        subcode: Option<u32>,
        action: Action,
    ) {
        let found = search(&self.bindings, device, code, modifiers);
        match (found, subcode) {
            (Some(idx), Some(sub)) => {
                // New sub-hotkey under an existing primary.
                self.bindings[idx].subkeys.push(HotkeyBinding {
                    device,
                    code: sub,
                    modifiers,
                    action: Some(action),
                    subkeys: Vec::new(),
                });
                debug!(%device, code, sub, "added subkey under existing primary");
            }
            (Some(idx), None) => {
                let entry = &mut self.bindings[idx];
                if entry.action.is_some() {
                    warn!(
                        %device,
                        code,
                        mods = %modifiers,
                        "duplicate hotkey declaration; keeping the first action"
                    );
                } else {
                    // Placeholder created earlier for a sub-key; fill in the
                    // action in place.
                    entry.action = Some(action);
                    debug!(%device, code, "attached action to placeholder primary");
                }
            }
            (None, Some(sub)) => {
                // Sub-key declared before its parent: insert a placeholder
                // primary carrying just this sub-binding.
                self.bindings.push(HotkeyBinding {
                    device,
                    code,
                    modifiers,
                    action: None,
                    subkeys: vec![HotkeyBinding {
                        device,
                        code: sub,
                        modifiers,
                        action: Some(action),
                        subkeys: Vec::new(),
                    }],
                });
                debug!(%device, code, sub, "added subkey under new placeholder primary");
            }
            (None, None) => {
                self.bindings.push(HotkeyBinding {
                    device,
                    code,
                    modifiers,
                    action: Some(action),
                    subkeys: Vec::new(),
                });
                debug!(%device, code, mods = %modifiers, "added primary hotkey");
            }
        }
    }

    /// All primary bindings in registration order.
    pub fn bindings(&self) -> &[HotkeyBinding] {
        &self.bindings
    }

    /// Find the first primary binding matching a concrete event.
    pub(crate) fn find(&self, device: DeviceClass, code: u32, state: u16) -> Option<&HotkeyBinding> {
        search(&self.bindings, device, code, Modifiers::Only(state)).map(|i| &self.bindings[i])
    }
}

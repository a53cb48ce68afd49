//! The chord matching engine and its activation state.

use tracing::{info, warn};

use crate::{
    event::{EventKind, KeyEvent, Modifiers},
    registry::{search, HotkeyBinding, Registry},
};

/// Interprets normalized events against the registry, tracking which primary
/// hotkeys are currently held so later presses can complete chords.
///
/// Not internally synchronized: the dispatch serializer owns the engine and
/// feeds it one event at a time.
pub struct Engine {
    registry: Registry,
    /// Snapshots of primaries currently considered held, in press order.
    active: Vec<HotkeyBinding>,
}

impl Engine {
    /// Build an engine over a fully constructed registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            active: Vec::new(),
        }
    }

    /// Apply one normalized event.
    pub fn handle(&mut self, event: KeyEvent) {
        match event.kind {
            EventKind::Press => self.on_press(event),
            EventKind::Release => self.on_release(event),
        }
    }

    /// Number of primaries currently held. Diagnostic accessor.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn on_press(&mut self, ev: KeyEvent) {
        let primary = self.registry.find(ev.device, ev.code, ev.modifiers);

        if let Some(hk) = primary {
            if hk.action.is_some() {
                info!(device = %ev.device, code = ev.code, "matched primary hotkey");
                invoke(hk);
            }

            // A lone primary press becomes the chord root for whatever
            // follows. When other primaries are already held, fall through:
            // this press may instead complete one of their chords, which is
            // what lets a key double as both primary and sub-key.
            if self.active.is_empty() {
                let snapshot = hk.clone();
                self.active.push(snapshot);
                return;
            }
        }

        for held in &self.active {
            if let Some(idx) = search(&held.subkeys, ev.device, ev.code, Modifiers::Only(ev.modifiers))
            {
                let sub = &held.subkeys[idx];
                info!(
                    device = %ev.device,
                    code = ev.code,
                    parent = held.code,
                    "matched sub-hotkey"
                );
                invoke(sub);
                // A sub-hotkey press never becomes an activation entry.
                return;
            }
        }

        if let Some(hk) = primary {
            // No sub-binding consumed the press; hold this primary too so its
            // own sub-keys resolve from now on, unless it is already held.
            if search(&self.active, ev.device, ev.code, Modifiers::Only(ev.modifiers)).is_none() {
                let snapshot = hk.clone();
                self.active.push(snapshot);
            }
        }
    }

    fn on_release(&mut self, ev: KeyEvent) {
        // First match only. If a wildcard entry and a specific entry for the
        // same key are both held, this can remove the wrong one; the overlap
        // has no defined intent, so the behavior is left as-is.
        if let Some(idx) = search(&self.active, ev.device, ev.code, Modifiers::Only(ev.modifiers)) {
            self.active.remove(idx);
        }
    }
}

/// Invoke a binding's action, containing any failure it reports.
fn invoke(binding: &HotkeyBinding) {
    if let Some(act) = &binding.action {
        if let Err(e) = act() {
            warn!(code = binding.code, error = %e, "hotkey action failed");
        }
    }
}

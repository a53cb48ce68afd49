//! Raw input device (evdev) event source.
//!
//! One worker thread per configured device node runs a blocking read loop and
//! converts kernel input events into normalized engine events. evdev reports
//! no keyboard state, so each worker tracks its own shift/ctrl/alt mask using
//! the same bit layout X11 uses, and scroll-wheel motion is mapped to
//! synthetic momentary button codes so wheels can participate in bindings.

use std::{io, thread, time::Duration};

use evdev::{Device, InputEvent, InputEventKind, Key, RelativeAxisType};
use tracing::{error, info, warn};

use chord_engine::{DeviceClass, EventSender, KeyEvent};

/// Seconds to wait between attempts to reopen a lost device.
const REOPEN_DELAY: Duration = Duration::from_secs(1);

/// Synthetic codes for relative-axis (wheel) events start here, above any
/// real key code the kernel can report.
const WHEEL_CODE_BASE: u32 = 0x1000;

/// Spawn the worker thread for one device node.
///
/// The device is opened on the caller's thread so a missing or unreadable
/// node surfaces as a startup error for this source alone; the daemon keeps
/// running with its other sources.
pub fn spawn(
    index: u16,
    path: &str,
    show_keycodes: bool,
    tx: EventSender,
) -> io::Result<thread::JoinHandle<()>> {
    let device = Device::open(path)?;
    info!(index, path, "opened evdev device");
    let path = path.to_string();
    thread::Builder::new()
        .name(format!("evdev{}", index))
        .spawn(move || run(index, &path, device, show_keycodes, &tx))
}

/// Blocking read loop with reconnect-on-loss.
fn run(index: u16, path: &str, device: Device, show_keycodes: bool, tx: &EventSender) {
    let mut device = Some(device);
    let mut mask: u16 = 0;

    loop {
        if device.is_none() {
            match Device::open(path) {
                Ok(d) => {
                    info!(index, path, "reopened evdev device");
                    device = Some(d);
                }
                Err(_) => {
                    thread::sleep(REOPEN_DELAY);
                    continue;
                }
            }
        }
        let Some(dev) = device.as_mut() else {
            continue;
        };

        let lost = match dev.fetch_events() {
            Ok(events) => {
                let batch: Vec<InputEvent> = events.collect();
                for ev in batch {
                    if !process(index, ev, &mut mask, show_keycodes, tx) {
                        return;
                    }
                }
                false
            }
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                warn!(index, path, "lost evdev device; retrying open");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return,
            Err(e) => {
                error!(index, path, error = %e, "read failed; stopping this source");
                return;
            }
        };
        if lost {
            device = None;
        }
    }
}

/// Translate one kernel event. Returns false when the dispatcher is gone and
/// the worker should exit.
fn process(index: u16, ev: InputEvent, mask: &mut u16, show_keycodes: bool, tx: &EventSender) -> bool {
    let device = DeviceClass::Evdev(index);
    match ev.kind() {
        InputEventKind::RelAxis(axis) => {
            // Plain pointer motion is high-volume noise; only wheel-like axes
            // become synthetic buttons.
            if axis == RelativeAxisType::REL_X || axis == RelativeAxisType::REL_Y {
                return true;
            }
            let code = wheel_code(u32::from(ev.code()), ev.value());
            if show_keycodes {
                info!(index, code, "key pressed");
            }
            // Wheels cannot be held, so emit an immediate press/release pair.
            tx.send(KeyEvent::press(device, code, *mask))
                && tx.send(KeyEvent::release(device, code, *mask))
        }
        InputEventKind::Key(key) => {
            let code = u32::from(ev.code());
            let sent = match ev.value() {
                0 => tx.send(KeyEvent::release(device, code, *mask)),
                // 1 is a press, 2 kernel autorepeat; both flow through as
                // presses, as they did upstream.
                1 | 2 => {
                    if show_keycodes {
                        info!(index, code, "key pressed");
                    }
                    tx.send(KeyEvent::press(device, code, *mask))
                }
                _ => true,
            };
            // State updates apply after the event itself, so a modifier's own
            // press is reported with the mask it was pressed under.
            if ev.value() < 2 {
                *mask = update_mask(*mask, key, ev.value());
            }
            sent
        }
        _ => true,
    }
}

/// Map a wheel event to its synthetic momentary button code.
///
/// Each axis gets a pair of codes: one for each scroll direction.
fn wheel_code(axis_code: u32, value: i32) -> u32 {
    let mut code = WHEEL_CODE_BASE + axis_code * 2;
    if value > 0 {
        code += 1;
    }
    code
}

/// Fold a modifier key press/release into the synthetic X11-style mask
/// (shift = bit 0, ctrl = bit 2, alt = bit 3).
fn update_mask(mask: u16, key: Key, value: i32) -> u16 {
    let pressed = (value & 1) as u16;
    match key {
        Key::KEY_LEFTSHIFT | Key::KEY_RIGHTSHIFT => (mask & !1) | pressed,
        Key::KEY_LEFTCTRL | Key::KEY_RIGHTCTRL => (mask & !(1 << 2)) | (pressed << 2),
        Key::KEY_LEFTALT | Key::KEY_RIGHTALT => (mask & !(1 << 3)) | (pressed << 3),
        _ => mask,
    }
}

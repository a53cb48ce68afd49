//! X11 event source: root-window grabs plus a blocking event loop.
//!
//! One worker thread per configured display. Only primary hotkeys are
//! grabbed; while a grabbed combination is held the X server delivers the
//! whole device's events to us, which is exactly what lets sub-keys of an
//! active chord arrive without their own grabs.

use std::{io, thread};

use thiserror::Error;
use tracing::{error, info, warn};
use x11rb::{
    connection::Connection,
    errors::ConnectError,
    protocol::{
        xproto::{self, ButtonIndex, EventMask, GrabMode, ModMask, Window},
        Event,
    },
    rust_connection::RustConnection,
};

use chord_engine::{DeviceClass, EventSender, KeyEvent, Modifiers};

/// One grab to establish on the display: a primary binding's key or button.
#[derive(Debug, Clone, Copy)]
pub struct Grab {
    /// `X11Keyboard` or `X11Mouse`; other classes are ignored by this
    /// backend.
    pub device: DeviceClass,
    /// Keycode or button number.
    pub code: u32,
    /// Modifier requirement; wildcard maps to `AnyModifier`.
    pub modifiers: Modifiers,
}

/// Errors that prevent an X11 worker from starting.
#[derive(Debug, Error)]
pub enum Error {
    /// The display could not be opened.
    #[error("cannot open X11 display: {0}")]
    Connect(#[from] ConnectError),
    /// The worker thread could not be spawned.
    #[error("cannot spawn X11 worker: {0}")]
    Spawn(#[from] io::Error),
}

/// Spawn the worker thread for one display.
///
/// `display` is an X display string, or `"default"` for `$DISPLAY`. The
/// connection is opened on the caller's thread so a dead display surfaces as
/// a startup error for this source alone.
pub fn spawn(display: &str, grabs: Vec<Grab>, tx: EventSender) -> Result<thread::JoinHandle<()>, Error> {
    let dpy = (display != "default").then_some(display);
    let (conn, screen_num) = x11rb::connect(dpy)?;
    // Bound to a new name: tracing's macro expansion shadows locals named
    // `display`, so the variable itself cannot appear inside the macro.
    let display_name = display;
    info!(display = display_name, "opened X11 display");

    let name = format!("x11-{}", display);
    let handle = thread::Builder::new()
        .name(name)
        .spawn(move || run(conn, screen_num, &grabs, &tx))?;
    Ok(handle)
}

fn run(conn: RustConnection, screen_num: usize, grabs: &[Grab], tx: &EventSender) {
    let root = conn.setup().roots[screen_num].root;
    grab_all(&conn, root, grabs);

    loop {
        match conn.wait_for_event() {
            Ok(Event::KeyPress(e)) => {
                let ev = KeyEvent::press(DeviceClass::X11Keyboard, u32::from(e.detail), u16::from(e.state));
                if !tx.send(ev) {
                    return;
                }
            }
            Ok(Event::KeyRelease(e)) => {
                let ev =
                    KeyEvent::release(DeviceClass::X11Keyboard, u32::from(e.detail), u16::from(e.state));
                if !tx.send(ev) {
                    return;
                }
            }
            Ok(Event::ButtonPress(e)) => {
                let ev = KeyEvent::press(DeviceClass::X11Mouse, u32::from(e.detail), u16::from(e.state));
                if !tx.send(ev) {
                    return;
                }
            }
            Ok(Event::ButtonRelease(e)) => {
                let ev =
                    KeyEvent::release(DeviceClass::X11Mouse, u32::from(e.detail), u16::from(e.state));
                if !tx.send(ev) {
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "X11 connection lost; stopping this source");
                return;
            }
        }
    }
}

/// Establish all grabs, logging conflicts without giving up: a binding held
/// by another client disables that binding only.
fn grab_all(conn: &RustConnection, root: Window, grabs: &[Grab]) {
    for grab in grabs {
        let mods = match grab.modifiers {
            Modifiers::Any => ModMask::ANY,
            Modifiers::Only(mask) => ModMask::from(mask),
        };
        match grab.device {
            DeviceClass::X11Keyboard => {
                let Ok(code) = u8::try_from(grab.code) else {
                    warn!(code = grab.code, "keycode out of X11 range; skipping grab");
                    continue;
                };
                info!(code, "grabbing X11 key");
                match xproto::grab_key(conn, true, root, mods, code, GrabMode::ASYNC, GrabMode::ASYNC) {
                    Ok(cookie) => {
                        if let Err(e) = cookie.check() {
                            warn!(code, error = %e, "XGrabKey failed; binding may be held by another client");
                        }
                    }
                    Err(e) => warn!(code, error = %e, "XGrabKey send failed"),
                }
            }
            DeviceClass::X11Mouse => {
                let Ok(button) = u8::try_from(grab.code) else {
                    warn!(code = grab.code, "button out of X11 range; skipping grab");
                    continue;
                };
                info!(button, "grabbing X11 button");
                let result = xproto::grab_button(
                    conn,
                    true,
                    root,
                    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                    x11rb::NONE,
                    x11rb::NONE,
                    ButtonIndex::from(button),
                    mods,
                );
                match result {
                    Ok(cookie) => {
                        if let Err(e) = cookie.check() {
                            warn!(button, error = %e, "XGrabButton failed; binding may be held by another client");
                        }
                    }
                    Err(e) => warn!(button, error = %e, "XGrabButton send failed"),
                }
            }
            DeviceClass::Evdev(_) => {}
        }
    }
    if let Err(e) = conn.flush() {
        warn!(error = %e, "flush after grabs failed");
    }
}

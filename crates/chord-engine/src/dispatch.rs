//! The dispatch serializer: a single consumer applying events in order.
//!
//! Backend workers run blocking read loops on their own OS threads and push
//! normalized events through an unbounded channel. One async task owns the
//! [`Engine`] and drains the channel, so exactly one press/release (and its
//! action, if any) is applied at a time across the whole process. Order is
//! preserved per source; no ordering is promised between sources.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::{engine::Engine, event::KeyEvent};

/// Cloneable handle backend workers use to submit events.
#[derive(Clone)]
pub struct EventSender {
    tx: UnboundedSender<KeyEvent>,
}

impl EventSender {
    /// Submit an event. Returns false when the dispatcher has shut down,
    /// which a worker should treat as its cue to exit.
    pub fn send(&self, event: KeyEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// The consuming side of the serializer.
pub struct Dispatcher {
    engine: Engine,
    rx: UnboundedReceiver<KeyEvent>,
}

impl Dispatcher {
    /// Create a dispatcher around an engine, returning the sender handle for
    /// backend workers.
    pub fn new(engine: Engine) -> (Self, EventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { engine, rx }, EventSender { tx })
    }

    /// Drain events until every sender is dropped.
    ///
    /// Actions run inline here; a slow action stalls all further hotkey
    /// processing, which is accepted behavior rather than something to
    /// engineer around.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.engine.handle(event);
        }
        debug!("all event sources closed; dispatcher exiting");
    }

    /// Apply any already-queued events without waiting. Test support.
    #[cfg(test)]
    pub(crate) fn drain_now(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.engine.handle(event);
        }
    }

    /// Access the engine. Test support.
    #[cfg(test)]
    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }
}

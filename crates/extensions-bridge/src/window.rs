//! Windows that accept posted messages and fan them out to listeners.

use std::sync::Arc;

use dashmap::DashMap;
use mailassist_core_types::FrameId;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::message::BoundaryMessage;

/// A posted payload and the frame that posted it.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub source: FrameId,
    pub data: Value,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Message target of one document, like `window.postMessage`.
///
/// Delivery is at-most-once: a payload posted while nobody listens is dropped.
#[derive(Clone, Default)]
pub struct MessageWindow {
    listeners: Arc<DashMap<ListenerId, mpsc::UnboundedSender<Envelope>>>,
}

impl MessageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a listener; it stays attached until removed or dropped.
    pub fn add_listener(&self) -> BoundaryListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ListenerId::new();
        self.listeners.insert(id, tx);
        trace!(listener = ?id, "listener attached");
        BoundaryListener {
            id,
            rx,
            window: self.clone(),
        }
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            trace!(listener = ?id, "listener detached");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Posts a raw payload, returning how many listeners received it.
    pub fn post(&self, source: FrameId, data: Value) -> usize {
        let envelope = Envelope { source, data };
        self.listeners
            .iter()
            .filter(|entry| entry.value().send(envelope.clone()).is_ok())
            .count()
    }

    pub fn post_message(&self, source: FrameId, message: &BoundaryMessage) -> usize {
        self.post(source, message.to_value())
    }
}

/// Receiving end of one attached listener.
///
/// Dropping it detaches it from the window.
pub struct BoundaryListener {
    id: ListenerId,
    rx: mpsc::UnboundedReceiver<Envelope>,
    window: MessageWindow,
}

impl BoundaryListener {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next valid message; invalid payloads are logged and skipped.
    ///
    /// Returns `None` once the listener has been detached and drained.
    pub async fn next(&mut self) -> Option<(FrameId, BoundaryMessage)> {
        while let Some(envelope) = self.rx.recv().await {
            match BoundaryMessage::decode(&envelope.data) {
                Ok(message) => return Some((envelope.source, message)),
                Err(err) => {
                    warn!(source = %envelope.source, %err, "rejected boundary message");
                }
            }
        }
        None
    }
}

impl Drop for BoundaryListener {
    fn drop(&mut self) {
        self.window.remove_listener(self.id);
    }
}

//! Event Bus - normal delivery path for gateway events
//!
//! The EventBus uses a tokio broadcast channel to deliver every dispatched event
//! to its ordinary subscribers. It knows nothing about waits; the interceptor
//! wraps it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use super::traits::Dispatcher;
use crate::event::Payload;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A named event as ordinary subscribers see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub name: String,
    pub args: Payload,
}

/// Broadcast delivery to persistent subscribers
///
/// This is fire-and-forget: with no subscribers the event is dropped, and a
/// lagging subscriber loses the oldest events.
pub struct EventBus {
    tx: broadcast::Sender<GatewayEvent>,
    channel_capacity: usize,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            channel_capacity: capacity,
        }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an event bus wrapped in an Arc for shared ownership
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: GatewayEvent) {
        debug!(event = %event.name, args = event.args.len(), "EventBus::emit");
        // Ignore send errors (no subscribers is OK)
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.channel_capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl Dispatcher for EventBus {
    fn deliver(&self, name: &str, args: Payload) {
        self.emit(GatewayEvent {
            name: name.to_string(),
            args,
        });
    }
}

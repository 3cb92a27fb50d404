//! WaitSlot - one single-use wait attempt

use std::fmt;

use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use super::table::WaitRegistry;
use crate::error::{WaitError, WaitResult};
use crate::event::Payload;

/// Unique identifier of a wait slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(Uuid);

impl SlotId {
    pub(crate) fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a wait slot
///
/// A slot leaves `Pending` at most once, either to `Resolved` or to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Resolved,
    Cancelled,
}

/// Receiving side of a single wait attempt
///
/// Owned by the wait call that registered it. The registry only keeps the
/// sending half, so a resolved slot is already gone from the registry. Dropping
/// a slot that is still pending removes it from the registry.
pub struct WaitSlot {
    id: SlotId,
    event: String,
    rx: oneshot::Receiver<Payload>,
    state: SlotState,
    registry: WaitRegistry,
}

impl WaitSlot {
    pub(crate) fn new(id: SlotId, event: String, rx: oneshot::Receiver<Payload>, registry: WaitRegistry) -> Self {
        Self {
            id,
            event,
            rx,
            state: SlotState::Pending,
            registry,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Wait for the slot to be completed by a dispatch
    ///
    /// Cancel safe: dropping the returned future leaves the slot pending, so it
    /// can be passed to `tokio::time::timeout` and cancelled afterwards.
    pub async fn recv(&mut self) -> WaitResult<Payload> {
        if self.state != SlotState::Pending {
            debug!(slot = %self.id, state = ?self.state, "WaitSlot::recv: slot is not pending");
            return Err(WaitError::Closed {
                event: self.event.clone(),
            });
        }

        match (&mut self.rx).await {
            Ok(args) => {
                debug!(slot = %self.id, event = %self.event, args = args.len(), "WaitSlot::recv: resolved");
                self.state = SlotState::Resolved;
                Ok(args)
            }
            Err(_) => {
                // Sender dropped without a value: the registry was cleared
                debug!(slot = %self.id, event = %self.event, "WaitSlot::recv: sender dropped");
                self.state = SlotState::Cancelled;
                Err(WaitError::Closed {
                    event: self.event.clone(),
                })
            }
        }
    }

    /// Cancel a pending slot and remove it from the registry
    ///
    /// Returns false if the slot had already left `Pending`.
    pub fn cancel(&mut self) -> bool {
        if self.state != SlotState::Pending {
            return false;
        }

        self.rx.close();
        if self.rx.try_recv().is_ok() {
            // Completed between the deadline firing and this call
            warn!(slot = %self.id, event = %self.event, "WaitSlot::cancel: discarding payload that raced the deadline");
        }
        self.state = SlotState::Cancelled;
        self.registry.remove(&self.event, self.id);
        true
    }
}

#[cfg(test)]
impl WaitSlot {
    pub(crate) fn close_receiver(&mut self) {
        self.rx.close();
    }

    pub(crate) fn try_take(&mut self) -> Option<Payload> {
        if self.state != SlotState::Pending {
            return None;
        }
        let args = self.rx.try_recv().ok()?;
        self.state = SlotState::Resolved;
        Some(args)
    }
}

impl fmt::Debug for WaitSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitSlot")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for WaitSlot {
    fn drop(&mut self) {
        if self.state == SlotState::Pending {
            debug!(slot = %self.id, event = %self.event, "WaitSlot::drop: abandoned while pending");
            self.cancel();
        }
    }
}

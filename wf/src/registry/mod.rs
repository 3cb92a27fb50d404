//! Pending waits, keyed by event name
//!
//! A [`WaitSlot`] is one single-use wait attempt. The [`WaitRegistry`] holds the
//! sending half of every pending slot, grouped per event name in registration
//! order, and is the only place that mutates that state:
//! - **register:** append a fresh slot under a name
//! - **resolve_all:** drain every slot for a name, then complete each one
//! - **remove:** drop a slot that timed out or was abandoned

mod slot;
mod table;

pub use slot::{SlotId, SlotState, WaitSlot};
pub use table::{RegistryMetrics, WaitRegistry};

//! WaitFor - single-shot waits on named gateway events
//!
//! A gateway pushes named events into a dispatcher. This crate turns that push
//! stream into a pull-based await: a caller suspends until the *next* event of
//! a given name that satisfies a check arrives, bounded by a deadline, and gets
//! the event's payload back.
//!
//! # Core Concepts
//!
//! - **One slot per attempt**: every wait attempt registers a fresh single-use
//!   slot; a rejected event re-arms with a new slot
//! - **Drain then complete**: a dispatch takes the whole pending list for a name
//!   before completing any slot, so late registrations wait for the next event
//! - **Absolute deadlines**: the timeout starts at the first call and is not
//!   restarted when a check rejects an event
//! - **Composition, not patching**: the intercepting dispatcher wraps the bus's
//!   dispatcher, and setup is idempotent per client
//!
//! # Modules
//!
//! - [`registry`] - wait slots and the per-event registry
//! - [`dispatch`] - dispatcher capability, event bus, and the interceptor
//! - [`coordinator`] - `wait_for` and the check/retry/deadline loop
//! - [`component`] - component model and `wait_for_component`
//! - [`client`] - per-client installation
//! - [`config`] - configuration types and loading
//! - [`error`] - error types

pub mod client;
pub mod component;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod registry;

// Re-export commonly used types
pub use client::{Client, SetupOptions, setup, setup_any};
pub use component::{
    ActionRow, Button, Component, ComponentFilter, ComponentInteraction, ComponentRef, Message, MessageRef, SelectMenu,
};
pub use config::WaitConfig;
pub use coordinator::{EventCheck, WaitCoordinator, check_async, check_fn};
pub use dispatch::{
    COMPONENT_EVENT, Dispatcher, EventBus, GatewayEvent, INTERACTION_CREATE_EVENT, InteractionKind,
    InterceptingDispatcher, interaction_event_name, synthetic_event_name,
};
pub use error::{WaitError, WaitResult};
pub use event::{EventData, Payload};
pub use registry::{RegistryMetrics, SlotId, SlotState, WaitRegistry, WaitSlot};

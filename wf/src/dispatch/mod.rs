//! Dispatch path between the gateway and the wait registry
//!
//! The gateway hands every inbound event to a [`Dispatcher`]. Installing wait
//! support wraps the client's dispatcher in an [`InterceptingDispatcher`]:
//!
//! ```text
//! gateway ──► InterceptingDispatcher::deliver(name, args)
//!                 │
//!                 ├──► inner dispatcher (EventBus subscribers, unchanged)
//!                 │
//!                 └──► WaitRegistry::resolve_all(name, args)
//!                           │
//!                           └──► WaitSlot completes, waiting task wakes
//! ```
//!
//! Raw interaction events are also re-dispatched under synthetic names derived
//! from their `type` discriminator, e.g. `on_message_component`.

mod bus;
mod interaction;
mod interceptor;
mod traits;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, GatewayEvent};
pub use interaction::{
    COMPONENT_EVENT, INTERACTION_CREATE_EVENT, InteractionKind, interaction_event_name, synthetic_event_name,
};
pub use interceptor::InterceptingDispatcher;
pub use traits::Dispatcher;

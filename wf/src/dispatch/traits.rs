//! Dispatcher capability

use serde_json::Value;

use crate::event::Payload;
use crate::registry::WaitRegistry;

/// Delivery entry point for named events
///
/// Called exactly once per inbound event. Implementations must not block.
pub trait Dispatcher: Send + Sync {
    /// Deliver an event to this dispatcher's listeners
    fn deliver(&self, name: &str, args: Payload);

    /// Entry point for a raw gateway event carrying one JSON object
    ///
    /// The default delivers it unchanged under its raw name.
    fn handle_raw(&self, event: &str, data: Value) {
        self.deliver(event, vec![data]);
    }

    /// Registry this dispatcher resolves waits against, if it intercepts
    ///
    /// Plain dispatchers return `None`; setup uses this to detect an already
    /// installed interceptor.
    fn wait_registry(&self) -> Option<&WaitRegistry> {
        None
    }
}

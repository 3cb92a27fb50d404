//! InterceptingDispatcher - offers every delivered event to the wait registry

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::interaction::{InteractionKind, interaction_event_name, synthetic_event_name};
use super::traits::Dispatcher;
use crate::config::WaitConfig;
use crate::event::Payload;
use crate::registry::WaitRegistry;

/// Dispatcher decorator that resolves pending waits
///
/// Ordinary listeners of the wrapped dispatcher see every event first and
/// unchanged; the registry is resolved afterwards with the same arguments.
pub struct InterceptingDispatcher {
    inner: Arc<dyn Dispatcher>,
    registry: WaitRegistry,
    interaction_events: bool,
    interaction_event: String,
    discriminator_field: String,
    synthetic_prefix: String,
}

impl InterceptingDispatcher {
    pub fn new(inner: Arc<dyn Dispatcher>, registry: WaitRegistry, config: &WaitConfig) -> Self {
        debug!(interaction_event = %config.interaction_event, "InterceptingDispatcher::new: called");
        Self {
            inner,
            registry,
            interaction_events: true,
            interaction_event: config.interaction_event.clone(),
            discriminator_field: config.discriminator_field.clone(),
            synthetic_prefix: config.synthetic_prefix.clone(),
        }
    }

    /// Enable or disable synthetic interaction events
    pub fn with_interaction_events(mut self, enabled: bool) -> Self {
        self.interaction_events = enabled;
        self
    }

    /// The wrapped dispatcher
    pub fn inner(&self) -> &Arc<dyn Dispatcher> {
        &self.inner
    }

    pub fn registry(&self) -> &WaitRegistry {
        &self.registry
    }

    fn derive_interaction_events(&self, data: &Value) {
        let Some(code) = data.get(&self.discriminator_field).and_then(Value::as_u64) else {
            debug!(field = %self.discriminator_field, "InterceptingDispatcher: interaction without discriminator");
            return;
        };

        let coarse = interaction_event_name(&self.synthetic_prefix);
        self.deliver(&coarse, vec![data.clone()]);

        match InteractionKind::from_code(code) {
            Some(kind) => {
                let name = synthetic_event_name(&self.synthetic_prefix, kind);
                debug!(%name, code, "InterceptingDispatcher: dispatching synthetic event");
                self.deliver(&name, vec![data.clone()]);
            }
            None => {
                debug!(code, "InterceptingDispatcher: unknown interaction kind");
            }
        }
    }
}

impl Dispatcher for InterceptingDispatcher {
    fn deliver(&self, name: &str, args: Payload) {
        self.inner.deliver(name, args.clone());
        self.registry.resolve_all(name, args);
    }

    fn handle_raw(&self, event: &str, data: Value) {
        self.inner.handle_raw(event, data.clone());
        self.registry.resolve_all(event, vec![data.clone()]);

        if self.interaction_events && event == self.interaction_event {
            self.derive_interaction_events(&data);
        }
    }

    fn wait_registry(&self) -> Option<&WaitRegistry> {
        Some(&self.registry)
    }
}

//! Client - owns the dispatcher and installs wait support
//!
//! Installation wraps the client's current dispatcher in an
//! [`InterceptingDispatcher`]. The client's own dispatcher slot is the only
//! record of whether that has happened, so two clients in one process never
//! share wait state.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::WaitConfig;
use crate::coordinator::WaitCoordinator;
use crate::dispatch::{Dispatcher, EventBus, InterceptingDispatcher};
use crate::error::{WaitError, WaitResult};
use crate::event::Payload;
use crate::registry::WaitRegistry;

/// Installation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupOptions {
    /// Re-dispatch raw interactions under synthetic names
    pub interaction_events: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            interaction_events: true,
        }
    }
}

/// A gateway client: the owner of the dispatcher events are delivered to
pub struct Client {
    dispatcher: Arc<dyn Dispatcher>,
    bus: Arc<EventBus>,
    config: WaitConfig,
}

impl Client {
    /// Create a client whose dispatcher is a plain event bus
    pub fn new(config: WaitConfig) -> Self {
        debug!(bus_capacity = config.bus_capacity, "Client::new: called");
        let bus = EventBus::shared(config.bus_capacity);
        Self {
            dispatcher: bus.clone(),
            bus,
            config,
        }
    }

    /// The bus ordinary subscribers listen on
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The currently installed dispatcher
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Whether wait support is installed on this client
    pub fn is_intercepting(&self) -> bool {
        self.dispatcher.wait_registry().is_some()
    }

    /// Deliver a named event through the installed dispatcher
    pub fn deliver(&self, name: &str, args: Payload) {
        self.dispatcher.deliver(name, args);
    }

    /// Feed a raw gateway event through the installed dispatcher
    pub fn handle_raw(&self, event: &str, data: Value) {
        self.dispatcher.handle_raw(event, data);
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(WaitConfig::default())
    }
}

/// Install wait support on `client` and return its coordinator
///
/// Idempotent: when the installed dispatcher already intercepts, the returned
/// coordinator shares its registry and nothing is wrapped again.
pub fn setup(client: &mut Client, options: SetupOptions) -> WaitResult<WaitCoordinator> {
    if let Some(registry) = client.dispatcher.wait_registry() {
        debug!("setup: client already intercepting, reusing registry");
        return Ok(WaitCoordinator::new(registry.clone(), client.config.clone()));
    }

    let registry = WaitRegistry::new();
    let interceptor = InterceptingDispatcher::new(client.dispatcher.clone(), registry.clone(), &client.config)
        .with_interaction_events(options.interaction_events);
    client.dispatcher = Arc::new(interceptor);

    info!(interaction_events = options.interaction_events, "Wait support installed");
    Ok(WaitCoordinator::new(registry, client.config.clone()))
}

/// Install wait support on a dynamically typed target
///
/// Fails with [`WaitError::Misuse`] unless the target is a [`Client`].
pub fn setup_any(target: &mut dyn Any, options: SetupOptions) -> WaitResult<WaitCoordinator> {
    match target.downcast_mut::<Client>() {
        Some(client) => setup(client, options),
        None => Err(WaitError::Misuse("setup target is not a Client".to_string())),
    }
}

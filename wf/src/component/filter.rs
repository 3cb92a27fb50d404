//! ComponentFilter - identifier sets turned into an event check

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;
use tracing::debug;

use super::model::{ComponentInteraction, ComponentRef, MessageRef};
use crate::coordinator::{EventCheck, WaitCoordinator};
use crate::dispatch::{InteractionKind, synthetic_event_name};
use crate::error::{WaitError, WaitResult};

/// Which component interactions a wait cares about
///
/// An empty set places no constraint on that identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    custom_ids: HashSet<String>,
    message_ids: HashSet<u64>,
}

impl ComponentFilter {
    pub fn new(components: Option<&ComponentRef>, messages: Option<&MessageRef>) -> Self {
        let custom_ids: HashSet<String> = components
            .map(ComponentRef::custom_ids)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let message_ids: HashSet<u64> = messages
            .map(MessageRef::message_ids)
            .unwrap_or_default()
            .into_iter()
            .collect();
        debug!(
            custom_ids = custom_ids.len(),
            message_ids = message_ids.len(),
            "ComponentFilter::new: called"
        );
        Self {
            custom_ids,
            message_ids,
        }
    }

    pub fn custom_ids(&self) -> &HashSet<String> {
        &self.custom_ids
    }

    pub fn message_ids(&self) -> &HashSet<u64> {
        &self.message_ids
    }

    /// Whether an interaction passes the identifier constraints
    pub fn matches(&self, interaction: &ComponentInteraction) -> bool {
        if !self.custom_ids.is_empty() && !self.custom_ids.contains(&interaction.custom_id) {
            return false;
        }
        if !self.message_ids.is_empty() {
            match interaction.message_id {
                Some(id) if self.message_ids.contains(&id) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Identifier constraints first, then the caller's check
struct FilteredCheck<'a> {
    filter: &'a ComponentFilter,
    check: Option<&'a dyn EventCheck>,
}

#[async_trait]
impl<'a> EventCheck for FilteredCheck<'a> {
    async fn check(&self, args: &[Value]) -> Result<bool> {
        let Some(first) = args.first() else {
            return Ok(false);
        };
        let interaction = match ComponentInteraction::from_value(first) {
            Ok(interaction) => interaction,
            Err(e) => {
                debug!(error = %e, "FilteredCheck: payload is not a component interaction");
                return Ok(false);
            }
        };
        if !self.filter.matches(&interaction) {
            debug!(custom_id = %interaction.custom_id, message_id = ?interaction.message_id, "FilteredCheck: rejected");
            return Ok(false);
        }
        match self.check {
            Some(check) => check.check(args).await,
            None => Ok(true),
        }
    }
}

impl WaitCoordinator {
    /// Wait for the next interaction with one of `components` on one of `messages`
    ///
    /// Either set may be omitted. `check` runs only for interactions that pass
    /// the identifier constraints and sees the same arguments as `wait_for`.
    pub async fn wait_for_component(
        &self,
        components: Option<ComponentRef>,
        messages: Option<MessageRef>,
        check: Option<&dyn EventCheck>,
        timeout: Option<Duration>,
    ) -> WaitResult<ComponentInteraction> {
        let filter = ComponentFilter::new(components.as_ref(), messages.as_ref());
        let filtered = FilteredCheck { filter: &filter, check };
        let event = synthetic_event_name(&self.config().synthetic_prefix, InteractionKind::MessageComponent);

        let args = self.wait_for_args(&event, Some(&filtered), timeout).await?;
        let first = args.first().ok_or_else(|| {
            WaitError::InvalidPayload(serde::de::Error::custom("component event carried no arguments"))
        })?;
        Ok(ComponentInteraction::from_value(first)?)
    }
}

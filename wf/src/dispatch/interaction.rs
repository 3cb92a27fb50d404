//! Interaction discriminators and synthetic event names

use serde::{Deserialize, Serialize};

/// Coarse synthetic event for every interaction, under the default `on_` prefix
///
/// Use [`interaction_event_name`] when the prefix is configured.
pub const INTERACTION_CREATE_EVENT: &str = "on_interaction_create";

/// Synthetic event for component interactions, under the default `on_` prefix
pub const COMPONENT_EVENT: &str = "on_message_component";

/// Interaction kinds, numbered as the gateway sends them in `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
}

impl InteractionKind {
    /// Look up a kind by its wire discriminator
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::ApplicationCommandAutocomplete => 4,
            Self::ModalSubmit => 5,
        }
    }

    /// Protocol name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::ApplicationCommand => "APPLICATION_COMMAND",
            Self::MessageComponent => "MESSAGE_COMPONENT",
            Self::ApplicationCommandAutocomplete => "APPLICATION_COMMAND_AUTOCOMPLETE",
            Self::ModalSubmit => "MODAL_SUBMIT",
        }
    }
}

/// Derive the synthetic event name for an interaction kind
///
/// `prefix` followed by the lower-cased protocol name, so
/// `MESSAGE_COMPONENT` becomes `on_message_component` with the default prefix.
pub fn synthetic_event_name(prefix: &str, kind: InteractionKind) -> String {
    format!("{}{}", prefix, kind.name().to_lowercase())
}

/// Coarse synthetic event name for every interaction
pub fn interaction_event_name(prefix: &str) -> String {
    format!("{prefix}interaction_create")
}

//! Waiting on component interactions
//!
//! Components (buttons, select menus, rows of them) and messages are reduced to
//! plain identifier sets; `wait_for_component` turns those sets into a check
//! over the `on_message_component` synthetic event.

mod filter;
mod model;

pub use filter::ComponentFilter;
pub use model::{ActionRow, Button, Component, ComponentInteraction, ComponentRef, Message, MessageRef, SelectMenu};

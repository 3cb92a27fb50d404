//! Component and message model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Deepest group nesting that is still flattened (a group of rows)
const MAX_GROUP_DEPTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub custom_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_button_style")]
    pub style: u8,
}

fn default_button_style() -> u8 {
    1
}

impl Button {
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: None,
            style: default_button_style(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    pub custom_id: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl SelectMenu {
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            placeholder: None,
            options: Vec::new(),
        }
    }
}

/// An interactive component that carries a custom id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Button(Button),
    SelectMenu(SelectMenu),
}

impl Component {
    pub fn custom_id(&self) -> &str {
        match self {
            Component::Button(button) => &button.custom_id,
            Component::SelectMenu(menu) => &menu.custom_id,
        }
    }
}

/// A row of components as laid out on a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn custom_ids(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(Component::custom_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(default)]
    pub channel_id: Option<u64>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub components: Vec<ActionRow>,
}

impl Message {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Anything that names one or more components to wait on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRef {
    Button(Button),
    SelectMenu(SelectMenu),
    ActionRow(ActionRow),
    CustomId(String),
    Group(Vec<ComponentRef>),
}

impl ComponentRef {
    /// Flatten into custom ids
    ///
    /// Rows always expand to their components. A group expands its items and a
    /// group inside a group expands once more; anything nested deeper is ignored.
    pub fn custom_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.collect_ids(0, &mut ids);
        ids
    }

    fn collect_ids(&self, depth: usize, ids: &mut Vec<String>) {
        match self {
            ComponentRef::Button(button) => ids.push(button.custom_id.clone()),
            ComponentRef::SelectMenu(menu) => ids.push(menu.custom_id.clone()),
            ComponentRef::ActionRow(row) => ids.extend(row.custom_ids().map(str::to_string)),
            ComponentRef::CustomId(id) => ids.push(id.clone()),
            ComponentRef::Group(items) if depth < MAX_GROUP_DEPTH => {
                for item in items {
                    item.collect_ids(depth + 1, ids);
                }
            }
            ComponentRef::Group(items) => {
                debug!(depth, skipped = items.len(), "ComponentRef: ignoring deeply nested group");
            }
        }
    }
}

impl From<Button> for ComponentRef {
    fn from(button: Button) -> Self {
        ComponentRef::Button(button)
    }
}

impl From<SelectMenu> for ComponentRef {
    fn from(menu: SelectMenu) -> Self {
        ComponentRef::SelectMenu(menu)
    }
}

impl From<ActionRow> for ComponentRef {
    fn from(row: ActionRow) -> Self {
        ComponentRef::ActionRow(row)
    }
}

impl From<Component> for ComponentRef {
    fn from(component: Component) -> Self {
        match component {
            Component::Button(button) => ComponentRef::Button(button),
            Component::SelectMenu(menu) => ComponentRef::SelectMenu(menu),
        }
    }
}

impl From<&str> for ComponentRef {
    fn from(id: &str) -> Self {
        ComponentRef::CustomId(id.to_string())
    }
}

impl From<String> for ComponentRef {
    fn from(id: String) -> Self {
        ComponentRef::CustomId(id)
    }
}

impl<T: Into<ComponentRef>> From<Vec<T>> for ComponentRef {
    fn from(items: Vec<T>) -> Self {
        ComponentRef::Group(items.into_iter().map(Into::into).collect())
    }
}

/// Anything that names one or more originating messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRef {
    Message(u64),
    Id(u64),
    Group(Vec<MessageRef>),
}

impl MessageRef {
    /// Flatten into message ids; groups expand one level
    pub fn message_ids(&self) -> Vec<u64> {
        match self {
            MessageRef::Message(id) | MessageRef::Id(id) => vec![*id],
            MessageRef::Group(items) => items
                .iter()
                .filter_map(|item| match item {
                    MessageRef::Message(id) | MessageRef::Id(id) => Some(*id),
                    MessageRef::Group(_) => {
                        debug!("MessageRef: ignoring nested group");
                        None
                    }
                })
                .collect(),
        }
    }
}

impl From<u64> for MessageRef {
    fn from(id: u64) -> Self {
        MessageRef::Id(id)
    }
}

impl From<Message> for MessageRef {
    fn from(message: Message) -> Self {
        MessageRef::Message(message.id)
    }
}

impl From<&Message> for MessageRef {
    fn from(message: &Message) -> Self {
        MessageRef::Message(message.id)
    }
}

impl<T: Into<MessageRef>> From<Vec<T>> for MessageRef {
    fn from(items: Vec<T>) -> Self {
        MessageRef::Group(items.into_iter().map(Into::into).collect())
    }
}

/// Typed view of a component interaction payload
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInteraction {
    pub custom_id: String,
    pub component_type: Option<u64>,
    pub values: Vec<String>,
    pub message_id: Option<u64>,
    pub raw: Value,
}

#[derive(Deserialize)]
struct RawInteraction {
    data: RawData,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Deserialize)]
struct RawData {
    custom_id: String,
    #[serde(default)]
    component_type: Option<u64>,
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(deserialize_with = "snowflake")]
    id: u64,
}

/// Snowflake ids arrive as JSON strings, but numbers are accepted too
fn snowflake<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Snowflake {
        Number(u64),
        Text(String),
    }

    match Snowflake::deserialize(deserializer)? {
        Snowflake::Number(id) => Ok(id),
        Snowflake::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

impl ComponentInteraction {
    /// Parse an interaction object as delivered on the component event
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawInteraction::deserialize(value)?;
        Ok(Self {
            custom_id: raw.data.custom_id,
            component_type: raw.data.component_type,
            values: raw.data.values,
            message_id: raw.message.map(|message| message.id),
            raw: value.clone(),
        })
    }
}

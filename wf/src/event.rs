//! Event payloads and the shape `wait_for` returns them in

use serde_json::Value;

/// Positional arguments of a single dispatch, passed through untouched
pub type Payload = Vec<Value>;

/// A resolved event, shaped by its arity
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Dispatched with no arguments
    None,
    /// Dispatched with exactly one argument, unwrapped
    Single(Value),
    /// Dispatched with two or more arguments, in order
    Many(Vec<Value>),
}

impl EventData {
    /// Shape raw dispatch arguments
    pub fn from_args(mut args: Payload) -> Self {
        match args.len() {
            0 => EventData::None,
            1 => EventData::Single(args.remove(0)),
            _ => EventData::Many(args),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EventData::None)
    }

    /// The unwrapped value of a single-argument event
    pub fn into_single(self) -> Option<Value> {
        match self {
            EventData::Single(value) => Some(value),
            _ => None,
        }
    }

    /// All arguments as a sequence, whatever the arity
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            EventData::None => Vec::new(),
            EventData::Single(value) => vec![value],
            EventData::Many(values) => values,
        }
    }
}

impl From<Payload> for EventData {
    fn from(args: Payload) -> Self {
        Self::from_args(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_args_is_none() {
        let data = EventData::from_args(vec![]);
        assert!(data.is_none());
        assert!(data.into_vec().is_empty());
    }

    #[test]
    fn test_single_arg_is_unwrapped() {
        let data = EventData::from_args(vec![json!({"id": "1"})]);
        assert_eq!(data, EventData::Single(json!({"id": "1"})));
        assert_eq!(data.into_single(), Some(json!({"id": "1"})));
    }

    #[test]
    fn test_many_args_keep_order() {
        let data = EventData::from_args(vec![json!(1), json!("two"), json!(null)]);
        assert_eq!(data, EventData::Many(vec![json!(1), json!("two"), json!(null)]));
        assert_eq!(data.clone().into_single(), None);
        assert_eq!(data.into_vec().len(), 3);
    }
}

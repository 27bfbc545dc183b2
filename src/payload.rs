//! Embedded initial-data payload
//!
//! Pages are rendered with a script element (`items-data`) holding the JSON
//! produced upstream. Until the renderer substitutes it, the element holds
//! the literal `{items_json}` token, which means "no data yet".

use serde::Serialize;
use serde_json::Value;

pub const ITEMS_DATA_SCRIPT_ID: &str = "items-data";
pub const PAYLOAD_PLACEHOLDER: &str = "{items_json}";
/// Script holding the slot values extracted for the first transportation row
pub const SLOTS_DATA_SCRIPT_ID: &str = "form-slots-data";
/// Array key tried when a form's own items key is missing from the payload
pub const FALLBACK_ITEMS_KEY: &str = "items";

/// Outcome of reading the embedded payload text
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No script element, or only whitespace in it
    Absent,
    /// The unsubstituted placeholder token
    Placeholder,
    /// Text that is not JSON; carries the parser message
    Malformed(String),
    Parsed(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayloadStatus {
    Absent,
    Placeholder,
    Malformed { message: String },
    Loaded,
}

impl Payload {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Payload::Absent;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Payload::Absent;
        }
        if trimmed == PAYLOAD_PLACEHOLDER {
            return Payload::Placeholder;
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => Payload::Parsed(value),
            Err(e) => Payload::Malformed(e.to_string()),
        }
    }

    pub fn status(&self) -> PayloadStatus {
        match self {
            Payload::Absent => PayloadStatus::Absent,
            Payload::Placeholder => PayloadStatus::Placeholder,
            Payload::Malformed(message) => PayloadStatus::Malformed {
                message: message.clone(),
            },
            Payload::Parsed(_) => PayloadStatus::Loaded,
        }
    }
}

/// Line items carried by a parsed payload.
///
/// The array under `items_key` wins, then the array under
/// [`FALLBACK_ITEMS_KEY`], then a bare top-level array. Anything else,
/// including an object payload for a form without an items key, has no items.
pub fn extract_items<'a>(payload: &'a Value, items_key: Option<&str>) -> Vec<&'a Value> {
    match (payload, items_key) {
        (Value::Object(map), Some(key)) => [key, FALLBACK_ITEMS_KEY]
            .iter()
            .find_map(|candidate| match map.get(*candidate) {
                Some(Value::Array(items)) => Some(items.iter().collect()),
                _ => None,
            })
            .unwrap_or_default(),
        (Value::Array(items), _) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// First non-null value among `keys` in priority order
pub fn lookup_value<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| !value.is_null())
}

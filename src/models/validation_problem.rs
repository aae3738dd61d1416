use serde::Deserialize;
use serde_json::{Map, Value};

/// Structured validation failure body: `{ title?, errors: { field: [msgs] } }`.
///
/// Field order is preserved as sent by the server (`serde_json` is built with
/// `preserve_order`), so flattened messages render in a stable order.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationProblem {
    /// Summary title, when the server includes one
    #[serde(default)]
    pub title: Option<String>,

    /// Per-field message arrays
    #[serde(default)]
    pub errors: Map<String, Value>,
}

impl ValidationProblem {
    /// True when the body actually carries field errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Flatten all field message arrays into one list, in payload order.
    pub fn flatten_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for value in self.errors.values() {
            match value {
                Value::String(message) => messages.push(message.clone()),
                Value::Array(entries) => {
                    for entry in entries {
                        if let Value::String(message) = entry {
                            messages.push(message.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        messages
    }
}

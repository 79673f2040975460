//! List kinds built from scalar element kinds.

use super::{CoerceError, Kind, value_text};
use serde_json::Value;
use std::time::Duration;

/// Separator used when none is configured.
pub const DEFAULT_LIST_SEPARATOR: &str = ",";

/// A scalar kind that may appear inside a list parameter.
pub trait Element: Kind {
    /// Name of the list kind, e.g. `list<int>`.
    const LIST_NAME: &'static str;

    /// Whether incidental whitespace around each text element is dropped.
    const TRIM: bool = true;
}

impl Element for String {
    const LIST_NAME: &'static str = "list<string>";
    const TRIM: bool = false;
}

impl Element for i64 {
    const LIST_NAME: &'static str = "list<int>";
}

impl Element for bool {
    const LIST_NAME: &'static str = "list<bool>";
}

impl Element for f64 {
    const LIST_NAME: &'static str = "list<float>";
}

impl Element for Duration {
    const LIST_NAME: &'static str = "list<duration>";
}

/// Split list text. Empty input yields no elements at all.
pub fn split<'a>(raw: &'a str, separator: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let separator = if separator.is_empty() {
        DEFAULT_LIST_SEPARATOR
    } else {
        separator
    };
    let parts = if raw.is_empty() {
        None
    } else {
        Some(raw.split(separator))
    };
    parts.into_iter().flatten()
}

/// Re-label an element failure with the element's raw text.
fn element_error(raw: String, err: CoerceError) -> CoerceError {
    CoerceError { value: raw, ..err }
}

impl<T: Element> Kind for Vec<T> {
    const NAME: &'static str = T::LIST_NAME;

    fn from_text(raw: &str, separator: &str) -> Result<Self, CoerceError> {
        split(raw, separator)
            .map(|part| {
                let text = if T::TRIM { part.trim() } else { part };
                T::from_text(text, separator).map_err(|e| element_error(part.to_owned(), e))
            })
            .collect()
    }

    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    T::from_value(item, separator).map_err(|e| element_error(value_text(item), e))
                })
                .collect(),
            Value::String(s) => Self::from_text(s, separator),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        let items: Vec<String> = self.iter().map(Kind::render).collect();
        format!("[{}]", items.join(" "))
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Kind::to_value).collect())
    }
}

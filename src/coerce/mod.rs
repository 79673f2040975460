//! Conversion of raw source values into typed parameter values.
//!
//! Every supported value type implements [`Kind`], which knows how to read the
//! type from plain text (CLI flags, environment variables) and from an already
//! decoded file node, and how to render it back in canonical text form.
//!
//! Supported kinds: `String`, `i64`, `bool`, `f64`, [`Duration`] and `Vec<T>`
//! of each of those.

pub mod duration;
pub mod list;

pub use list::{DEFAULT_LIST_SEPARATOR, Element};

use crate::error::Cause;
use serde_json::{Number, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A raw value that could not be converted. Carries no key; the loader adds it.
#[derive(Debug, Error)]
#[error("cannot convert {value:?} to {expected}")]
pub struct CoerceError {
    pub value: String,
    pub expected: &'static str,
    #[source]
    pub cause: Option<Cause>,
}

impl CoerceError {
    pub fn new(value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            value: value.into(),
            expected,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Text of a decoded node as it should appear in error messages.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A value type a parameter can hold.
pub trait Kind: Clone + fmt::Debug + Default + Send + Sync + 'static {
    /// Name used in error messages, e.g. `int` or `list<duration>`.
    const NAME: &'static str;

    /// Convert plain text. `separator` splits list kinds and is ignored by scalars.
    fn from_text(raw: &str, separator: &str) -> Result<Self, CoerceError>;

    /// Convert a decoded file node. Plain string nodes go through [`Kind::from_text`].
    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError>;

    /// Canonical text form.
    fn render(&self) -> String;

    /// Decoded form, used when exporting a value tree.
    fn to_value(&self) -> Value;
}

impl Kind for String {
    const NAME: &'static str = "string";

    fn from_text(raw: &str, _separator: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_owned())
    }

    fn from_value(raw: &Value, _separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Kind for i64 {
    const NAME: &'static str = "int";

    fn from_text(raw: &str, _separator: &str) -> Result<Self, CoerceError> {
        raw.parse::<i64>()
            .map_err(|e| CoerceError::new(raw, Self::NAME).with_cause(e))
    }

    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i)
                } else if let Some(u) = n.as_u64() {
                    i64::try_from(u)
                        .map_err(|e| CoerceError::new(n.to_string(), Self::NAME).with_cause(e))
                } else {
                    // floats truncate toward zero
                    let f = n.as_f64().unwrap_or_default();
                    Ok(f as i64)
                }
            }
            Value::String(s) => Self::from_text(s, separator),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

#[derive(Debug, Error)]
#[error("expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")]
struct BoolSyntaxError;

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Kind for bool {
    const NAME: &'static str = "bool";

    fn from_text(raw: &str, _separator: &str) -> Result<Self, CoerceError> {
        parse_bool(raw).ok_or_else(|| CoerceError::new(raw, Self::NAME).with_cause(BoolSyntaxError))
    }

    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => Self::from_text(s, separator),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Kind for f64 {
    const NAME: &'static str = "float";

    fn from_text(raw: &str, _separator: &str) -> Result<Self, CoerceError> {
        raw.parse::<f64>()
            .map_err(|e| CoerceError::new(raw, Self::NAME).with_cause(e))
    }

    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| CoerceError::new(n.to_string(), Self::NAME)),
            Value::String(s) => Self::from_text(s, separator),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_value(&self) -> Value {
        Number::from_f64(*self).map_or_else(|| Value::String(self.render()), Value::Number)
    }
}

impl Kind for Duration {
    const NAME: &'static str = "duration";

    fn from_text(raw: &str, _separator: &str) -> Result<Self, CoerceError> {
        duration::parse(raw).map_err(|e| CoerceError::new(raw, Self::NAME).with_cause(e))
    }

    /// Numeric nodes count nanoseconds.
    fn from_value(raw: &Value, separator: &str) -> Result<Self, CoerceError> {
        match raw {
            Value::Number(n) => {
                if let Some(nanos) = n.as_u64() {
                    return Ok(Duration::from_nanos(nanos));
                }
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => Ok(Duration::from_nanos(f as u64)),
                    _ => Err(CoerceError::new(n.to_string(), Self::NAME)
                        .with_cause(duration::DurationError::Negative)),
                }
            }
            Value::String(s) => Self::from_text(s, separator),
            other => Err(CoerceError::new(value_text(other), Self::NAME)),
        }
    }

    fn render(&self) -> String {
        duration::format(*self)
    }

    fn to_value(&self) -> Value {
        Value::String(self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_from_text() {
        assert_eq!(i64::from_text("42", ",").unwrap(), 42);
        assert_eq!(i64::from_text("-7", ",").unwrap(), -7);
        let err = i64::from_text("4x", ",").unwrap_err();
        assert_eq!(err.value, "4x");
        assert_eq!(err.expected, "int");
        assert!(err.cause.is_some());
        // scalars are not trimmed
        assert!(i64::from_text(" 4", ",").is_err());
    }

    #[test]
    fn test_int_from_value_widens_numbers() {
        assert_eq!(i64::from_value(&json!(5432), ",").unwrap(), 5432);
        assert_eq!(i64::from_value(&json!(3.9), ",").unwrap(), 3);
        assert_eq!(i64::from_value(&json!("12"), ",").unwrap(), 12);
        assert!(i64::from_value(&json!(u64::MAX), ",").is_err());
        assert!(i64::from_value(&json!(true), ",").is_err());
    }

    #[test]
    fn test_bool_grammar() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::from_text(t, ",").unwrap(), "{t}");
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::from_text(f, ",").unwrap(), "{f}");
        }
        assert!(bool::from_text("yes", ",").is_err());
        assert!(bool::from_value(&json!(true), ",").unwrap());
        assert!(bool::from_value(&json!(1), ",").is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(f64::from_text("2.75", ",").unwrap(), 2.75);
        assert_eq!(f64::from_value(&json!(2), ",").unwrap(), 2.0);
        assert_eq!(2.75f64.render(), "2.75");
        assert!(f64::from_text("pi", ",").is_err());
    }

    #[test]
    fn test_string_from_value() {
        assert_eq!(String::from_value(&json!("x"), ",").unwrap(), "x");
        assert_eq!(String::from_value(&json!(8080), ",").unwrap(), "8080");
        assert_eq!(String::from_value(&json!(false), ",").unwrap(), "false");
        let err = String::from_value(&json!({"a": 1}), ",").unwrap_err();
        assert_eq!(err.expected, "string");
    }

    #[test]
    fn test_duration() {
        assert_eq!(
            Duration::from_text("1m", ",").unwrap(),
            Duration::from_secs(60)
        );
        assert_eq!(
            Duration::from_value(&json!("2m"), ",").unwrap(),
            Duration::from_secs(120)
        );
        assert_eq!(
            Duration::from_value(&json!(1500), ",").unwrap(),
            Duration::from_nanos(1500)
        );
        assert!(Duration::from_value(&json!(-1), ",").is_err());
        let err = Duration::from_text("not-a-duration", ",").unwrap_err();
        assert_eq!(err.expected, "duration");
        assert_eq!(err.value, "not-a-duration");
    }

    #[test]
    fn test_render_round_trips() {
        for text in ["42", "-3"] {
            assert_eq!(i64::from_text(text, ",").unwrap().render(), text);
        }
        for text in ["true", "false"] {
            assert_eq!(bool::from_text(text, ",").unwrap().render(), text);
        }
        for text in ["5s", "1m0s", "1h30m0s", "250ms"] {
            assert_eq!(Duration::from_text(text, ",").unwrap().render(), text);
        }
        for text in ["0.5", "1e-7", "12"] {
            let v = f64::from_text(text, ",").unwrap();
            assert_eq!(f64::from_text(&v.render(), ",").unwrap(), v);
        }
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Duration::from_secs(5).to_value(), json!("5s"));
        assert_eq!(7i64.to_value(), json!(7));
        assert_eq!(f64::NAN.to_value(), json!("NaN"));
    }
}

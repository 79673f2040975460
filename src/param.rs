//! Typed configuration parameters.

use crate::coerce::Kind;
use crate::error::{ParseError, ValidationError};
use crate::sources::{RawValue, SourceKind};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Text shown in place of a secret value.
pub const MASK: &str = "****";

/// A validator returns a failure message for values it rejects.
pub type Validator<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// A single named configuration value.
///
/// Built once with the `with_*` methods; the key is assigned by the schema
/// walker and the value by the loader.
///
/// # Example
/// ```
/// use tierconf::{IntParam, Param, validators};
///
/// let port: IntParam = Param::new()
///     .with_default(5432)
///     .with_description("database port")
///     .validate(validators::range(1, 65535));
/// assert_eq!(*port.get(), 5432);
/// assert!(!port.is_set());
/// ```
pub struct Param<T: Kind> {
    key: String,
    value: T,
    default: Option<T>,
    source: Option<SourceKind>,
    required: bool,
    secret: bool,
    description: String,
    validators: Vec<Validator<T>>,
}

pub type StringParam = Param<String>;
pub type IntParam = Param<i64>;
pub type BoolParam = Param<bool>;
pub type FloatParam = Param<f64>;
pub type DurationParam = Param<Duration>;
pub type StringListParam = Param<Vec<String>>;
pub type IntListParam = Param<Vec<i64>>;
pub type BoolListParam = Param<Vec<bool>>;
pub type FloatListParam = Param<Vec<f64>>;
pub type DurationListParam = Param<Vec<Duration>>;

impl<T: Kind> Param<T> {
    /// A parameter holding the zero value of `T`, with no default.
    pub fn new() -> Self {
        Self {
            key: String::new(),
            value: T::default(),
            default: None,
            source: None,
            required: false,
            secret: false,
            description: String::new(),
            validators: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<T>) -> Self {
        let value = value.into();
        self.value = value.clone();
        self.default = Some(value);
        self
    }

    /// Report an error when no source supplies a value and there is no default.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mask the value in dumps and error messages.
    #[must_use]
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a validator. Validators run in the order they were added.
    #[must_use]
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Current value: resolved, default, or zero value.
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Dotted key; empty until the schema has been walked.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True once a source, not the default, supplied the value.
    pub fn is_set(&self) -> bool {
        self.source.is_some()
    }

    /// Which source supplied the value, if any.
    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T: Kind> Default for Param<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Kind> fmt::Debug for Param<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.secret {
            MASK.to_owned()
        } else {
            self.value.render()
        };
        f.debug_struct("Param")
            .field("key", &self.key)
            .field("kind", &T::NAME)
            .field("value", &value)
            .field("source", &self.source)
            .field("has_default", &self.default.is_some())
            .field("required", &self.required)
            .field("secret", &self.secret)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Type-erased view of a [`Param`], handed to the schema walker.
///
/// Implemented for every `Param<T>`; there is normally no reason to
/// implement it by hand.
pub trait AnyParam: Send + Sync {
    fn key(&self) -> &str;

    fn assign_key(&mut self, key: String);

    /// Name of the value kind, e.g. `int`.
    fn kind_name(&self) -> &'static str;

    /// Restore the default (or zero) value and forget the source.
    fn reset(&mut self);

    /// Coerce and store a raw source value. On failure the value is left untouched.
    fn apply(
        &mut self,
        raw: RawValue,
        separator: &str,
        origin: SourceKind,
    ) -> Result<(), ParseError>;

    /// Run validators in order, stopping at the first failure.
    fn check(&self) -> Result<(), ValidationError>;

    fn is_set(&self) -> bool;

    fn source(&self) -> Option<SourceKind>;

    fn has_default(&self) -> bool;

    fn is_required(&self) -> bool;

    fn is_secret(&self) -> bool;

    fn description(&self) -> &str;

    /// Canonical text of the current value.
    fn render(&self) -> String;

    fn render_default(&self) -> Option<String>;

    fn to_value(&self) -> Value;
}

impl<T: Kind> AnyParam for Param<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn assign_key(&mut self, key: String) {
        self.key = key;
    }

    fn kind_name(&self) -> &'static str {
        T::NAME
    }

    fn reset(&mut self) {
        self.value = self.default.clone().unwrap_or_default();
        self.source = None;
    }

    fn apply(
        &mut self,
        raw: RawValue,
        separator: &str,
        origin: SourceKind,
    ) -> Result<(), ParseError> {
        let parsed = match raw {
            RawValue::Text(text) => T::from_text(&text, separator),
            RawValue::Tree(node) => T::from_value(&node, separator),
        };
        self.value = parsed.map_err(|e| ParseError::from_coerce(self.key.clone(), e))?;
        self.source = Some(origin);
        Ok(())
    }

    fn check(&self) -> Result<(), ValidationError> {
        for validator in &self.validators {
            if let Err(message) = validator(&self.value) {
                let shown = if self.secret {
                    MASK.to_owned()
                } else {
                    self.value.render()
                };
                return Err(ValidationError::new(self.key.clone(), shown, message));
            }
        }
        Ok(())
    }

    fn is_set(&self) -> bool {
        self.source.is_some()
    }

    fn source(&self) -> Option<SourceKind> {
        self.source
    }

    fn has_default(&self) -> bool {
        self.default.is_some()
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn is_secret(&self) -> bool {
        self.secret
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn render(&self) -> String {
        self.value.render()
    }

    fn render_default(&self) -> Option<String> {
        self.default.as_ref().map(Kind::render)
    }

    fn to_value(&self) -> Value {
        self.value.to_value()
    }
}

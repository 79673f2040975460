//! Structured error types for configuration loading.
//!
//! Per-parameter failures ([`ParseError`], [`ValidationError`], [`RequiredError`])
//! are collected into a [`LoadErrors`] aggregate and never abort a load on their
//! own. Only a config file that exists but cannot be read or decoded is fatal.

use crate::coerce::CoerceError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause of a parse failure.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A raw value was present but could not be converted to the declared kind.
    Parse,
    /// The value converted but a validator rejected it.
    Validation,
    /// A required parameter ended up without a value or default.
    Required,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Parse => write!(f, "parse"),
            ErrorCode::Validation => write!(f, "validation"),
            ErrorCode::Required => write!(f, "required"),
        }
    }
}

/// A value could not be parsed to the expected kind.
#[derive(Debug, Error)]
pub struct ParseError {
    pub key: String,
    /// Raw text of the offending value (or list element).
    pub value: String,
    /// Name of the expected kind, e.g. `int` or `list<duration>`.
    pub expected: &'static str,
    #[source]
    pub cause: Option<Cause>,
}

impl ParseError {
    pub fn new(key: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expected,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach a key to a coercion failure.
    pub fn from_coerce(key: impl Into<String>, err: CoerceError) -> Self {
        Self {
            key: key.into(),
            value: err.value,
            expected: err.expected,
            cause: err.cause,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse {:?} as {} for key {:?}",
            self.value, self.expected, self.key
        )?;
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

/// A value was parsed but rejected by a validator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed for {key:?} (value: {value}): {message}")]
pub struct ValidationError {
    pub key: String,
    /// Canonical text form of the rejected value.
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// A required parameter was not supplied and has no default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required parameter {key:?} is not set")]
pub struct RequiredError {
    pub key: String,
}

impl RequiredError {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// One per-key error record.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Required(#[from] RequiredError),
}

impl FieldError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FieldError::Parse(_) => ErrorCode::Parse,
            FieldError::Validation(_) => ErrorCode::Validation,
            FieldError::Required(_) => ErrorCode::Required,
        }
    }

    /// Dotted key of the offending parameter.
    pub fn key(&self) -> &str {
        match self {
            FieldError::Parse(e) => &e.key,
            FieldError::Validation(e) => &e.key,
            FieldError::Required(e) => &e.key,
        }
    }
}

/// Every error collected during one load, in parameter order.
#[derive(Debug, Default)]
pub struct LoadErrors {
    errors: Vec<FieldError>,
}

impl LoadErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: impl Into<FieldError>) {
        self.errors.push(err.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Errors recorded for one key.
    pub fn for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.key() == key)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> std::result::Result<(), LoadErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for LoadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "{}", only);
        }
        writeln!(f, "{} configuration errors:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "  - {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadErrors {}

impl<'a> IntoIterator for &'a LoadErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for LoadErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Crate-level error returned by a load.
#[derive(Debug, Error)]
pub enum Error {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be decoded.
    #[error("failed to parse config file '{path}': {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more parameters failed to resolve.
    #[error(transparent)]
    Invalid(#[from] LoadErrors),
}

impl Error {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse_file(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::ParseFile {
            path: path.into(),
            source,
        }
    }

    /// The aggregated per-parameter errors, if this is not a fatal file error.
    pub fn load_errors(&self) -> Option<&LoadErrors> {
        match self {
            Error::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

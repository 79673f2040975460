//! Raw value sources.
//!
//! A source answers one question: does it hold a value for a dotted key?
//! Sources are consulted in priority order, highest first:
//! command line, environment, config file.

mod cli;
mod env;
mod file;

pub use cli::CliSource;
pub use env::{EnvSource, env_var_name};
pub use file::FileSource;

use serde_json::Value;

/// Where a resolved value came from (lowest to highest priority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// YAML config file
    File = 0,
    /// Environment variables
    Environment = 1,
    /// Command line flags (highest priority)
    CommandLine = 2,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::File => write!(f, "file"),
            SourceKind::Environment => write!(f, "env"),
            SourceKind::CommandLine => write!(f, "cli"),
        }
    }
}

/// A value as a source holds it, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Plain text from a flag or environment variable.
    Text(String),
    /// A decoded node from the config file.
    Tree(Value),
}

/// A provider of raw values by dotted key.
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// The raw value for `key`, or `None` when this source does not define it.
    fn lookup(&self, key: &str) -> Option<RawValue>;
}

//! Long-flag command line source.

use super::{RawValue, Source, SourceKind};
use std::collections::HashMap;
use tracing::trace;

const FLAG_PREFIX: &str = "--";

/// Values parsed from `--key=value`, `--key value` and bare `--flag` arguments.
///
/// Arguments that do not start with `--` are skipped unless consumed as the
/// value of the preceding flag. A bare flag stands for `"true"`. When a key
/// repeats, the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct CliSource {
    values: HashMap<String, String>,
}

impl CliSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let mut values = HashMap::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            i += 1;
            let Some(flag) = arg.strip_prefix(FLAG_PREFIX) else {
                continue;
            };

            if let Some((key, value)) = flag.split_once('=') {
                if !key.is_empty() {
                    values.insert(key.to_owned(), value.to_owned());
                }
                continue;
            }
            if flag.is_empty() {
                continue;
            }

            match args.get(i).map(String::as_str) {
                Some(next) if !next.starts_with(FLAG_PREFIX) => {
                    values.insert(flag.to_owned(), next.to_owned());
                    i += 1;
                }
                _ => {
                    values.insert(flag.to_owned(), "true".to_owned());
                }
            }
        }
        trace!(count = values.len(), "parsed command line flags");
        Self { values }
    }

    /// Whether a flag was given for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl Source for CliSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CommandLine
    }

    fn lookup(&self, key: &str) -> Option<RawValue> {
        self.values.get(key).cloned().map(RawValue::Text)
    }
}

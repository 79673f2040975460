//! Environment variable source.

use super::{RawValue, Source, SourceKind};
use std::collections::HashMap;

/// Environment variable name for a dotted key.
///
/// Dots become underscores and the key is upper-cased; a non-empty prefix is
/// prepended verbatim with an underscore, so `db.host` under prefix `APP`
/// becomes `APP_DB_HOST`.
pub fn env_var_name(prefix: &str, key: &str) -> String {
    let name = key.replace('.', "_").to_uppercase();
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}_{name}")
    }
}

/// Values read from the process environment, or from a fixed map.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: String,
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    /// Read from the process environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Read from `vars` instead of the process environment.
    pub fn with_vars(prefix: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: Some(vars),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Variable name consulted for `key`.
    pub fn var_name(&self, key: &str) -> String {
        env_var_name(&self.prefix, key)
    }
}

impl Source for EnvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn lookup(&self, key: &str) -> Option<RawValue> {
        let name = self.var_name(key);
        let value = match self.vars {
            Some(ref vars) => vars.get(&name).cloned(),
            None => std::env::var_os(&name).map(|v| v.to_string_lossy().into_owned()),
        };
        value.map(RawValue::Text)
    }
}

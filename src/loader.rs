//! Layered resolution of parameters.
//!
//! Every parameter is resolved independently against the same three sources,
//! highest priority first: command line, environment, config file. Failures
//! are collected per parameter and reported together once every parameter
//! has been visited.

use crate::coerce::DEFAULT_LIST_SEPARATOR;
use crate::error::{LoadErrors, RequiredError, Result};
use crate::param::AnyParam;
use crate::paths::find_config_file;
use crate::schema::{Schema, walk, walk_with_prefix};
use crate::sources::{CliSource, EnvSource, FileSource, Source};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Where to look for values and how to read them.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Explicit config file. Takes precedence over `config_paths`, even when
    /// it does not exist.
    pub config_file: Option<PathBuf>,
    /// Candidate config files; the first one that exists is used.
    pub config_paths: Vec<String>,
    /// Prefix for environment variable names, e.g. `APP` for `APP_DB_HOST`.
    pub env_prefix: String,
    /// Command line arguments, without the program name.
    pub args: Vec<String>,
    /// Separator for list values given as text. Empty means `,`.
    pub list_separator: String,
    /// Fixed environment used instead of the process environment.
    pub env_vars: Option<HashMap<String, String>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_config_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_list_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }

    /// Read environment variables from `vars` instead of the process.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Effective list separator.
    pub fn separator(&self) -> &str {
        if self.list_separator.is_empty() {
            DEFAULT_LIST_SEPARATOR
        } else {
            &self.list_separator
        }
    }

    /// The config file that will be read, if any. An empty explicit path
    /// counts as unset.
    pub fn resolve_config_file(&self) -> Option<PathBuf> {
        match self.config_file {
            Some(ref path) if !path.as_os_str().is_empty() => Some(path.clone()),
            _ if self.config_paths.is_empty() => None,
            _ => find_config_file(&self.config_paths),
        }
    }
}

/// The three sources of one load, in priority order.
#[derive(Debug)]
pub struct SourceSet {
    cli: CliSource,
    env: EnvSource,
    file: FileSource,
}

impl SourceSet {
    /// Build every source. Only the config file can fail.
    pub fn open(options: &Options) -> Result<Self> {
        let file = match options.resolve_config_file() {
            Some(path) => FileSource::load(&path)?,
            None => {
                debug!("no config file configured");
                FileSource::empty()
            }
        };
        let env = match options.env_vars {
            Some(ref vars) => EnvSource::with_vars(options.env_prefix.clone(), vars.clone()),
            None => EnvSource::new(options.env_prefix.clone()),
        };
        Ok(Self {
            cli: CliSource::new(&options.args),
            env,
            file,
        })
    }

    /// Path of the config file in use, if one was read.
    pub fn config_file(&self) -> Option<&Path> {
        self.file.path()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        [
            &self.cli as &dyn Source,
            &self.env as &dyn Source,
            &self.file as &dyn Source,
        ]
        .into_iter()
    }

    /// Resolve every parameter and collect the failures.
    pub fn resolve(&self, params: &mut [&mut dyn AnyParam], separator: &str) -> LoadErrors {
        let mut errors = LoadErrors::new();
        for param in params.iter_mut() {
            self.resolve_one(&mut **param, separator, &mut errors);
        }
        debug!(
            params = params.len(),
            errors = errors.len(),
            "resolved configuration"
        );
        errors
    }

    fn resolve_one(&self, param: &mut dyn AnyParam, separator: &str, errors: &mut LoadErrors) {
        param.reset();

        let hit = self
            .iter()
            .find_map(|source| source.lookup(param.key()).map(|raw| (source.kind(), raw)));

        if let Some((origin, raw)) = hit {
            if let Err(e) = param.apply(raw, separator, origin) {
                debug!(key = %param.key(), source = %origin, "value does not parse");
                errors.push(e);
                return;
            }
            if param.is_secret() {
                trace!(key = %param.key(), source = %origin, "resolved");
            } else {
                trace!(key = %param.key(), source = %origin, value = %param.render(), "resolved");
            }
        }

        if let Err(e) = param.check() {
            debug!(key = %param.key(), "value rejected by validator");
            errors.push(e);
        }

        if param.is_required() && !param.is_set() && !param.has_default() {
            debug!(key = %param.key(), "required parameter missing");
            errors.push(RequiredError::new(param.key()));
        }
    }
}

fn finish(errors: LoadErrors) -> Result<()> {
    errors.into_result().map_err(Into::into)
}

/// Resolve every parameter of `schema`.
///
/// A config file that exists but cannot be read or decoded aborts the load
/// before any parameter is touched. All other failures are collected into
/// [`Error::Invalid`](crate::Error::Invalid); parameters that resolved keep
/// their values either way.
///
/// Loading the same schema from several threads at once must be serialized
/// by the caller.
pub fn load<S: Schema + ?Sized>(schema: &mut S, options: &Options) -> Result<()> {
    let sources = SourceSet::open(options)?;
    let mut params = walk(schema);
    finish(sources.resolve(&mut params, options.separator()))
}

/// Resolves several named schemas in one pass.
///
/// Each schema is walked with its name as key prefix, so a `port` parameter
/// registered under `db` is looked up as `db.port` (`DB_PORT`, `--db.port`).
/// All schemas share one set of sources and one error report.
pub struct Loader<'a> {
    options: Options,
    schemas: Vec<(String, &'a mut dyn Schema)>,
}

impl<'a> Loader<'a> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            schemas: Vec::new(),
        }
    }

    /// Add a schema under `name`. An empty name registers it at the root.
    pub fn register<S: Schema>(&mut self, name: impl Into<String>, schema: &'a mut S) -> &mut Self {
        self.schemas.push((name.into(), schema));
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn params(&mut self) -> Vec<&mut dyn AnyParam> {
        let mut params = Vec::new();
        for (name, schema) in self.schemas.iter_mut() {
            params.extend(walk_with_prefix(&mut **schema, name));
        }
        params
    }

    /// Resolve every registered schema.
    pub fn load(&mut self) -> Result<()> {
        let sources = SourceSet::open(&self.options)?;
        let separator = self.options.separator().to_owned();
        let mut params = self.params();
        finish(sources.resolve(&mut params, &separator))
    }

    /// Dump every registered schema, in registration order.
    pub fn dump(&mut self) -> String {
        crate::dump::render(&self.params())
    }

    /// Describe every registered schema, in registration order.
    pub fn describe(&mut self) -> String {
        let prefix = self.options.env_prefix.clone();
        crate::dump::render_description(&self.params(), &prefix)
    }

    /// Export every registered schema as one tree.
    pub fn export(&mut self) -> serde_json::Value {
        crate::dump::render_tree(&self.params())
    }
}

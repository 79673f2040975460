//! Config file discovery.
//!
//! Candidate paths may start with `~` and may reference environment variables
//! as `$VAR` or `${VAR}`. Unset variables expand to nothing.

use std::path::{Path, PathBuf};
use tracing::trace;

/// File name looked up in each candidate directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Expand a leading `~` and any environment variable references.
pub fn expand_path(path: &str) -> PathBuf {
    expand_path_with(path, dirs::home_dir(), |name| std::env::var(name).ok())
}

fn expand_path_with(
    path: &str,
    home: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~')
        && let Some(home) = home
    {
        let rest = rest.trim_start_matches('/');
        let expanded = expand_vars(rest, &lookup);
        return if expanded.is_empty() {
            home
        } else {
            home.join(expanded)
        };
    }
    PathBuf::from(expand_vars(path, &lookup))
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace `$VAR` and `${VAR}` references. A `$` not followed by a name is kept.
fn expand_vars(text: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{')
            && let Some(end) = braced.find('}')
        {
            out.push_str(&lookup(&braced[..end]).unwrap_or_default());
            rest = &braced[end + 1..];
            continue;
        }

        let len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&lookup(&after[..len]).unwrap_or_default());
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

/// First candidate that exists after expansion.
pub fn find_config_file<I, S>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates.into_iter().find_map(|candidate| {
        let path = expand_path(candidate.as_ref());
        trace!(path = %path.display(), "checking config file");
        path.exists().then_some(path)
    })
}

/// Conventional search list for `app`: the working directory, the user
/// config directory (`$XDG_CONFIG_HOME` or `~/.config`) and `/etc`.
pub fn default_config_paths(app: &str) -> Vec<String> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "~/.config".to_owned());
    vec![
        CONFIG_FILE_NAME.to_owned(),
        join(&config_home, app),
        join("/etc", app),
    ]
}

fn join(base: &str, app: &str) -> String {
    Path::new(base)
        .join(app)
        .join(CONFIG_FILE_NAME)
        .to_string_lossy()
        .into_owned()
}

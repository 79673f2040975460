//! Schema walking.
//!
//! A schema is any type that can enumerate its parameters. The walker joins
//! each parameter's key segment onto the prefix of its enclosing groups, so
//! a `port` field inside a group keyed `db` ends up with key `db.port`.
//!
//! Implement [`Schema`] by hand or with the [`schema!`](crate::schema!) macro:
//!
//! ```
//! use tierconf::{IntParam, Param, StringParam, schema};
//!
//! struct Database {
//!     host: StringParam,
//!     port: IntParam,
//! }
//!
//! struct Config {
//!     db: Database,
//!     name: StringParam,
//! }
//!
//! schema!(Database { param "host" => host, param "port" => port });
//! schema!(Config { nested "db" => db, param "name" => name });
//!
//! let mut cfg = Config {
//!     db: Database { host: Param::new(), port: Param::new() },
//!     name: Param::new(),
//! };
//! let keys = tierconf::keys(&mut cfg);
//! assert_eq!(keys, vec!["db.host", "db.port", "name"]);
//! ```

use crate::param::AnyParam;

/// A type whose parameters can be enumerated in a stable order.
pub trait Schema {
    /// Hand every parameter, and every nested group, to `walker`.
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>);
}

/// Collects parameter handles and assigns their dotted keys.
pub struct Walker<'a> {
    prefix: String,
    params: Vec<&'a mut dyn AnyParam>,
}

/// Join a key segment onto a prefix. Empty parts are dropped.
pub fn join_key(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}.{key}"),
    }
}

impl<'a> Walker<'a> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            params: Vec::new(),
        }
    }

    /// Register a parameter under `key`.
    pub fn param(&mut self, key: &str, param: &'a mut dyn AnyParam) {
        param.assign_key(join_key(&self.prefix, key));
        self.params.push(param);
    }

    /// Walk a nested group under `key`. An empty key flattens the group into
    /// the current level.
    pub fn nested<S: Schema + ?Sized>(&mut self, key: &str, group: &'a mut S) {
        let outer = std::mem::take(&mut self.prefix);
        self.prefix = join_key(&outer, key);
        group.visit(self);
        self.prefix = outer;
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Handles in walk order.
    pub fn finish(self) -> Vec<&'a mut dyn AnyParam> {
        self.params
    }
}

/// Walk `schema` from the root and return its handles.
pub fn walk<S: Schema + ?Sized>(schema: &mut S) -> Vec<&mut dyn AnyParam> {
    walk_with_prefix(schema, "")
}

pub(crate) fn walk_with_prefix<'a, S: Schema + ?Sized>(
    schema: &'a mut S,
    prefix: &str,
) -> Vec<&'a mut dyn AnyParam> {
    let mut walker = Walker::new(prefix);
    schema.visit(&mut walker);
    walker.finish()
}

/// Dotted keys of every parameter, in walk order.
pub fn keys<S: Schema + ?Sized>(schema: &mut S) -> Vec<String> {
    walk(schema)
        .into_iter()
        .map(|p| p.key().to_owned())
        .collect()
}

/// An absent optional group contributes no parameters.
impl<S: Schema> Schema for Option<S> {
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) {
        if let Some(inner) = self {
            inner.visit(walker);
        }
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) {
        (**self).visit(walker);
    }
}

/// Implement [`Schema`] for a struct by listing its fields in order.
///
/// Each entry is either `param "key" => field` for a parameter or
/// `nested "key" => field` for a group implementing [`Schema`].
#[macro_export]
macro_rules! schema {
    (@visit $walker:ident, param, $key:literal, $($field:tt)+) => {
        $walker.param($key, &mut $($field)+)
    };
    (@visit $walker:ident, nested, $key:literal, $($field:tt)+) => {
        $walker.nested($key, &mut $($field)+)
    };
    ($ty:ty { $($kind:ident $key:literal => $field:ident),* $(,)? }) => {
        impl $crate::Schema for $ty {
            #[allow(unused_variables)]
            fn visit<'a>(&'a mut self, walker: &mut $crate::Walker<'a>) {
                $( $crate::schema!(@visit walker, $kind, $key, self.$field); )*
            }
        }
    };
}

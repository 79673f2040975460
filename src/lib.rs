//! Layered configuration loading.
//!
//! Declare parameters in a schema, then resolve each one from the first
//! source that defines it, in priority order:
//!
//! 1. command line flags (`--db.port=5432`)
//! 2. environment variables (`APP_DB_PORT=5432`)
//! 3. a YAML config file (`db: { port: 5432 }`)
//! 4. the parameter's default
//!
//! Parse, validation and required-parameter failures are collected across the
//! whole schema and returned together.
//!
//! ```
//! use tierconf::{IntParam, Options, Param, StringParam, load, schema, validators};
//!
//! struct Database {
//!     host: StringParam,
//!     port: IntParam,
//! }
//!
//! schema!(Database { param "host" => host, param "port" => port });
//!
//! let mut db = Database {
//!     host: Param::new().with_default("localhost"),
//!     port: Param::new().with_default(5432).validate(validators::range(1, 65535)),
//! };
//!
//! let options = Options::new()
//!     .with_env_vars([("PORT", "6543")])
//!     .with_args(["--host", "db.internal"]);
//! load(&mut db, &options)?;
//!
//! assert_eq!(db.host.get(), "db.internal");
//! assert_eq!(*db.port.get(), 6543);
//! # Ok::<(), tierconf::Error>(())
//! ```

pub mod coerce;
pub mod dump;
pub mod error;
pub mod loader;
pub mod param;
pub mod paths;
pub mod schema;
pub mod sources;
pub mod validators;

pub use coerce::{DEFAULT_LIST_SEPARATOR, Kind};
pub use dump::{describe, dump, export};
pub use error::{
    Error, ErrorCode, FieldError, LoadErrors, ParseError, RequiredError, Result, ValidationError,
};
pub use loader::{Loader, Options, load};
pub use param::{
    AnyParam, BoolListParam, BoolParam, DurationListParam, DurationParam, FloatListParam,
    FloatParam, IntListParam, IntParam, Param, StringListParam, StringParam, Validator,
};
pub use paths::{default_config_paths, expand_path, find_config_file};
pub use schema::{Schema, Walker, keys, walk};
pub use sources::SourceKind;

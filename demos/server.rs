//! Example server configuration.
//!
//! Try:
//!
//! ```text
//! DEMO_DB_URL=postgres://db/app cargo run --example server -- --server.port 9000
//! DEMO_DB_URL=postgres://db/app cargo run --example server -- --dump
//! cargo run --example server   # fails: db.url is required
//! ```

use anyhow::{Context, Result};
use std::time::Duration;
use tierconf::{
    BoolParam, DurationParam, IntParam, Options, Param, StringListParam, StringParam,
    default_config_paths, dump, export, load, schema, validators,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

struct ServerSection {
    host: StringParam,
    port: IntParam,
    read_timeout: DurationParam,
    allowed_origins: StringListParam,
}

struct DbSection {
    url: StringParam,
    pool_size: IntParam,
}

struct LogSection {
    level: StringParam,
}

struct Config {
    server: ServerSection,
    db: DbSection,
    log: LogSection,
    dump: BoolParam,
    export: BoolParam,
}

schema!(ServerSection {
    param "host" => host,
    param "port" => port,
    param "read_timeout" => read_timeout,
    param "allowed_origins" => allowed_origins,
});

schema!(DbSection {
    param "url" => url,
    param "pool_size" => pool_size,
});

schema!(LogSection { param "level" => level });

schema!(Config {
    nested "server" => server,
    nested "db" => db,
    nested "log" => log,
    param "dump" => dump,
    param "export" => export,
});

impl Config {
    fn new() -> Self {
        Self {
            server: ServerSection {
                host: Param::new()
                    .with_default("0.0.0.0")
                    .with_description("listen address"),
                port: Param::new()
                    .with_default(8080)
                    .with_description("listen port")
                    .validate(validators::range(1, 65535)),
                read_timeout: Param::new()
                    .with_default(Duration::from_secs(30))
                    .validate(validators::range(
                        Duration::from_secs(1),
                        Duration::from_secs(300),
                    )),
                allowed_origins: Param::new().with_description("CORS origins"),
            },
            db: DbSection {
                url: Param::new()
                    .required()
                    .secret()
                    .with_description("database connection string"),
                pool_size: Param::new()
                    .with_default(10)
                    .validate(validators::positive()),
            },
            log: LogSection {
                level: Param::new()
                    .with_default("info")
                    .validate(validators::one_of::<String, _>([
                        "trace", "debug", "info", "warn", "error",
                    ])),
            },
            dump: Param::new().with_description("print the resolved configuration"),
            export: Param::new().with_description("print the configuration as YAML"),
        }
    }
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = Options::new()
        .with_config_paths(default_config_paths("demo"))
        .with_env_prefix("DEMO")
        .with_args(std::env::args().skip(1));

    let mut config = Config::new();
    load(&mut config, &options).context("invalid configuration")?;

    if *config.dump.get() {
        println!("{}", dump(&mut config));
        return Ok(());
    }
    if *config.export.get() {
        print!("{}", serde_yaml::to_string(&export(&mut config))?);
        return Ok(());
    }

    info!(
        host = %config.server.host.get(),
        port = config.server.port.get(),
        origins = config.server.allowed_origins.get().len(),
        "would start server"
    );
    Ok(())
}

//! Integration tests for layered resolution.
//!
//! Covers:
//! - priority order across command line, environment, file and default
//! - type coercion from text and from YAML nodes
//! - error aggregation (parse, validation, required)
//! - config file discovery and fatal file errors
//! - multi-schema loading

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tierconf::{
    BoolParam, DurationListParam, DurationParam, Error, ErrorCode, FieldError, FloatParam,
    IntListParam, IntParam, Loader, Options, Param, SourceKind, StringListParam, StringParam,
    load, schema, validators,
};

struct Database {
    host: StringParam,
    port: IntParam,
    password: StringParam,
}

struct Server {
    name: StringParam,
    timeout: DurationParam,
    debug: BoolParam,
    ratio: FloatParam,
    tags: StringListParam,
    db: Database,
}

schema!(Database {
    param "host" => host,
    param "port" => port,
    param "password" => password,
});

schema!(Server {
    param "name" => name,
    param "timeout" => timeout,
    param "debug" => debug,
    param "ratio" => ratio,
    param "tags" => tags,
    nested "db" => db,
});

fn server() -> Server {
    Server {
        name: Param::new().with_default("default-name"),
        timeout: Param::new().with_default(Duration::from_secs(30)),
        debug: Param::new(),
        ratio: Param::new().with_default(0.5),
        tags: Param::new(),
        db: Database {
            host: Param::new().with_default("localhost"),
            port: Param::new()
                .with_default(5432)
                .validate(validators::range(1, 65535)),
            password: Param::new().secret(),
        },
    }
}

/// Write `content` as `config.yaml` in a fresh directory.
fn config_file(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

fn no_env() -> Vec<(String, String)> {
    Vec::new()
}

// =============================================================================
// Priority
// =============================================================================

#[test]
fn test_priority_ladder() {
    let (_dir, path) = config_file("name: from-file\n");

    let all = Options::new()
        .with_config_file(&path)
        .with_env_vars([("NAME", "from-env")])
        .with_args(["--name", "from-cli"]);
    let mut cfg = server();
    load(&mut cfg, &all).unwrap();
    assert_eq!(cfg.name.get(), "from-cli");
    assert_eq!(cfg.name.source(), Some(SourceKind::CommandLine));

    let no_cli = Options::new()
        .with_config_file(&path)
        .with_env_vars([("NAME", "from-env")]);
    let mut cfg = server();
    load(&mut cfg, &no_cli).unwrap();
    assert_eq!(cfg.name.get(), "from-env");
    assert_eq!(cfg.name.source(), Some(SourceKind::Environment));

    let file_only = Options::new().with_config_file(&path).with_env_vars(no_env());
    let mut cfg = server();
    load(&mut cfg, &file_only).unwrap();
    assert_eq!(cfg.name.get(), "from-file");
    assert_eq!(cfg.name.source(), Some(SourceKind::File));

    let nothing = Options::new().with_env_vars(no_env());
    let mut cfg = server();
    load(&mut cfg, &nothing).unwrap();
    assert_eq!(cfg.name.get(), "default-name");
    assert!(!cfg.name.is_set());
}

#[test]
fn test_unset_parameter_without_default_keeps_zero_value() {
    let mut cfg = server();
    load(&mut cfg, &Options::new().with_env_vars(no_env())).unwrap();
    assert!(!*cfg.debug.get());
    assert!(!cfg.debug.is_set());
    assert!(cfg.tags.get().is_empty());
}

#[test]
fn test_env_prefix() {
    let mut cfg = server();
    let options = Options::new()
        .with_env_prefix("APP")
        .with_env_vars([("APP_DB_HOST", "db.internal"), ("DB_PORT", "1")]);
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.db.host.get(), "db.internal");
    // unprefixed variables are not consulted
    assert_eq!(*cfg.db.port.get(), 5432);
    assert!(!cfg.db.port.is_set());
}

// =============================================================================
// Coercion
// =============================================================================

#[test]
fn test_cli_list_and_flags() {
    let mut cfg = server();
    let options = Options::new()
        .with_env_vars(no_env())
        .with_args(["--tags=a,b,c", "--debug", "--timeout", "1m30s"]);
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.tags.get(), &vec!["a", "b", "c"]);
    assert!(*cfg.debug.get());
    assert_eq!(*cfg.timeout.get(), Duration::from_secs(90));
}

#[test]
fn test_required_list_from_cli() {
    struct Tagged {
        tags: StringListParam,
    }
    schema!(Tagged { param "tags" => tags });

    let mut cfg = Tagged {
        tags: Param::new().required(),
    };
    let options = Options::new()
        .with_env_vars(no_env())
        .with_args(["--tags=a,b,c"]);
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.tags.get(), &vec!["a", "b", "c"]);
    assert_eq!(cfg.tags.source(), Some(SourceKind::CommandLine));
}

#[test]
fn test_empty_list_text_is_empty_list() {
    let mut cfg = server();
    let options = Options::new()
        .with_env_vars([("TAGS", "")])
        .with_args(Vec::<String>::new());
    load(&mut cfg, &options).unwrap();
    assert!(cfg.tags.get().is_empty());
    assert!(cfg.tags.is_set());
}

#[test]
fn test_custom_list_separator() {
    let mut cfg = server();
    let options = Options::new()
        .with_env_vars([("TAGS", "x;y")])
        .with_list_separator(";");
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.tags.get(), &vec!["x", "y"]);
}

#[test]
fn test_file_non_finite_floats() {
    let (_dir, path) = config_file("ratio: .inf\n");
    let mut cfg = server();
    let options = Options::new().with_config_file(&path).with_env_vars(no_env());
    load(&mut cfg, &options).unwrap();
    assert!(cfg.ratio.get().is_infinite());
    assert!(cfg.ratio.get().is_sign_positive());
    assert_eq!(cfg.ratio.source(), Some(SourceKind::File));

    fs::write(&path, "ratio: -.inf\n").unwrap();
    load(&mut cfg, &options).unwrap();
    assert_eq!(*cfg.ratio.get(), f64::NEG_INFINITY);

    fs::write(&path, "ratio: .nan\n").unwrap();
    load(&mut cfg, &options).unwrap();
    assert!(cfg.ratio.get().is_nan());
    assert!(cfg.ratio.is_set());
}

#[test]
fn test_file_values_keep_their_types() {
    let (_dir, path) = config_file(
        r#"
name: svc
timeout: 45s
debug: true
ratio: 0.75
tags: [red, green]
db:
  host: example.com
  port: 6543
  password: hunter2
"#,
    );
    let mut cfg = server();
    load(
        &mut cfg,
        &Options::new().with_config_file(&path).with_env_vars(no_env()),
    )
    .unwrap();

    assert_eq!(cfg.name.get(), "svc");
    assert_eq!(*cfg.timeout.get(), Duration::from_secs(45));
    assert!(*cfg.debug.get());
    assert_eq!(*cfg.ratio.get(), 0.75);
    assert_eq!(cfg.tags.get(), &vec!["red", "green"]);
    assert_eq!(cfg.db.host.get(), "example.com");
    assert_eq!(*cfg.db.port.get(), 6543);
    assert_eq!(cfg.db.password.get(), "hunter2");
    assert_eq!(cfg.db.password.source(), Some(SourceKind::File));
}

#[test]
fn test_file_list_may_be_a_string() {
    let (_dir, path) = config_file("tags: \"a,b\"\n");
    let mut cfg = server();
    load(
        &mut cfg,
        &Options::new().with_config_file(&path).with_env_vars(no_env()),
    )
    .unwrap();
    assert_eq!(cfg.tags.get(), &vec!["a", "b"]);
}

#[test]
fn test_typed_lists() {
    struct Lists {
        ports: IntListParam,
        waits: DurationListParam,
    }
    schema!(Lists { param "ports" => ports, param "waits" => waits });

    let mut lists = Lists {
        ports: Param::new(),
        waits: Param::new(),
    };
    let options = Options::new()
        .with_env_vars([("PORTS", "80, 443"), ("WAITS", "1s,250ms")]);
    load(&mut lists, &options).unwrap();
    assert_eq!(lists.ports.get(), &vec![80, 443]);
    assert_eq!(
        lists.waits.get(),
        &vec![Duration::from_secs(1), Duration::from_millis(250)]
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_validation_failure_leaves_other_keys_resolved() {
    let mut cfg = server();
    let options = Options::new().with_env_vars([("DB_PORT", "99999")]);
    let err = load(&mut cfg, &options).unwrap_err();

    let errors = err.load_errors().expect("expected aggregated errors");
    assert_eq!(errors.len(), 1);
    match errors.iter().next() {
        Some(FieldError::Validation(e)) => {
            assert_eq!(e.key, "db.port");
            assert_eq!(e.value, "99999");
            assert_eq!(e.message, "value 99999 is not in range [1, 65535]");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    // the coerced value is kept even though it failed validation
    assert_eq!(*cfg.db.port.get(), 99999);
    assert_eq!(cfg.db.host.get(), "localhost");
    assert!(!cfg.db.host.is_set());
}

#[test]
fn test_bad_duration_reports_parse_error_only() {
    struct Timeouts {
        timeout: DurationParam,
    }
    schema!(Timeouts { param "timeout" => timeout });

    let mut cfg = Timeouts {
        timeout: Param::new()
            .required()
            .validate(|_| Err("must not run".to_owned())),
    };
    let options = Options::new()
        .with_env_vars(no_env())
        .with_args(["--timeout", "not-a-duration"]);
    let err = load(&mut cfg, &options).unwrap_err();
    let errors = err.load_errors().unwrap();

    assert_eq!(errors.len(), 1);
    let codes: Vec<ErrorCode> = errors.iter().map(FieldError::code).collect();
    assert_eq!(codes, vec![ErrorCode::Parse]);
    match errors.iter().next() {
        Some(FieldError::Parse(e)) => {
            assert_eq!(e.key, "timeout");
            assert_eq!(e.value, "not-a-duration");
            assert_eq!(e.expected, "duration");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(!cfg.timeout.is_set());
}

#[test]
fn test_bad_list_element_is_named() {
    struct Nums {
        nums: IntListParam,
    }
    schema!(Nums { param "nums" => nums });

    let mut cfg = Nums {
        nums: Param::new(),
    };
    let err = load(&mut cfg, &Options::new().with_env_vars([("NUMS", "1,x,3")])).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\"x\""), "{message}");
    assert!(message.contains("\"nums\""), "{message}");
    assert!(cfg.nums.get().is_empty());
}

#[test]
fn test_all_errors_are_collected() {
    struct Required {
        token: StringParam,
        workers: IntParam,
        level: StringParam,
        port: IntParam,
    }
    schema!(Required {
        param "token" => token,
        param "workers" => workers,
        param "level" => level,
        param "port" => port,
    });

    let mut cfg = Required {
        token: Param::new().required().secret(),
        workers: Param::new().validate(validators::positive()),
        level: Param::new()
            .with_default("info")
            .validate(validators::one_of::<String, _>(["debug", "info"])),
        port: Param::new(),
    };
    let options = Options::new()
        .with_env_vars([("LEVEL", "loud"), ("PORT", "http")]);
    let err = load(&mut cfg, &options).unwrap_err();
    let errors = err.load_errors().unwrap();

    let found: Vec<(&str, ErrorCode)> = errors.iter().map(|e| (e.key(), e.code())).collect();
    assert_eq!(
        found,
        vec![
            ("token", ErrorCode::Required),
            ("workers", ErrorCode::Validation),
            ("level", ErrorCode::Validation),
            ("port", ErrorCode::Parse),
        ]
    );
    let message = err.to_string();
    assert!(message.starts_with("4 configuration errors:\n  - "), "{message}");
    assert_eq!(message.lines().count(), 5);
}

#[test]
fn test_required_with_default_is_satisfied() {
    struct Req {
        mode: StringParam,
    }
    schema!(Req { param "mode" => mode });

    let mut cfg = Req {
        mode: Param::new().with_default("fast").required(),
    };
    load(&mut cfg, &Options::new().with_env_vars(no_env())).unwrap();
    assert_eq!(cfg.mode.get(), "fast");
}

#[test]
fn test_cli_duplicate_last_wins() {
    let mut cfg = server();
    let options = Options::new()
        .with_env_vars(no_env())
        .with_args(["--db.port=1000", "--db.port", "2000"]);
    load(&mut cfg, &options).unwrap();
    assert_eq!(*cfg.db.port.get(), 2000);
}

// =============================================================================
// Config files
// =============================================================================

#[test]
fn test_missing_explicit_file_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let mut cfg = server();
    let options = Options::new()
        .with_config_file(dir.path().join("absent.yaml"))
        .with_env_vars(no_env());
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.name.get(), "default-name");
}

#[test]
fn test_malformed_file_is_fatal() {
    let (_dir, path) = config_file("db:\n  port: [1, 2\n");
    let mut cfg = server();
    let err = load(
        &mut cfg,
        &Options::new()
            .with_config_file(&path)
            .with_args(["--name", "ignored"]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ParseFile { .. }));
    assert!(err.load_errors().is_none());
    // nothing was resolved
    assert_eq!(cfg.name.get(), "default-name");
}

#[test]
fn test_config_paths_use_first_existing() {
    let (_dir, path) = config_file("name: discovered\n");
    let mut cfg = server();
    let options = Options::new()
        .with_config_paths([
            "/nonexistent/config.yaml".to_owned(),
            path.to_string_lossy().into_owned(),
        ])
        .with_env_vars(no_env());
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.name.get(), "discovered");
}

#[test]
fn test_explicit_file_overrides_config_paths() {
    let (_a, explicit) = config_file("name: explicit\n");
    let (_b, searched) = config_file("name: searched\n");
    let mut cfg = server();
    let options = Options::new()
        .with_config_file(&explicit)
        .with_config_paths([searched.to_string_lossy().into_owned()])
        .with_env_vars(no_env());
    load(&mut cfg, &options).unwrap();
    assert_eq!(cfg.name.get(), "explicit");
}

#[test]
fn test_null_in_file_falls_through_to_default() {
    let (_dir, path) = config_file("name: ~\n");
    let mut cfg = server();
    load(
        &mut cfg,
        &Options::new().with_config_file(&path).with_env_vars(no_env()),
    )
    .unwrap();
    assert_eq!(cfg.name.get(), "default-name");
    assert!(!cfg.name.is_set());
}

// =============================================================================
// Multiple schemas
// =============================================================================

#[test]
fn test_loader_resolves_all_schemas_in_one_pass() {
    let (_dir, path) = config_file("api:\n  db:\n    host: api-db\nworker:\n  name: w1\n");
    let mut api = server();
    let mut worker = server();

    let mut loader = Loader::new(
        Options::new()
            .with_config_file(&path)
            .with_env_vars([("WORKER_DB_PORT", "0")]),
    );
    loader.register("api", &mut api).register("worker", &mut worker);
    let err = loader.load().unwrap_err();
    drop(loader);

    let errors = err.load_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().map(|e| e.key()), Some("worker.db.port"));

    assert_eq!(api.db.host.get(), "api-db");
    assert_eq!(api.db.host.key(), "api.db.host");
    assert_eq!(worker.name.get(), "w1");
    assert_eq!(worker.db.host.get(), "localhost");
}

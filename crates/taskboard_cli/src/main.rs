//! Command-line entry point.
//!
//! Usage:
//!
//! ```text
//! taskboard_cli '<command-json>'
//! taskboard_cli <command> ['<args-json>']
//! taskboard_cli version
//! ```
//!
//! Prints one JSON envelope to stdout: `{"ok":true,"result":...}` or
//! `{"ok":false,"error":{"kind":...,"message":...}}`. Exits 1 on failure.

mod config;

use config::TaskboardConfig;
use log::error;
use serde_json::{json, Value};
use std::process::ExitCode;
use taskboard_core::{Command, EntityStore, ServiceError, SqliteKvStore, TaskService};

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = TaskboardConfig::from_env();

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = taskboard_core::init_logging(&config.log_level, log_dir) {
            eprintln!("taskboard: logging disabled: {err}");
        }
    }

    let (envelope, ok) = match run(&config, &args) {
        Ok(result) => (json!({ "ok": true, "result": result }), true),
        Err(err) => (failure_envelope(&err), false),
    };
    println!("{envelope}");

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(config: &TaskboardConfig, args: &[String]) -> Result<Value, ServiceError> {
    if let [flag] = args {
        if flag == "version" || flag == "--version" {
            return Ok(version_info());
        }
    }
    let command = parse_args(args)?;
    let kv = SqliteKvStore::open(&config.db_path).map_err(|err| {
        error!(
            "event=cli_open module=cli status=error db_path={} error={}",
            config.db_path.display(),
            err
        );
        ServiceError::Store(err.into())
    })?;
    TaskService::new(EntityStore::new(kv)).execute(command)
}

/// Reports the core version and the active logger, without touching the database.
fn version_info() -> Value {
    let logging = taskboard_core::logging_status().map(|(level, log_dir)| {
        json!({ "level": level, "logDir": log_dir.display().to_string() })
    });
    json!({
        "version": taskboard_core::core_version(),
        "logging": logging,
    })
}

fn parse_args(args: &[String]) -> Result<Command, ServiceError> {
    match args {
        [single] if single.trim_start().starts_with('{') => Command::from_json(single),
        [name] => Command::from_parts(name, None),
        [name, raw_args] => Command::from_parts(name, Some(raw_args)),
        _ => Err(ServiceError::InvalidInput(
            "usage: taskboard_cli '<command-json>' | <command> ['<args-json>']".to_string(),
        )),
    }
}

fn failure_envelope(err: &ServiceError) -> Value {
    json!({
        "ok": false,
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
}

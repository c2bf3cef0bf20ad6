//! CLI smoke entry point.
//!
//! Opens an in-memory registry with default configuration and prints
//! linkage and schema facts. Exits non-zero when bootstrap fails.
//!
//! Set `INFINIVERSE_LOG_DIR` to also write rolling log files there.

use infiniverse_core::db::migrations::current_user_version;
use infiniverse_core::db::open_db_in_memory;
use infiniverse_core::{
    core_version, default_log_level, init_logging, LogTransferSink, Registry, RegistryConfig,
};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "INFINIVERSE_LOG_DIR";

fn main() -> ExitCode {
    println!("infiniverse_core version={}", core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let level = default_log_level();
        if let Err(err) = init_logging(level, &log_dir) {
            eprintln!("infiniverse logging init failed: {err}");
            return ExitCode::FAILURE;
        }
        println!("infiniverse_core log_level={level} log_dir={log_dir}");
    }

    let registry = match open_db_in_memory()
        .map_err(|err| err.to_string())
        .and_then(|conn| {
            Registry::new(conn, RegistryConfig::default(), LogTransferSink)
                .map_err(|err| err.to_string())
        }) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("infiniverse registry bootstrap failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    match current_user_version(registry.connection()) {
        Ok(version) => println!("infiniverse_core schema_version={version}"),
        Err(err) => {
            eprintln!("infiniverse schema probe failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    let config = registry.config();
    println!(
        "infiniverse_core fee={} {}/sqm max_land_length_m={}",
        config.inf_per_sqm, config.currency_code, config.max_land_length_m
    );
    ExitCode::SUCCESS
}

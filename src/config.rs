use std::{env, net::{SocketAddr, ToSocketAddrs as _}, path::PathBuf};

use sea_orm::ConnectOptions;
use thiserror::Error;
use tracing::info;

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    /// Optional JSON file overriding or extending the built-in rate tables
    pub rate_tables_path: Option<PathBuf>,

    pub run_migrations: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment `{0}` is required to be set")]
    Missing(&'static str),

    #[error("environment `{name}` is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub fn load() -> Result<Config, ConfigError> {
    load_from(|name| env::var(name).ok())
}

/// Where the TRACE-level log file goes. Read before the subscriber exists.
pub fn load_trace_log_path() -> PathBuf {
    env::var("TRACE_LOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("trace.log"))
}

fn load_from(var: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    Ok(Config {
        host_address: load_host_address(&var)?,
        database_opt: load_database_opt(&var)?,
        rate_tables_path: load_rate_tables_path(&var),
        run_migrations: load_run_migrations(&var)?,
    })
}

fn load_host_address(var: impl Fn(&str) -> Option<String>) -> Result<SocketAddr, ConfigError> {
    info!("Loading environment `HOST_ADDRESS`");

    let var = var("HOST_ADDRESS").unwrap_or_else(|| "127.0.0.1:0".to_string());

    var.to_socket_addrs()
        .map_err(|e| ConfigError::Invalid { name: "HOST_ADDRESS", reason: e.to_string() })?
        .next()
        .ok_or_else(|| ConfigError::Invalid { name: "HOST_ADDRESS", reason: "unable to resolve host".to_string() })
}

fn load_database_opt(var: impl Fn(&str) -> Option<String>) -> Result<ConnectOptions, ConfigError> {
    info!("Loading environment `DATABASE_URL`");

    let var = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

    Ok(var.into())
}

fn load_rate_tables_path(var: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    info!("Loading environment `RATE_TABLES_PATH`");

    var("RATE_TABLES_PATH")
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

fn load_run_migrations(var: impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
    info!("Loading environment `RUN_MIGRATIONS`");

    match var("RUN_MIGRATIONS").as_deref().map(str::trim) {
        None | Some("") => Ok(true),
        Some("1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(ConfigError::Invalid { name: "RUN_MIGRATIONS", reason: format!("expected a boolean, got `{other}`") }),
    }
}

use crate::util::parse_bool_flag;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_PATH: &str = "/tmp/quill.log";
const LOG_FILTER_ENV: &str = "QUILL_LOG";
const LOG_PATH_ENV: &str = "QUILL_LOG_PATH";
const DEBUG_PAYLOAD_ENV: &str = "QUILL_DEBUG_PAYLOAD";

pub fn debug_payload_enabled() -> bool {
    std::env::var(DEBUG_PAYLOAD_ENV)
        .ok()
        .and_then(parse_bool_flag)
        .unwrap_or(false)
}

pub fn emit_debug_payload<T: Serialize>(request_url: &str, payload: &T) {
    let formatted = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| "<payload serialization error>".to_string());
    tracing::debug!(url = request_url, payload = %formatted, "outgoing request payload");
}

/// Install the global subscriber.
///
/// A full-screen session owns the terminal, so logs go to a file whenever
/// `to_file` is set or `QUILL_LOG_PATH` names one.
pub fn init(to_file: bool) -> Result<()> {
    let filter = resolve_filter();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match resolve_log_path(to_file) {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|error| anyhow::anyhow!("failed to install logger: {error}"))
        }
        None => builder
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow::anyhow!("failed to install logger: {error}")),
    }
}

fn resolve_filter() -> EnvFilter {
    std::env::var(LOG_FILTER_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value.trim()).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn resolve_log_path(to_file: bool) -> Option<PathBuf> {
    std::env::var(LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| to_file.then(|| PathBuf::from(DEFAULT_LOG_PATH)))
}

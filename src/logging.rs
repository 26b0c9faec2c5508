use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

fn env_filter(verbose: u8) -> Result<EnvFilter> {
    let default_level = match verbose {
        0 => DEFAULT_LEVEL,
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Log to a file. The terminal belongs to the TUI while it runs.
pub fn init_file_logging(path: &Path, verbose: u8) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose)?)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Log to stderr for one-shot commands
pub fn init_stderr_logging(verbose: u8) -> Result<()> {
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose)?)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

use extractor_data::progress::CancelFlag;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI log level (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) to a
/// `tracing` filter directive. Unknown values are passed through lowercased.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber on stderr.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Ctrl+C ─────────────────────────────────────────────────────────────────────

/// Set `cancel` when the process receives Ctrl+C. The engine stops at the next
/// file boundary.
pub fn install_cancel_handler(cancel: &CancelFlag) -> anyhow::Result<()> {
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("Ctrl+C received; stopping after the current file");
        flag.cancel();
    })?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

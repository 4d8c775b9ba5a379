//! Tracing setup: console stream plus a per-run file stream
//!
//! Every run logs to two places: the console (env-filterable, compact) and
//! the run's `<run_id>_runlog` file so the artifact directory carries the
//! full harness log next to the benchmark result and the excerpts.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::HarnessResult;

/// Initialize the global subscriber. Call once, before any component runs.
pub fn init_tracing(runlog: &Path, log_level: &str) -> HarnessResult<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(runlog)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ha_harness={log_level}")));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

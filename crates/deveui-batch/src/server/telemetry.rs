//! Log output of the binary.
//!
//! Events from the engine and the daemon go to stderr through a
//! human-readable `fmt` layer, so stdout carries only the result table in
//! one-shot mode. `RUST_LOG` overrides the default level, which is `info`, or
//! `debug` with `--verbose`.
//!
//! With `--log-file`, the same events are also written as JSON lines through a
//! non-blocking `tracing-appender` writer. The returned [`TelemetryGuard`]
//! must be held until exit so buffered lines get flushed.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub struct TelemetryGuard {
    _file: Option<WorkerGuard>,
}

pub fn init_telemetry(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<TelemetryGuard> {
    let default_level = if verbose { "debug" } else { "info" };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(verbose)
        .with_line_number(verbose)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        );

    let (file, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_current_span(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(TelemetryGuard { _file: guard })
}

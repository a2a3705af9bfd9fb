// SPDX-License-Identifier: MIT

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use taskd::{config::ServerConfig, http, store::TaskStore, AppContext};

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — minimal task-tracking HTTP service",
    version
)]
struct Args {
    /// HTTP listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Bind address (default: 0.0.0.0)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Log output format: "pretty" (default) | "json"
    #[arg(long, env = "TASKD_LOG_FORMAT")]
    log_format: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Path to a TOML config file. Optional.
    #[arg(long, env = "TASKD_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServerConfig::new(
        args.port,
        args.bind_address,
        args.log,
        args.log_format,
        args.config.as_deref(),
    );

    let _log_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        "starting taskd"
    );

    let ctx = Arc::new(AppContext {
        config: Arc::new(config),
        store: Arc::new(TaskStore::new()),
        started_at: std::time::Instant::now(),
    });

    http::serve(ctx).await
}

/// Initialize tracing: stdout always, plus an optional daily-rotated file.
///
/// Returns the appender guard; dropping it stops the background writer, so
/// the caller must hold it for the process lifetime.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only, don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e}, falling back to stdout",
                dir.display()
            );
            init_stdout(log_level, use_json);
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
        Some(guard)
    } else {
        init_stdout(log_level, use_json);
        None
    }
}

fn init_stdout(log_level: &str, use_json: bool) {
    use tracing_subscriber::EnvFilter;

    if use_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::new(log_level))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .compact()
            .init();
    }
}

//! Memo-Scribe: crash-safe microphone recorder with a recording library and
//! subtitle export, driven by line commands on stdin.

mod app;
mod command;
mod config;
mod device;
mod error;
mod store;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    command::AppCommand,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "memo_scribe=debug,memo_scribe_core=debug";

/// Application entry point.
fn main() {
    let _log_guard = match init_tracing() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result: AppResult<()> = rt.block_on(async {
        let app = App::new(config)?;
        app.run().await
    });

    if let Err(e) = result {
        error!("Application error: {:?}", e);
        std::process::exit(1);
    }

    info!("Exited cleanly");
}

/// Human-readable logs on stderr, JSON lines in a daily log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> AppResult<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(Config::log_dir()?, "memo-scribe.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().json().with_writer(file_writer))
        .init();

    Ok(guard)
}

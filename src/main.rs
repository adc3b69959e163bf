// Finpulse - budget alert engine
//
// Watches a persisted financial plan and dispatches alerts (income received,
// goal progress, budget overspend, upcoming bills) over email and desktop
// notifications, with per-channel settings, a per-key cooldown and a
// bounded dispatch history.
//
// Architecture:
// - Watcher: periodically reloads the plan and derives due alerts
// - Notification service: cooldown gate -> channel eligibility -> dispatch
// - Channels: HTTP email endpoint and native desktop notifications
// - Storage: independent JSON state blobs under the data directory
// - Metrics: pure derived computations over the plan (no state)

mod cli;
mod config;
mod metrics;
mod notifications;
mod plan;
mod storage;
mod watcher;

use anyhow::Result;
use config::{Config, LogRotation};
use notifications::channels::{HttpEmailTransport, NativeNotifier};
use notifications::service::NotificationService;
use storage::StateFiles;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, ...; history)
    // If a command was handled, exit early
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // Initialize tracing/logging
    // Precedence: RUST_LOG env var > config file > default "info"
    // File logging optionally writes JSON to rotating files in addition
    // to stdout
    let default_filter = format!("finpulse={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // The guard must be kept alive for the duration of the program to
    // ensure buffered file logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> = if config
        .logging
        .file_enabled
    {
        if let Err(e) = std::fs::create_dir_all(&config.logging.file_dir) {
            eprintln!(
                "Warning: Could not create log directory {:?}: {}",
                config.logging.file_dir, e
            );
            // Fall back to stdout-only logging
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        } else {
            let file_appender = match config.logging.file_rotation {
                LogRotation::Hourly => tracing_appender::rolling::hourly(
                    &config.logging.file_dir,
                    &config.logging.file_prefix,
                ),
                LogRotation::Daily => tracing_appender::rolling::daily(
                    &config.logging.file_dir,
                    &config.logging.file_prefix,
                ),
                LogRotation::Never => tracing_appender::rolling::never(
                    &config.logging.file_dir,
                    &config.logging.file_prefix,
                ),
            };

            // Writes happen in a background thread
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();

            Some(guard)
        }
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        None
    };

    tracing::info!(
        version = config::VERSION,
        data_dir = %config.data_dir.display(),
        interval_secs = config.check_interval_secs,
        "Starting finpulse"
    );
    if config.email.to.is_empty() {
        tracing::warn!(
            "No email recipient configured (set FINPULSE_EMAIL_TO or [email] to in the config \
             file); email alerts will fail until one is set"
        );
    }

    let files = StateFiles::new(&config.data_dir)?;
    let transport = HttpEmailTransport::new(&config.email.endpoint)?;
    let service = NotificationService::new(
        &files,
        transport,
        NativeNotifier::new(),
        config.email.to.clone(),
    );

    // Oneshot shutdown signal: Ctrl+C flips it, the watcher drains and exits
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down...");
            let _ = shutdown_tx.send(());
        }
    });

    watcher::run(
        service,
        files,
        std::time::Duration::from_secs(config.check_interval_secs),
        shutdown_rx,
    )
    .await;

    tracing::info!("Shutdown complete");
    Ok(())
}

use std::{sync::Arc, time::Duration};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::{BackendKind, Config},
    error::AppError,
    service::{
        backend::{
            simulated::{SimulatedBackend, SimulatedOptions},
            tmux::TmuxBackend,
            ServerBackend,
        },
        rcon::RconClient,
        supervisor::ServerControl,
    },
};

const DEFAULT_LOG_FILTER: &str = "info,craftwarden=debug";
const RCON_TIMEOUT: Duration = Duration::from_secs(5);

/// Installs the global tracing subscriber.
///
/// Logs go to stdout and to a daily rolling `bot.log` in `BOT_LOG_DIR`. The filter
/// is read from `RUST_LOG` and defaults to `info,craftwarden=debug`.
///
/// # Returns
/// - `Ok(WorkerGuard)` - Guard that flushes the file writer; keep it alive until exit
/// - `Err(AppError::IoErr)` - Log directory could not be created
pub fn init_tracing(config: &Config) -> Result<WorkerGuard, AppError> {
    std::fs::create_dir_all(&config.bot_log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.bot_log_dir, "bot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

/// Creates the process backend selected by `SERVER_BACKEND`.
pub fn build_backend(config: &Config) -> Arc<dyn ServerBackend> {
    match config.backend {
        BackendKind::Tmux => {
            let rcon = RconClient::new(
                &config.rcon_host,
                config.rcon_port,
                &config.rcon_password,
                RCON_TIMEOUT,
            );
            Arc::new(TmuxBackend::new(config, rcon))
        }
        BackendKind::Simulated => {
            tracing::warn!("Using the simulated backend; no server process will be launched");
            Arc::new(SimulatedBackend::new(SimulatedOptions::realistic()))
        }
    }
}

/// One-message summary posted to the debug channel once the bot is up.
pub async fn boot_summary(
    config: &Config,
    backend: &dyn ServerBackend,
    control: &dyn ServerControl,
) -> String {
    let running = control.is_running().await;

    format!(
        "🤖 Bot started\n\
         Backend: {}\n\
         Server: {}\n\
         Stopped on purpose: {}\n\
         Crash check every {}s, up to {} restart attempts\n\
         Backups '{}', nightly restart '{}'",
        backend.describe(),
        if running { "Online" } else { "Offline" },
        control.is_intentionally_stopped(),
        config.crash_check_interval.as_secs(),
        config.max_restart_attempts,
        config.backup_cron,
        config.restart_cron,
    )
}

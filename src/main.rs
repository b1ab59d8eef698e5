mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod startup;
mod state;
mod util;

use std::{sync::Arc, time::Duration};

use serenity::http::Http;
use tokio::sync::watch;

use crate::{
    config::Config,
    data::state_store::StateStore,
    error::AppError,
    scheduler::maintenance,
    service::{
        backup::BackupService,
        log_tail::{self, LogRelay, RelaySettings},
        notifier::{DiscordNotifier, Notifier},
        supervisor::{ServerControl, Supervisor, SupervisorSettings},
        watchdog::CrashWatchdog,
    },
    state::AppState,
};

const LOG_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let _log_guard = startup::init_tracing(&config)?;

    tracing::info!("Starting craftwarden");

    let backend = startup::build_backend(&config);
    let store = StateStore::new(config.state_file.clone());
    let supervisor =
        Supervisor::boot(backend.clone(), store, SupervisorSettings::from(&config)).await?;
    let control: Arc<dyn ServerControl> = Arc::new(supervisor);

    // The notifier needs its own HTTP handle since the client does not exist yet
    let http = Arc::new(Http::new(&config.discord_bot_token));
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(http, &config));
    let backups = Arc::new(BackupService::new(control.clone(), &config));

    let (players_tx, players_rx) = watch::channel(0);
    let state = AppState::new(
        config.discord_guild_id,
        control.clone(),
        backups.clone(),
        notifier.clone(),
        players_rx,
    );

    let bot_client = bot::start::init_bot(&config.discord_bot_token, state).await?;

    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let summary = startup::boot_summary(&config, backend.as_ref(), control.as_ref()).await;
    notifier.debug(&summary).await;

    let watchdog = Arc::new(CrashWatchdog::new(
        control.clone(),
        notifier.clone(),
        config.max_restart_attempts,
        config.crash_check_interval,
    ));
    tokio::spawn(watchdog.run());

    let relay = LogRelay::new(
        notifier.clone(),
        RelaySettings {
            mirror: config.log_mirror,
            blacklist: config.log_blacklist.clone(),
        },
        players_tx,
    );
    tokio::spawn(log_tail::run(config.latest_log(), relay, LOG_POLL_INTERVAL));

    maintenance::start_scheduler(&config, control.clone(), backups, notifier.clone()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down; the Minecraft server is left running");

    Ok(())
}

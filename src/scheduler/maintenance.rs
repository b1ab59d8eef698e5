use std::sync::Arc;

use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    config::Config,
    error::AppError,
    model::{backup::BackupKind, status::PlayerList},
    service::{backup::BackupService, notifier::Notifier, supervisor::ServerControl},
};

/// Result of one nightly restart run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NightlyOutcome {
    Restarted,
    SkippedNotRunning,
    SkippedPlayersOnline(u32),
    /// The player count could not be determined, so nobody is kicked blindly.
    SkippedUnknownPlayers,
    Failed(String),
}

/// Starts the maintenance scheduler.
///
/// Two jobs run in local time:
/// - a daily auto backup at `BACKUP_CRON`
/// - a nightly restart at `RESTART_CRON`, only when nobody is online
///
/// # Arguments
/// - `config` - Cron expressions
/// - `control` - Supervisor used for the restart and the player query
/// - `backups` - Backup service used by the backup job
/// - `notifier` - Destination for job results
pub async fn start_scheduler(
    config: &Config,
    control: Arc<dyn ServerControl>,
    backups: Arc<BackupService>,
    notifier: Arc<dyn Notifier>,
) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job_backups = backups.clone();
    let job_notifier = notifier.clone();
    let backup_job = Job::new_async_tz(config.backup_cron.as_str(), Local, move |_uuid, _lock| {
        let backups = job_backups.clone();
        let notifier = job_notifier.clone();

        Box::pin(async move {
            run_backup(&backups, notifier.as_ref()).await;
        })
    })?;

    let job_control = control.clone();
    let job_notifier = notifier.clone();
    let restart_job = Job::new_async_tz(config.restart_cron.as_str(), Local, move |_uuid, _lock| {
        let control = job_control.clone();
        let notifier = job_notifier.clone();

        Box::pin(async move {
            let outcome = nightly_restart(control.as_ref(), notifier.as_ref()).await;
            tracing::info!("Nightly restart: {:?}", outcome);
        })
    })?;

    scheduler.add(backup_job).await?;
    scheduler.add(restart_job).await?;
    scheduler.start().await?;

    tracing::info!(
        "Maintenance scheduler started (backup '{}', restart '{}')",
        config.backup_cron,
        config.restart_cron
    );

    Ok(())
}

/// Creates the daily auto backup and reports the result.
pub async fn run_backup(backups: &BackupService, notifier: &dyn Notifier) {
    match backups.create(BackupKind::Auto).await {
        Ok(artifact) => {
            notifier
                .debug(&format!(
                    "Backup created: {} ({} files, {} old backups pruned)",
                    artifact.file_name(),
                    artifact.files,
                    artifact.pruned
                ))
                .await;
        }
        Err(e) => {
            tracing::error!("Scheduled backup failed: {}", e);
            notifier.alert(&format!("Scheduled backup failed: {}", e)).await;
        }
    }
}

/// Restarts the server if it is running and empty.
pub async fn nightly_restart(control: &dyn ServerControl, notifier: &dyn Notifier) -> NightlyOutcome {
    if !control.is_running().await {
        return NightlyOutcome::SkippedNotRunning;
    }

    let players = match control.query("list").await {
        Ok(reply) => PlayerList::parse(&reply),
        Err(e) => {
            tracing::warn!("Player query failed before nightly restart: {}", e);
            None
        }
    };

    match players {
        None => {
            notifier
                .debug("Nightly restart skipped: player count unavailable")
                .await;
            NightlyOutcome::SkippedUnknownPlayers
        }
        Some(list) if list.online > 0 => {
            notifier
                .debug(&format!(
                    "Nightly restart skipped: {} player(s) online",
                    list.online
                ))
                .await;
            NightlyOutcome::SkippedPlayersOnline(list.online)
        }
        Some(_) => {
            notifier.log("🔄 Nightly restart in progress").await;

            match control.restart().await {
                Ok(report) if report.success() => {
                    notifier
                        .debug(&format!("Nightly restart: {}", report.message()))
                        .await;
                    NightlyOutcome::Restarted
                }
                Ok(report) => {
                    notifier
                        .alert(&format!("Nightly restart failed: {}", report.message()))
                        .await;
                    NightlyOutcome::Failed(report.message())
                }
                Err(e) => {
                    notifier.alert(&format!("Nightly restart failed: {}", e)).await;
                    NightlyOutcome::Failed(e.to_string())
                }
            }
        }
    }
}

//! Server lifecycle supervisor.
//!
//! Owns the one mutable thing about the managed server: whether it should be
//! running. `start`, `stop` and `restart` are serialized by a single async lock
//! that every caller (Discord commands, the scheduler, the crash watchdog) goes
//! through. A caller that cannot get the lock within `lock_wait` receives a
//! `Busy` report; once the lock is held, the probe is consulted again so a
//! request that queued behind an identical one reports "already running" instead
//! of launching twice.
//!
//! The intentional-stop flag is always persisted before the stop command leaves
//! the bot, and after a start is confirmed alive.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::{watch, Mutex, MutexGuard},
    time::Instant,
};

use crate::{
    config::Config,
    data::state_store::StateStore,
    error::{lifecycle::LifecycleError, transport::TransportError, AppError},
    model::lifecycle::{LifecycleAction, LifecycleOutcome, LifecyclePhase, LifecycleReport},
    service::backend::ServerBackend,
};

#[cfg(test)]
mod test;

/// Console command that shuts a Minecraft server down cleanly.
const STOP_COMMAND: &str = "stop";

/// Timing knobs of the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// How long a launched process has to show up in the probe.
    pub startup_grace: Duration,
    /// How long a stopping process has to exit before it is killed.
    pub shutdown_grace: Duration,
    /// Sleep between probe samples.
    pub probe_interval: Duration,
    /// How long a caller waits for the lifecycle lock before getting `Busy`.
    pub lock_wait: Duration,
    /// Pause between the stop and start halves of a restart.
    pub restart_delay: Duration,
}

impl From<&Config> for SupervisorSettings {
    fn from(config: &Config) -> Self {
        Self {
            startup_grace: config.startup_grace,
            shutdown_grace: config.shutdown_grace,
            probe_interval: config.probe_interval,
            lock_wait: config.lock_wait,
            restart_delay: config.restart_delay,
        }
    }
}

/// Operations the rest of the bot may perform on the managed server.
///
/// Lifecycle methods return `Err` only for unexpected failures such as a state
/// file that cannot be written; every expected outcome is inside the report.
#[async_trait]
pub trait ServerControl: Send + Sync {
    async fn start(&self) -> Result<LifecycleReport, AppError>;
    async fn stop(&self) -> Result<LifecycleReport, AppError>;
    async fn restart(&self) -> Result<LifecycleReport, AppError>;

    async fn is_running(&self) -> bool;
    fn is_intentionally_stopped(&self) -> bool;

    /// Sends a console line. Not serialized with lifecycle operations.
    async fn send_command(&self, text: &str) -> Result<(), TransportError>;
    /// Runs a query command. Not serialized with lifecycle operations.
    async fn query(&self, command: &str) -> Result<String, TransportError>;

    fn phase(&self) -> LifecyclePhase;
    fn subscribe_phase(&self) -> watch::Receiver<LifecyclePhase>;

    /// Number of confirmed successful starts since the bot booted.
    ///
    /// The crash watchdog compares this against its own record to notice that a
    /// start it did not perform succeeded and its attempt counter must reset.
    fn successful_starts(&self) -> u64;
}

pub struct Supervisor {
    backend: Arc<dyn ServerBackend>,
    store: StateStore,
    settings: SupervisorSettings,
    lock: Mutex<()>,
    intentional_stop: AtomicBool,
    successful_starts: AtomicU64,
    phase: watch::Sender<LifecyclePhase>,
}

impl Supervisor {
    /// Creates a supervisor with an already reconciled intentional-stop value.
    pub fn new(
        backend: Arc<dyn ServerBackend>,
        store: StateStore,
        settings: SupervisorSettings,
        intentional_stop: bool,
        running: bool,
    ) -> Self {
        let (phase, _) = watch::channel(LifecyclePhase::observed(running));

        Self {
            backend,
            store,
            settings,
            lock: Mutex::new(()),
            intentional_stop: AtomicBool::new(intentional_stop),
            successful_starts: AtomicU64::new(0),
            phase,
        }
    }

    /// Creates a supervisor after reconciling persisted state with the live process.
    ///
    /// A server found running forces the intentional-stop flag to `false`.
    ///
    /// # Returns
    /// - `Ok(Supervisor)` - Ready supervisor
    /// - `Err(AppError)` - Forced flag could not be persisted
    pub async fn boot(
        backend: Arc<dyn ServerBackend>,
        store: StateStore,
        settings: SupervisorSettings,
    ) -> Result<Self, AppError> {
        let running = backend.is_running().await;
        let intentional_stop = store.reconcile(running).await?;

        tracing::info!(
            "Supervisor ready: running={}, intentional_stop={} (state file {})",
            running,
            intentional_stop,
            store.path().display()
        );

        Ok(Self::new(backend, store, settings, intentional_stop, running))
    }

    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        tokio::time::timeout(self.settings.lock_wait, self.lock.lock())
            .await
            .ok()
    }

    fn set_phase(&self, phase: LifecyclePhase) {
        self.phase.send_if_modified(|current| {
            let changed = *current != phase;
            *current = phase;
            changed
        });
    }

    async fn persist_intentional_stop(&self, value: bool) -> Result<(), AppError> {
        self.store.save(value).await?;
        self.intentional_stop.store(value, Ordering::SeqCst);
        Ok(())
    }

    /// Samples the probe until it matches `want` or `grace` elapses.
    async fn wait_for(&self, want: bool, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;

        loop {
            if self.backend.is_running().await == want {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(self.settings.probe_interval.min(deadline - now)).await;
        }
    }

    /// Start with the lock held.
    async fn start_locked(&self) -> Result<Result<LifecycleOutcome, LifecycleError>, AppError> {
        if self.backend.is_running().await {
            self.set_phase(LifecyclePhase::Running);
            return Ok(Ok(LifecycleOutcome::AlreadyInDesiredState(
                LifecyclePhase::Running,
            )));
        }

        if let Err(e) = self.backend.check_launchable().await {
            tracing::error!("Server cannot be launched: {}", e);
            return Ok(Err(e));
        }

        self.set_phase(LifecyclePhase::Starting);
        tracing::info!("Starting server ({})", self.backend.describe());

        if let Err(e) = self.backend.launch().await {
            tracing::error!("Launch failed: {}", e);
            self.set_phase(LifecyclePhase::Stopped);
            return Ok(Err(e));
        }

        if !self.wait_for(true, self.settings.startup_grace).await {
            tracing::error!(
                "Server not observed alive within {:?} of launch",
                self.settings.startup_grace
            );
            self.set_phase(LifecyclePhase::Stopped);
            return Ok(Err(LifecycleError::StartupFailure {
                grace: self.settings.startup_grace,
            }));
        }

        self.set_phase(LifecyclePhase::Running);
        self.persist_intentional_stop(false).await?;
        self.successful_starts.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Server process is alive");

        Ok(Ok(LifecycleOutcome::Started))
    }

    /// Stop with the lock held.
    async fn stop_locked(&self) -> Result<Result<LifecycleOutcome, LifecycleError>, AppError> {
        if !self.backend.is_running().await {
            self.set_phase(LifecyclePhase::Stopped);
            return Ok(Ok(LifecycleOutcome::AlreadyInDesiredState(
                LifecyclePhase::Stopped,
            )));
        }

        // Must hit the disk before the server hears "stop".
        self.persist_intentional_stop(true).await?;
        self.set_phase(LifecyclePhase::Stopping);
        tracing::info!("Stopping server");

        if let Err(e) = self.backend.send_line(STOP_COMMAND).await {
            tracing::warn!("Failed to send stop command: {}", e);
        }

        if self.wait_for(false, self.settings.shutdown_grace).await {
            self.set_phase(LifecyclePhase::Stopped);
            tracing::info!("Server stopped gracefully");
            return Ok(Ok(LifecycleOutcome::Stopped));
        }

        tracing::warn!(
            "Server still running {:?} after stop command, forcing termination",
            self.settings.shutdown_grace
        );
        self.backend.kill().await;

        if self.wait_for(false, self.settings.probe_interval).await {
            self.set_phase(LifecyclePhase::Stopped);
            return Ok(Ok(LifecycleOutcome::StoppedForced));
        }

        tracing::error!("Server survived forced termination");
        self.set_phase(LifecyclePhase::Running);
        Ok(Err(LifecycleError::ShutdownTimeout {
            grace: self.settings.shutdown_grace,
        }))
    }

    fn report(
        action: LifecycleAction,
        result: Result<LifecycleOutcome, LifecycleError>,
    ) -> LifecycleReport {
        LifecycleReport {
            action,
            outcome: result,
        }
    }
}

#[async_trait]
impl ServerControl for Supervisor {
    // The "already in the desired state" check happens under the lock. A process
    // check taken while another operation is in flight may describe a state that
    // operation is about to change.
    async fn start(&self) -> Result<LifecycleReport, AppError> {
        let Some(_guard) = self.acquire().await else {
            return Ok(LifecycleReport::failed(
                LifecycleAction::Start,
                LifecycleError::Busy,
            ));
        };

        let result = self.start_locked().await?;
        Ok(Self::report(LifecycleAction::Start, result))
    }

    async fn stop(&self) -> Result<LifecycleReport, AppError> {
        let Some(_guard) = self.acquire().await else {
            return Ok(LifecycleReport::failed(
                LifecycleAction::Stop,
                LifecycleError::Busy,
            ));
        };

        let result = self.stop_locked().await?;
        Ok(Self::report(LifecycleAction::Stop, result))
    }

    async fn restart(&self) -> Result<LifecycleReport, AppError> {
        let Some(_guard) = self.acquire().await else {
            return Ok(LifecycleReport::failed(
                LifecycleAction::Restart,
                LifecycleError::Busy,
            ));
        };

        let forced = match self.stop_locked().await? {
            Ok(LifecycleOutcome::StoppedForced) => true,
            Ok(LifecycleOutcome::Stopped) => false,
            Ok(_) => {
                tracing::info!("Restart requested while stopped, starting directly");
                false
            }
            Err(e) => return Ok(LifecycleReport::failed(LifecycleAction::Restart, e)),
        };

        tokio::time::sleep(self.settings.restart_delay).await;

        let result = match self.start_locked().await? {
            Ok(_) => Ok(LifecycleOutcome::Restarted { forced }),
            Err(e) => {
                // The stop half set the flag; hand a transient failure to the watchdog.
                if e.is_retryable() {
                    tracing::warn!(
                        "Restart could not bring the server back, re-arming crash recovery"
                    );
                    self.persist_intentional_stop(false).await?;
                }
                Err(e)
            }
        };
        Ok(Self::report(LifecycleAction::Restart, result))
    }

    async fn is_running(&self) -> bool {
        let running = self.backend.is_running().await;

        // Only an idle supervisor may publish an observed phase; otherwise a
        // transient Starting/Stopping would be overwritten.
        if let Ok(_guard) = self.lock.try_lock() {
            self.set_phase(LifecyclePhase::observed(running));
        }

        running
    }

    fn is_intentionally_stopped(&self) -> bool {
        self.intentional_stop.load(Ordering::SeqCst)
    }

    async fn send_command(&self, text: &str) -> Result<(), TransportError> {
        self.backend.send_line(text).await
    }

    async fn query(&self, command: &str) -> Result<String, TransportError> {
        self.backend.query(command).await
    }

    fn phase(&self) -> LifecyclePhase {
        *self.phase.borrow()
    }

    fn subscribe_phase(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.subscribe()
    }

    fn successful_starts(&self) -> u64 {
        self.successful_starts.load(Ordering::SeqCst)
    }
}

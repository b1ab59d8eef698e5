//! Crash watchdog.
//!
//! Polls the supervisor on a fixed interval and starts the server when it is
//! gone without an intentional stop. Consecutive failed attempts are capped; the
//! cap is reported once and then the watchdog stays quiet until some start
//! succeeds (manual or otherwise), which re-arms it.

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::MissedTickBehavior};

use crate::{
    error::lifecycle::LifecycleError,
    service::{notifier::Notifier, supervisor::ServerControl},
};

/// What a single tick did. Returned for tests and debug logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The previous tick is still running.
    Skipped,
    Healthy,
    IntentionallyStopped,
    /// The crash was recovered by this tick.
    Recovered,
    /// A restart attempt failed; `attempt` counts consecutive failures.
    Failed { attempt: u32 },
    /// Another lifecycle operation held the lock; not counted as an attempt.
    Busy,
    /// Restarts are paused after a configuration error.
    Blocked,
    /// The attempt cap is reached.
    Exhausted,
}

#[derive(Debug, Default)]
struct WatchdogState {
    attempts: u32,
    limit_reported: bool,
    blocked_by_configuration: bool,
    seen_starts: u64,
}

impl WatchdogState {
    fn rearm(&mut self, seen_starts: u64) {
        *self = Self {
            seen_starts,
            ..Self::default()
        };
    }
}

pub struct CrashWatchdog {
    control: Arc<dyn ServerControl>,
    notifier: Arc<dyn Notifier>,
    max_attempts: u32,
    interval: Duration,
    state: Mutex<WatchdogState>,
}

impl CrashWatchdog {
    pub fn new(
        control: Arc<dyn ServerControl>,
        notifier: Arc<dyn Notifier>,
        max_attempts: u32,
        interval: Duration,
    ) -> Self {
        let seen_starts = control.successful_starts();

        Self {
            control,
            notifier,
            max_attempts,
            interval,
            state: Mutex::new(WatchdogState {
                seen_starts,
                ..WatchdogState::default()
            }),
        }
    }

    /// Runs forever. The first tick fires immediately, which brings up a server
    /// that should be running when the bot boots.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Crash watchdog running every {:?}, max {} attempts",
            self.interval,
            self.max_attempts
        );

        loop {
            interval.tick().await;
            let outcome = self.tick().await;
            tracing::debug!("Watchdog tick: {:?}", outcome);
        }
    }

    /// Performs one check.
    pub async fn tick(&self) -> TickOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            return TickOutcome::Skipped;
        };

        let starts = self.control.successful_starts();
        if starts != state.seen_starts {
            state.rearm(starts);
        }

        if self.control.is_running().await {
            return TickOutcome::Healthy;
        }
        if self.control.is_intentionally_stopped() {
            return TickOutcome::IntentionallyStopped;
        }
        if state.blocked_by_configuration {
            return TickOutcome::Blocked;
        }
        if state.attempts >= self.max_attempts {
            self.report_limit(&mut state).await;
            return TickOutcome::Exhausted;
        }

        self.notifier
            .debug("Server process not found, attempting restart")
            .await;

        let report = match self.control.start().await {
            Ok(report) => report,
            Err(e) => {
                state.attempts += 1;
                self.notifier
                    .alert(&format!("Restart attempt {} failed: {}", state.attempts, e))
                    .await;
                return self.after_failure(&mut state).await;
            }
        };

        match report.outcome {
            Ok(_) => {
                state.rearm(self.control.successful_starts());
                self.notifier.debug("Auto-restarted after failure").await;
                self.notifier.log("♻️ Server auto-restarted after a crash").await;
                TickOutcome::Recovered
            }
            Err(LifecycleError::Busy) => TickOutcome::Busy,
            Err(LifecycleError::Configuration(reason)) => {
                state.blocked_by_configuration = true;
                self.notifier
                    .alert(&format!(
                        "Server configuration error, auto-restart paused until a manual start: {}",
                        reason
                    ))
                    .await;
                TickOutcome::Blocked
            }
            Err(e) => {
                state.attempts += 1;
                self.notifier
                    .alert(&format!("Restart attempt {} failed: {}", state.attempts, e))
                    .await;
                self.after_failure(&mut state).await
            }
        }
    }

    async fn after_failure(&self, state: &mut WatchdogState) -> TickOutcome {
        let attempt = state.attempts;
        if attempt >= self.max_attempts {
            self.report_limit(state).await;
        }
        TickOutcome::Failed { attempt }
    }

    async fn report_limit(&self, state: &mut WatchdogState) {
        if state.limit_reported {
            return;
        }
        state.limit_reported = true;

        self.notifier
            .alert(&format!(
                "Restart limit reached ({} attempts). Not restarting.",
                self.max_attempts
            ))
            .await;
    }
}

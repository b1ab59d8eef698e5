use std::{path::Path, time::Duration};
use thiserror::Error;

/// Expected failures of a start, stop or restart request.
///
/// These are returned inside a `LifecycleReport`, never raised as `AppError`.
/// "Already in the desired state" is deliberately absent: it is a successful
/// outcome, see `LifecycleOutcome::AlreadyInDesiredState`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Another lifecycle operation held the supervisor lock for the whole lock wait.
    ///
    /// Callers should tell the user and not retry automatically.
    #[error("Another start/stop/restart is already in progress")]
    Busy,

    /// The server cannot be launched as configured (missing jar, directory or Java).
    ///
    /// Requires an operator fix and is never retried by the crash watchdog.
    #[error("Server configuration error: {0}")]
    Configuration(String),

    /// The launcher reported success but the process was never observed alive.
    ///
    /// Retryable by the crash watchdog up to its attempt cap.
    #[error("Server failed to start: process not observed within {}s", .grace.as_secs())]
    StartupFailure {
        /// Startup grace period that elapsed
        grace: Duration,
    },

    /// The launcher itself failed (e.g. tmux could not be spawned).
    ///
    /// Retryable like `StartupFailure`.
    #[error("Server failed to launch: {0}")]
    LaunchFailed(String),

    /// The server ignored the stop command and could not be force-killed either.
    #[error("Server did not stop within {}s and could not be terminated", .grace.as_secs())]
    ShutdownTimeout {
        /// Shutdown grace period that elapsed
        grace: Duration,
    },
}

impl LifecycleError {
    /// Builds a configuration error for a path that should exist but does not.
    pub fn missing_path(what: &str, path: &Path) -> Self {
        LifecycleError::Configuration(format!("{} not found: {}", what, path.display()))
    }

    /// Whether the crash watchdog may retry after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LifecycleError::StartupFailure { .. }
                | LifecycleError::LaunchFailed(_)
                | LifecycleError::ShutdownTimeout { .. }
        )
    }
}

use std::fmt;

use crate::error::lifecycle::LifecycleError;

/// Observed phase of the managed server.
///
/// `Running` and `Stopped` come from the process probe; `Starting` and `Stopping`
/// only exist while a lifecycle operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl LifecyclePhase {
    /// Phase implied by a probe result when no operation is in flight.
    pub fn observed(running: bool) -> Self {
        if running {
            LifecyclePhase::Running
        } else {
            LifecyclePhase::Stopped
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecyclePhase::Stopped => "Offline",
            LifecyclePhase::Starting => "Starting",
            LifecyclePhase::Running => "Online",
            LifecyclePhase::Stopping => "Stopping",
        };
        f.write_str(label)
    }
}

/// Which lifecycle operation produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
    Restart,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleAction::Start => "start",
            LifecycleAction::Stop => "stop",
            LifecycleAction::Restart => "restart",
        };
        f.write_str(label)
    }
}

/// Successful results of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Process launched and observed alive.
    Started,
    /// Process exited after the stop command.
    Stopped,
    /// Process ignored the stop command within the grace period and was killed.
    StoppedForced,
    /// Stop followed by start under one lock acquisition.
    Restarted {
        /// Whether the stop half had to force-kill.
        forced: bool,
    },
    /// Nothing to do; the server was already running (start) or stopped (stop).
    AlreadyInDesiredState(LifecyclePhase),
}

/// Structured result of `start`, `stop` or `restart`.
///
/// Expected failures live in the `Err` arm of `outcome`; callers render `message()`
/// and check `success()` instead of matching on errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub action: LifecycleAction,
    pub outcome: Result<LifecycleOutcome, LifecycleError>,
}

impl LifecycleReport {
    pub fn ok(action: LifecycleAction, outcome: LifecycleOutcome) -> Self {
        Self {
            action,
            outcome: Ok(outcome),
        }
    }

    pub fn failed(action: LifecycleAction, error: LifecycleError) -> Self {
        Self {
            action,
            outcome: Err(error),
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&LifecycleError> {
        self.outcome.as_ref().err()
    }

    /// Human-readable message suitable for a chat reply.
    pub fn message(&self) -> String {
        match &self.outcome {
            Ok(LifecycleOutcome::Started) => "Server started successfully".to_string(),
            Ok(LifecycleOutcome::Stopped) => "Server stopped successfully".to_string(),
            Ok(LifecycleOutcome::StoppedForced) => "Server stopped (forced)".to_string(),
            Ok(LifecycleOutcome::Restarted { forced: false }) => {
                "Server restarted successfully".to_string()
            }
            Ok(LifecycleOutcome::Restarted { forced: true }) => {
                "Server restarted (stop was forced)".to_string()
            }
            Ok(LifecycleOutcome::AlreadyInDesiredState(LifecyclePhase::Running)) => {
                "Server is already running".to_string()
            }
            Ok(LifecycleOutcome::AlreadyInDesiredState(_)) => {
                "Server is not running".to_string()
            }
            Err(error) => error.to_string(),
        }
    }
}

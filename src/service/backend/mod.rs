//! Interchangeable implementations of the managed server process.
//!
//! - `tmux` - Real Java process in a detached tmux session
//! - `simulated` - In-memory process used for dry runs and tests

pub mod simulated;
pub mod tmux;

use async_trait::async_trait;

use crate::{
    error::lifecycle::LifecycleError,
    service::{console::CommandChannel, probe::ProcessProbe},
};

/// Everything the supervisor needs to drive one server process.
///
/// The supervisor serializes calls to `launch` and `kill`; implementations do not
/// need their own locking for them.
#[async_trait]
pub trait ServerBackend: ProcessProbe + CommandChannel {
    /// Short description for boot summaries and logs.
    fn describe(&self) -> String;

    /// Verifies the server can be launched as configured.
    ///
    /// Failures are `LifecycleError::Configuration` and need an operator fix.
    async fn check_launchable(&self) -> Result<(), LifecycleError>;

    /// Launches the process detached from the bot.
    ///
    /// Returning `Ok` only means the launcher accepted the request; the supervisor
    /// confirms liveness through the probe.
    async fn launch(&self) -> Result<(), LifecycleError>;

    /// Forcibly terminates the server process.
    async fn kill(&self);
}

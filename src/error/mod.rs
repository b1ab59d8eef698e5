//! Error types for the bot and its supervisor.
//!
//! `AppError` is the top-level error type for failures nobody expects during normal
//! operation: a state file that cannot be written, the Discord gateway refusing to
//! connect, a scheduler that fails to start. Such errors are logged at the top level
//! and reported to the operator channel.
//!
//! Failures that are part of normal server supervision (another lifecycle operation in
//! progress, a missing jar, a server that crashed during startup) are *not* `AppError`s.
//! They are `LifecycleError`s carried inside a `LifecycleReport` so callers can render
//! them as chat messages. Likewise `TransportError` covers an unreachable console or
//! RCON endpoint, which status displays degrade to "N/A".

pub mod config;
pub mod lifecycle;
pub mod transport;

use thiserror::Error;

use crate::error::config::ConfigError;

/// Top-level application error type.
///
/// Aggregates all unexpected error types that can occur in the application. Most
/// variants use `#[from]` for automatic conversion so `?` can be used freely.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Filesystem or process spawning error.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// State file (de)serialization error.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Backup archive error.
    #[error(transparent)]
    ZipErr(#[from] zip::result::ZipError),

    /// A blocking task on the tokio pool panicked or was cancelled.
    #[error(transparent)]
    JoinErr(#[from] tokio::task::JoinError),

    /// Resource not found error.
    ///
    /// # Fields
    /// - Message describing what was not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid input supplied by a command caller.
    ///
    /// # Fields
    /// - Message describing what was invalid
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with custom message.
    ///
    /// # Fields
    /// - Detailed error message for logging
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

//! Application state shared by the Discord handlers.
//!
//! Built once during startup and cloned into the event handler. Every member is
//! behind an `Arc`, so clones are cheap and share the same supervisor.

use std::sync::Arc;

use tokio::sync::watch;

use crate::service::{backup::BackupService, notifier::Notifier, supervisor::ServerControl};

#[derive(Clone)]
pub struct AppState {
    /// Guild the slash commands are registered in.
    pub guild_id: u64,
    /// Lifecycle operations and live queries.
    pub control: Arc<dyn ServerControl>,
    /// Manual backups.
    pub backups: Arc<BackupService>,
    /// Operator notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Online player count as seen in the server log.
    pub players: watch::Receiver<u32>,
}

impl AppState {
    pub fn new(
        guild_id: u64,
        control: Arc<dyn ServerControl>,
        backups: Arc<BackupService>,
        notifier: Arc<dyn Notifier>,
        players: watch::Receiver<u32>,
    ) -> Self {
        Self {
            guild_id,
            control,
            backups,
            notifier,
            players,
        }
    }
}

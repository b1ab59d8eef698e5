//! Persisted intentional-stop flag.
//!
//! Provides the `StateStore` which reads and writes the `{"intentional_stop": bool}`
//! record. Writes go to a sibling temporary file, flushed to disk, which is then
//! renamed over the target, so a crash or power loss mid-write leaves either the
//! old or the new record on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

/// On-disk representation of the supervisor state.
#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    intentional_stop: bool,
}

/// File-backed store for the intentional-stop flag.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the given file path. Nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted flag.
    ///
    /// An absent, unreadable or malformed file yields `true` so a bot restart never
    /// auto-starts a server nobody asked for.
    ///
    /// # Returns
    /// - `true` - Last stop was intentional, or nothing usable is persisted
    /// - `false` - Server is expected to be running
    pub async fn load(&self) -> bool {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, assuming intentional stop", self.path.display());
                return true;
            }
            Err(e) => {
                tracing::warn!("Failed to read state file {}: {}", self.path.display(), e);
                return true;
            }
        };

        match serde_json::from_str::<StateRecord>(&contents) {
            Ok(record) => record.intentional_stop,
            Err(e) => {
                tracing::warn!(
                    "State file {} is corrupt ({}), assuming intentional stop",
                    self.path.display(),
                    e
                );
                true
            }
        }
    }

    /// Persists the flag atomically.
    ///
    /// # Arguments
    /// - `intentional_stop` - Value to persist
    ///
    /// # Returns
    /// - `Ok(())` - Record written, synced and renamed into place
    /// - `Err(AppError::IoErr)` - Temporary file could not be written or renamed
    /// - `Err(AppError::JsonErr)` - Record could not be serialized
    pub async fn save(&self, intentional_stop: bool) -> Result<(), AppError> {
        let contents = serde_json::to_string(&StateRecord { intentional_stop })?;
        let temp = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        write_synced(&temp, contents.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!("Persisted intentional_stop={}", intentional_stop);
        Ok(())
    }

    /// Resolves the effective flag at bot startup.
    ///
    /// A server found running was clearly not stopped for good, so the flag is
    /// forced to `false` and written back; otherwise the persisted value stands.
    ///
    /// # Arguments
    /// - `running` - Probe result taken at startup
    ///
    /// # Returns
    /// - `Ok(bool)` - Effective intentional-stop value
    /// - `Err(AppError)` - Forced value could not be persisted
    pub async fn reconcile(&self, running: bool) -> Result<bool, AppError> {
        if !running {
            return Ok(self.load().await);
        }

        if self.load().await {
            tracing::info!("Server is running but state says intentionally stopped, clearing flag");
        }
        self.save(false).await?;
        Ok(false)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes `contents` to `path` and waits until the data reaches the disk.
async fn write_synced(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    Ok(())
}

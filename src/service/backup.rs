//! World backups.
//!
//! Archives are zipped straight from the live world folder on the blocking pool.
//! Auto backups land in `backups/auto` and are pruned by age; custom backups land
//! in `backups/custom` and are kept until someone deletes them.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use chrono::Local;
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    config::Config,
    error::AppError,
    model::backup::{BackupArtifact, BackupKind, BackupListing},
    service::supervisor::ServerControl,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
/// Time given to the server to flush chunks after `save-all`.
const SAVE_SETTLE: Duration = Duration::from_secs(3);

pub struct BackupService {
    control: Arc<dyn ServerControl>,
    world_dir: PathBuf,
    backups_dir: PathBuf,
    retention_days: u64,
}

impl BackupService {
    pub fn new(control: Arc<dyn ServerControl>, config: &Config) -> Self {
        Self {
            control,
            world_dir: config.world_dir(),
            backups_dir: config.server_dir.join("backups"),
            retention_days: config.backup_retention_days,
        }
    }

    pub fn auto_dir(&self) -> PathBuf {
        self.backups_dir.join("auto")
    }

    pub fn custom_dir(&self) -> PathBuf {
        self.backups_dir.join("custom")
    }

    /// Creates a backup of the world folder.
    ///
    /// When the server is running, `save-all` is sent first (best effort).
    /// Auto backups trigger a retention pass afterwards.
    ///
    /// # Arguments
    /// - `kind` - Auto or custom; custom labels are sanitized
    ///
    /// # Returns
    /// - `Ok(BackupArtifact)` - Archive written
    /// - `Err(AppError::NotFound)` - World folder does not exist
    /// - `Err(AppError::BadRequest)` - Custom label is empty after sanitizing
    /// - `Err(AppError::ZipErr | IoErr)` - Archive could not be written
    pub async fn create(&self, kind: BackupKind) -> Result<BackupArtifact, AppError> {
        if !tokio::fs::metadata(&self.world_dir)
            .await
            .is_ok_and(|m| m.is_dir())
        {
            return Err(AppError::NotFound(format!(
                "World folder not found: {}",
                self.world_dir.display()
            )));
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let (dir, file_name, kind) = match kind {
            BackupKind::Auto => (
                self.auto_dir(),
                format!("backup_auto_{}.zip", timestamp),
                BackupKind::Auto,
            ),
            BackupKind::Custom(label) => {
                let label = sanitize_label(&label);
                if label.is_empty() {
                    return Err(AppError::BadRequest(
                        "Backup name must contain letters, digits, '-' or '_'".to_string(),
                    ));
                }
                (
                    self.custom_dir(),
                    format!("backup_custom_{}_{}.zip", timestamp, label),
                    BackupKind::Custom(label),
                )
            }
        };

        tokio::fs::create_dir_all(&dir).await?;
        let path = unique_path(&dir, &file_name);

        if self.control.is_running().await {
            match self.control.send_command("save-all").await {
                Ok(()) => tokio::time::sleep(SAVE_SETTLE).await,
                Err(e) => tracing::warn!("Could not flush world before backup: {}", e),
            }
        }

        tracing::info!("Starting backup: {}", path.display());

        let source = self.world_dir.clone();
        let target = path.clone();
        let files = tokio::task::spawn_blocking(move || zip_directory(&source, &target)).await??;

        tracing::info!("Backup created: {} ({} files)", path.display(), files);

        let pruned = match kind {
            BackupKind::Auto => self.prune().await?,
            BackupKind::Custom(_) => 0,
        };

        Ok(BackupArtifact {
            kind,
            path,
            files,
            pruned,
        })
    }

    /// Deletes auto backups older than the retention period.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of archives deleted
    pub async fn prune(&self) -> Result<usize, AppError> {
        let dir = self.auto_dir();
        let retention_days = self.retention_days;

        let removed =
            tokio::task::spawn_blocking(move || prune_older_than(&dir, retention_days)).await??;

        Ok(removed)
    }

    /// Archive names in both folders. A missing folder lists as empty.
    pub async fn list(&self) -> Result<BackupListing, AppError> {
        let auto = self.auto_dir();
        let custom = self.custom_dir();

        let listing = tokio::task::spawn_blocking(move || -> Result<BackupListing, AppError> {
            Ok(BackupListing {
                auto: archives_in(&auto)?,
                custom: archives_in(&custom)?,
            })
        })
        .await??;

        Ok(listing)
    }
}

/// Keeps `[A-Za-z0-9_-]` and maps spaces to underscores.
pub fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .collect()
}

/// `dir/name`, or `dir/<stem>_N.zip` if a backup of the same minute exists.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name.trim_end_matches(".zip");
    (2..)
        .map(|n| dir.join(format!("{}_{}.zip", stem, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Zips every file under `source` into `target`, paths relative to `source`.
///
/// The archive is written to a `.partial` file first and renamed on success.
fn zip_directory(source: &Path, target: &Path) -> Result<usize, AppError> {
    let partial = target.with_extension("zip.partial");
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let result = (|| -> Result<usize, AppError> {
        let mut zip = ZipWriter::new(File::create(&partial)?);
        let mut files = 0;

        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry.map_err(|e| AppError::IoErr(io::Error::other(e)))?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            if relative.as_os_str().is_empty() {
                continue;
            }

            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                zip.start_file(name, options)?;
                let mut file = File::open(entry.path())?;
                io::copy(&mut file, &mut zip)?;
                files += 1;
            }
        }

        zip.finish()?;
        Ok(files)
    })();

    match result {
        Ok(files) => {
            std::fs::rename(&partial, target)?;
            Ok(files)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

/// `*.zip` file names in `dir`, sorted descending. Timestamped names sort newest first.
fn archives_in(dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
        .filter_map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));

    Ok(names)
}

/// Removes `*.zip` files in `dir` whose age in whole days exceeds `retention_days`.
fn prune_older_than(dir: &Path, retention_days: u64) -> Result<usize, AppError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "zip") {
            continue;
        }

        let age_days = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .map(|age| age.as_secs() / SECONDS_PER_DAY);

        if age_days.is_some_and(|days| days > retention_days) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("Deleted old backup: {}", path.display());
                    removed += 1;
                }
                Err(e) => tracing::error!("Failed to delete old backup {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::state_store::StateStore,
        service::{
            backend::simulated::{SimulatedBackend, SimulatedOptions},
            supervisor::{Supervisor, SupervisorSettings},
        },
    };
    use std::io::Read;
    use test_utils::{builder::TestBuilder, context::TestContext, error::TestError, factory};

    fn config(test: &TestContext) -> Config {
        let dir = test.server_dir().display().to_string();
        Config::from_lookup(move |key| match key {
            "DISCORD_BOT_TOKEN" => Some("token".to_string()),
            "DISCORD_GUILD_ID" => Some("1".to_string()),
            "SERVER_DIR" => Some(dir.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn service(test: &TestContext, backend: Arc<SimulatedBackend>) -> BackupService {
        let supervisor = Supervisor::new(
            backend,
            StateStore::new(test.state_file()),
            SupervisorSettings {
                startup_grace: Duration::from_secs(1),
                shutdown_grace: Duration::from_secs(1),
                probe_interval: Duration::from_millis(100),
                lock_wait: Duration::from_secs(1),
                restart_delay: Duration::ZERO,
            },
            true,
            false,
        );
        BackupService::new(Arc::new(supervisor), &config(test))
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn sanitizes_labels() {
        assert_eq!(sanitize_label("before update 1.21"), "before_update_121");
        assert_eq!(sanitize_label("../../etc"), "etc");
        assert_eq!(sanitize_label("  ok-name_2 "), "ok-name_2");
        assert_eq!(sanitize_label("!!!"), "");
    }

    /// Tests an auto backup of a stopped server.
    ///
    /// Verifies the archive holds every world file with paths relative to the
    /// world folder, and that nothing was sent to the console.
    ///
    /// Expected: Ok with 4 files under backups/auto
    #[tokio::test]
    async fn creates_auto_backup() -> Result<(), TestError> {
        let test = TestBuilder::new().with_world().build()?;
        let backend = Arc::new(SimulatedBackend::new(SimulatedOptions::default()));
        let service = service(&test, backend.clone());

        let artifact = service.create(BackupKind::Auto).await.unwrap();

        assert_eq!(artifact.files, 4);
        assert!(artifact.path.starts_with(test.backups_dir().join("auto")));
        assert!(artifact.file_name().starts_with("backup_auto_"));
        assert!(backend.sent_lines().is_empty());

        let names = archive_names(&artifact.path);
        assert!(names.contains(&"level.dat".to_string()));
        assert!(names.contains(&"region/r.0.0.mca".to_string()));

        let mut archive = zip::ZipArchive::new(File::open(&artifact.path)?).unwrap();
        let mut level = String::new();
        archive
            .by_name("level.dat")
            .unwrap()
            .read_to_string(&mut level)?;
        assert_eq!(level, "level-data");

        Ok(())
    }

    /// Tests a custom backup while the server is running.
    ///
    /// Expected: save-all sent first, archive under backups/custom with the label
    #[tokio::test(start_paused = true)]
    async fn custom_backup_flushes_running_server() -> Result<(), TestError> {
        let test = TestBuilder::new().with_world().build()?;
        let backend = Arc::new(SimulatedBackend::running(SimulatedOptions::default()));
        let service = service(&test, backend.clone());

        let artifact = service
            .create(BackupKind::Custom("pre update".to_string()))
            .await
            .unwrap();

        assert_eq!(backend.sent_lines(), vec!["save-all"]);
        assert_eq!(artifact.kind, BackupKind::Custom("pre_update".to_string()));
        assert!(artifact.file_name().ends_with("_pre_update.zip"));
        assert!(artifact.path.starts_with(test.backups_dir().join("custom")));

        Ok(())
    }

    /// Tests a backup without a world folder.
    ///
    /// Expected: Err(NotFound)
    #[tokio::test]
    async fn missing_world_is_reported() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let service = service(&test, Arc::new(SimulatedBackend::new(SimulatedOptions::default())));

        let result = service.create(BackupKind::Auto).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        Ok(())
    }

    /// Tests retention after an auto backup.
    ///
    /// Verifies only auto archives older than the retention period are removed;
    /// custom archives are never touched.
    ///
    /// Expected: Ok with exactly the stale auto archive pruned
    #[tokio::test]
    async fn prunes_old_auto_backups() -> Result<(), TestError> {
        let test = TestBuilder::new().with_world().build()?;
        let auto = test.backups_dir().join("auto");
        let custom = test.backups_dir().join("custom");
        let stale = factory::backup::create_aged_backup(&auto, "backup_auto_old.zip", 10)?;
        let recent = factory::backup::create_aged_backup(&auto, "backup_auto_recent.zip", 3)?;
        let kept = factory::backup::create_aged_backup(&custom, "backup_custom_old_x.zip", 30)?;
        let service = service(&test, Arc::new(SimulatedBackend::new(SimulatedOptions::default())));

        let artifact = service.create(BackupKind::Auto).await.unwrap();

        assert_eq!(artifact.pruned, 1);
        assert!(!stale.exists());
        assert!(recent.exists());
        assert!(kept.exists());
        assert!(artifact.path.exists());

        Ok(())
    }

    /// Tests that two backups in the same minute do not overwrite each other.
    ///
    /// Expected: two distinct archives
    #[tokio::test]
    async fn same_minute_backups_are_distinct() -> Result<(), TestError> {
        let test = TestBuilder::new().with_world().build()?;
        let service = service(&test, Arc::new(SimulatedBackend::new(SimulatedOptions::default())));

        let first = service.create(BackupKind::Custom("a".to_string())).await.unwrap();
        let second = service.create(BackupKind::Custom("a".to_string())).await.unwrap();

        assert_ne!(first.path, second.path);
        assert!(first.path.exists() && second.path.exists());

        Ok(())
    }

    /// Tests listing both backup folders.
    ///
    /// Verifies non-archives are skipped and names come back newest first.
    ///
    /// Expected: Ok with sorted names per folder
    #[tokio::test]
    async fn lists_archives_newest_first() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let auto = test.backups_dir().join("auto");
        let custom = test.backups_dir().join("custom");
        factory::backup::create_aged_backup(&auto, "backup_auto_2024-01-01_22-00.zip", 2)?;
        factory::backup::create_aged_backup(&auto, "backup_auto_2024-01-02_22-00.zip", 1)?;
        factory::backup::create_aged_backup(&auto, "notes.txt", 0)?;
        factory::backup::create_aged_backup(&custom, "backup_custom_2024-01-01_10-00_x.zip", 0)?;
        let service = service(&test, Arc::new(SimulatedBackend::new(SimulatedOptions::default())));

        let listing = service.list().await.unwrap();

        assert_eq!(
            listing.auto,
            vec![
                "backup_auto_2024-01-02_22-00.zip".to_string(),
                "backup_auto_2024-01-01_22-00.zip".to_string(),
            ]
        );
        assert_eq!(
            listing.custom,
            vec!["backup_custom_2024-01-01_10-00_x.zip".to_string()]
        );

        Ok(())
    }

    /// Tests listing before any backup was taken.
    ///
    /// Expected: Ok with both lists empty
    #[tokio::test]
    async fn lists_nothing_without_backups_dir() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let service = service(&test, Arc::new(SimulatedBackend::new(SimulatedOptions::default())));

        let listing = service.list().await.unwrap();

        assert_eq!(listing, BackupListing::default());
        Ok(())
    }
}

use std::path::PathBuf;

/// Kind of world backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupKind {
    /// Scheduled backup, pruned by the retention policy.
    Auto,
    /// Manually requested backup with a user-supplied label, kept forever.
    Custom(String),
}

/// A backup archive that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub kind: BackupKind,
    pub path: PathBuf,
    /// Number of files stored in the archive.
    pub files: usize,
    /// Auto backups deleted by the retention pass that followed.
    pub pruned: usize,
}

impl BackupArtifact {
    /// Archive file name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Archive names in both backup folders, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupListing {
    pub auto: Vec<String>,
    pub custom: Vec<String>,
}

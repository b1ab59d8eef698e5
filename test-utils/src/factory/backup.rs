use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use crate::error::TestError;

/// Creates a placeholder backup archive whose modification time lies in the past.
///
/// # Arguments
/// - `dir` - Directory to create the archive in (created if missing)
/// - `name` - File name, e.g. `backup_auto_2024-01-01_22-00.zip`
/// - `age_days` - How many days ago the file was last modified
///
/// # Returns
/// - `Ok(PathBuf)` - Path of the created file
/// - `Err(TestError::Io)` - Failed to create the file or set its timestamp
pub fn create_aged_backup(dir: &Path, name: &str, age_days: u64) -> Result<PathBuf, TestError> {
    fs::create_dir_all(dir)?;

    let path = dir.join(name);
    let file = File::create(&path)?;
    let modified = SystemTime::now() - Duration::from_secs(age_days * 24 * 60 * 60);
    file.set_modified(modified)?;

    Ok(path)
}

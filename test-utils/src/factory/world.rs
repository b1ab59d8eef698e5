use std::{fs, path::Path};

use crate::error::TestError;

/// Region files created inside `region/`.
pub const REGION_FILES: [&str; 2] = ["r.0.0.mca", "r.-1.0.mca"];

/// Creates a minimal world folder.
///
/// Writes `level.dat`, a `session.lock` and two region files so archive tests see
/// both top-level files and nested directories.
///
/// # Returns
/// - `Ok(usize)` - Number of files written
/// - `Err(TestError::Io)` - Failed to write a file
pub fn create_world(world_dir: &Path) -> Result<usize, TestError> {
    let region = world_dir.join("region");
    fs::create_dir_all(&region)?;

    fs::write(world_dir.join("level.dat"), b"level-data")?;
    fs::write(world_dir.join("session.lock"), b"\xE2\x98\x83")?;

    for name in REGION_FILES {
        fs::write(region.join(name), name.as_bytes())?;
    }

    Ok(2 + REGION_FILES.len())
}

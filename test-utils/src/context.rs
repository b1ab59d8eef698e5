use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default jar filename used by the test server layout.
pub const JAR_NAME: &str = "server.jar";

/// Default world folder name used by the test server layout.
pub const WORLD_FOLDER: &str = "world";

/// Default state file name, placed next to (not inside) the server directory.
pub const STATE_FILE: &str = "server_state.json";

/// Test context owning a temporary directory laid out like a Minecraft server.
///
/// The temporary directory is deleted when the context is dropped, so keep the
/// context alive for as long as the test uses any of its paths.
///
/// Layout:
/// ```text
/// <root>/
///   server_state.json        (only if requested)
///   server/
///     server.jar             (only if requested)
///     world/                 (only if requested)
///     logs/latest.log        (only if requested)
/// ```
pub struct TestContext {
    /// Owned temporary directory; removed on drop.
    root: TempDir,
}

impl TestContext {
    /// Wraps an already prepared temporary directory.
    ///
    /// Typically called by `TestBuilder::build()` rather than directly.
    pub fn new(root: TempDir) -> Self {
        Self { root }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Server working directory.
    pub fn server_dir(&self) -> PathBuf {
        self.root().join("server")
    }

    /// Path of the server jar inside the server directory.
    pub fn jar_path(&self) -> PathBuf {
        self.server_dir().join(JAR_NAME)
    }

    /// Path of the world folder inside the server directory.
    pub fn world_dir(&self) -> PathBuf {
        self.server_dir().join(WORLD_FOLDER)
    }

    /// Path of the live server log.
    pub fn latest_log(&self) -> PathBuf {
        self.server_dir().join("logs").join("latest.log")
    }

    /// Path of the backups folder inside the server directory.
    pub fn backups_dir(&self) -> PathBuf {
        self.server_dir().join("backups")
    }

    /// Path of the persisted intentional-stop state file.
    pub fn state_file(&self) -> PathBuf {
        self.root().join(STATE_FILE)
    }
}

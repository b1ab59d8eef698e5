use std::fs;

use crate::{context::TestContext, error::TestError, factory, fixture};

/// Builder for creating test contexts with a customizable server layout.
///
/// Provides a fluent interface for configuring which parts of a Minecraft server
/// installation exist in the temporary directory. Call `build()` to create the
/// configured test context. The server directory itself always exists.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
///
/// let test = TestBuilder::new()
///     .with_jar()
///     .with_world()
///     .with_state(false)
///     .build()?;
/// ```
pub struct TestBuilder {
    /// Create an empty `server.jar` in the server directory.
    jar: bool,

    /// Create a world folder populated with a few region files.
    world: bool,

    /// Initial contents of `logs/latest.log`, if the log should exist.
    log_lines: Option<Vec<String>>,

    /// Persisted intentional-stop value, if a state file should exist.
    state: Option<bool>,
}

impl TestBuilder {
    /// Creates a new test builder with only the bare server directory configured.
    pub fn new() -> Self {
        Self {
            jar: false,
            world: false,
            log_lines: None,
            state: None,
        }
    }

    /// Adds an empty server jar so launch precondition checks pass.
    pub fn with_jar(mut self) -> Self {
        self.jar = true;
        self
    }

    /// Adds a world folder with level data and region files.
    pub fn with_world(mut self) -> Self {
        self.world = true;
        self
    }

    /// Adds `logs/latest.log` with the given initial lines.
    ///
    /// Pass an empty vector to create an empty log file.
    pub fn with_latest_log(mut self, lines: Vec<String>) -> Self {
        self.log_lines = Some(lines);
        self
    }

    /// Adds a persisted state file recording the given intentional-stop value.
    pub fn with_state(mut self, intentional_stop: bool) -> Self {
        self.state = Some(intentional_stop);
        self
    }

    /// Adds everything a launchable server needs: jar, world and an empty log.
    pub fn with_server_layout(self) -> Self {
        self.with_jar().with_world().with_latest_log(Vec::new())
    }

    /// Builds the temporary directory tree and returns its context.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Layout created
    /// - `Err(TestError::Io)` - Failed to create a directory or file
    pub fn build(self) -> Result<TestContext, TestError> {
        let context = TestContext::new(tempfile::tempdir()?);
        fs::create_dir_all(context.server_dir())?;

        if self.jar {
            fs::write(context.jar_path(), b"")?;
        }

        if self.world {
            factory::world::create_world(&context.world_dir())?;
        }

        if let Some(lines) = self.log_lines {
            factory::log::create_log(&context.latest_log(), &lines)?;
        }

        if let Some(intentional_stop) = self.state {
            fs::write(
                context.state_file(),
                fixture::state_file::contents(intentional_stop)?,
            )?;
        }

        Ok(context)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

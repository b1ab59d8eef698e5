//! Craftwarden Test Utils
//!
//! Provides shared testing utilities for building unit and integration tests for the
//! craftwarden bot. This crate offers a builder pattern for creating test contexts backed
//! by a temporary directory laid out like a real Minecraft server installation.
//!
//! # Overview
//!
//! The test utilities consist of the following components:
//! - **TestBuilder**: Fluent builder for configuring the temporary server layout
//! - **TestContext**: Test environment owning the temporary directory and its paths
//! - **TestError**: Error types that can occur during test setup
//! - **fixture**: Static test data (server log lines, state file contents)
//! - **factory**: Helpers that write files into a test context (world data, backups, logs)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_backup() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_jar()
//!         .with_world()
//!         .build()?;
//!
//!     let world = test.world_dir();
//!     // Perform filesystem operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod fixture;

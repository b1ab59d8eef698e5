//! Factory helpers that write test data into a test context.
//!
//! Each module owns one kind of on-disk artifact. Factories take plain paths so
//! they can also be pointed at directories outside a `TestContext`.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory, fixture};
//!
//! let test = TestBuilder::new().with_latest_log(vec![]).build()?;
//! factory::log::append_lines(&test.latest_log(), &[fixture::server_log::joined("Alex")])?;
//! ```

pub mod backup;
pub mod log;
pub mod world;

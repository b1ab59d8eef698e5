//! Test fixtures providing reusable static test data.
//!
//! Unlike factories, fixtures do NOT touch the filesystem. They return the strings a
//! real server or a real state file would contain so tests can assert against the
//! exact formats the bot parses.
//!
//! # Example
//!
//! ```rust,ignore
//! use test_utils::fixture;
//!
//! let line = fixture::server_log::joined("Steve");
//! let state = fixture::state_file::contents(true)?;
//! ```

pub mod server_log;
pub mod state_file;

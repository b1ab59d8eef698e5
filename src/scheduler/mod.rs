//! Cron-driven maintenance jobs.

pub mod maintenance;

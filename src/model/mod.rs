//! Domain models shared by the supervisor, the scheduler and the Discord layer.
//!
//! - `lifecycle` - Lifecycle phases and the structured result of start/stop/restart
//! - `status` - Parsed live server status (player list)
//! - `log_event` - Events recognised in the server log
//! - `backup` - Backup kinds and created archives

pub mod backup;
pub mod lifecycle;
pub mod log_event;
pub mod status;

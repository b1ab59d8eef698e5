//! Services supervising the Minecraft server.
//!
//! The `supervisor` is the only component allowed to start or stop the server; the
//! watchdog, the scheduler and the Discord commands all go through it. Backends
//! plug the actual process handling in underneath.

pub mod backend;
pub mod backup;
pub mod console;
pub mod log_tail;
pub mod notifier;
pub mod probe;
pub mod rcon;
pub mod supervisor;
pub mod watchdog;

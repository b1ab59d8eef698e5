//! Discord front end of the supervisor.
//!
//! The bot registers guild slash commands on `ready`, routes interactions to the
//! command modules and mirrors the server's lifecycle phase in its presence. It
//! holds no server state of its own; everything goes through `AppState`.
//!
//! # Gateway Intents
//!
//! Only `GUILDS` is required. Slash commands arrive as interactions regardless of
//! intents, and no message content is read.

pub mod command;
pub mod embed;
pub mod handler;
pub mod presence;
pub mod start;

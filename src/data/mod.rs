//! Durable state owned by the bot.
//!
//! The only thing the bot persists is whether the last server stop was intentional.
//! Everything else (running, phase, player count) is observed live.

pub mod state_store;

#[cfg(test)]
mod test;

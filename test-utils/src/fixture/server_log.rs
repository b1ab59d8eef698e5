//! Minecraft server log line fixtures.
//!
//! Lines follow the vanilla `latest.log` format:
//! `[HH:MM:SS] [Server thread/INFO]: <message>`.

/// Timestamp prefix shared by every fixture line.
pub const PREFIX: &str = "[12:34:56] [Server thread/INFO]: ";

/// Line logged when a player joins.
pub fn joined(player: &str) -> String {
    format!("{PREFIX}{player} joined the game")
}

/// Line logged when a player leaves.
pub fn left(player: &str) -> String {
    format!("{PREFIX}{player} left the game")
}

/// Line logged once the server has finished loading.
pub fn done() -> String {
    format!("{PREFIX}Done (12.345s)! For help, type \"help\"")
}

/// A chat message, which must not be mistaken for a join event.
pub fn chat(player: &str, message: &str) -> String {
    format!("{PREFIX}<{player}> {message}")
}

/// Line logged at the very start of a server boot.
pub fn starting(version: &str) -> String {
    format!("{PREFIX}Starting minecraft server version {version}")
}

/// Death message as printed by the server, e.g. `Steve was slain by Zombie`.
pub fn death(player: &str, cause: &str) -> String {
    format!("{PREFIX}{player} {cause}")
}

/// A warning from the server thread.
pub fn warning(message: &str) -> String {
    format!("[12:34:56] [Server thread/WARN]: {message}")
}

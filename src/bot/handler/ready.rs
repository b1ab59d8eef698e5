//! Ready event handler for bot initialization.
//!
//! Fired after every successful gateway handshake, including reconnects. Used to:
//! - Log connection information
//! - Register the guild slash commands
//! - Start mirroring the server phase and player count in the bot presence (first time only)

use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{Context, GuildId, Ready};

use crate::{
    bot::{command, presence},
    state::AppState,
};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `state` - Shared application state
/// - `presence_started` - Guard ensuring a single presence task per process
/// - `ctx` - Discord context for command registration and presence
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(
    state: &AppState,
    presence_started: &AtomicBool,
    ctx: Context,
    ready: Ready,
) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    let guild_id = GuildId::new(state.guild_id);
    match guild_id
        .set_commands(&ctx.http, command::definitions())
        .await
    {
        Ok(commands) => tracing::info!(
            "Registered {} slash commands in guild {}",
            commands.len(),
            guild_id
        ),
        Err(e) => tracing::error!("Failed to register slash commands: {}", e),
    }

    if !presence_started.swap(true, Ordering::SeqCst) {
        let phases = state.control.subscribe_phase();
        tokio::spawn(presence::run(ctx, phases, state.players.clone()));
    }
}

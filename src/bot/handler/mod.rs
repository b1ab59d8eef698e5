use std::sync::atomic::AtomicBool;

use serenity::all::{Context, EventHandler, Interaction, Ready};
use serenity::async_trait;

use crate::state::AppState;

pub mod interaction;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub state: AppState,
    /// Set once the presence task has been spawned; `ready` fires again on reconnect.
    pub presence_started: AtomicBool,
}

impl Handler {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            presence_started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.state, &self.presence_started, ctx, ready).await;
    }

    /// Called when a user invokes a slash command
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, ctx, interaction).await;
    }
}

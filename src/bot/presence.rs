use serenity::all::{ActivityData, Context, OnlineStatus};
use tokio::sync::watch;

use crate::model::lifecycle::LifecyclePhase;

/// Mirrors the server phase and player count into the bot's presence.
///
/// Runs until either sender is dropped.
pub async fn run(
    ctx: Context,
    mut phases: watch::Receiver<LifecyclePhase>,
    mut players: watch::Receiver<u32>,
) {
    loop {
        let phase = *phases.borrow_and_update();
        let online = *players.borrow_and_update();
        let (activity, status) = presence_for(phase, online);
        ctx.set_presence(Some(activity), status);
        tracing::debug!("Presence updated: {} ({} players)", phase, online);

        let changed = tokio::select! {
            changed = phases.changed() => changed,
            changed = players.changed() => changed,
        };
        if changed.is_err() {
            break;
        }
    }
}

pub fn presence_for(phase: LifecyclePhase, players: u32) -> (ActivityData, OnlineStatus) {
    match phase {
        LifecyclePhase::Running => (
            ActivityData::playing(format!("Minecraft Server: Online | Players: {}", players)),
            OnlineStatus::Online,
        ),
        LifecyclePhase::Starting | LifecyclePhase::Stopping => (
            ActivityData::playing(format!("Minecraft Server: {}", phase)),
            OnlineStatus::Idle,
        ),
        LifecyclePhase::Stopped => (
            ActivityData::playing(format!("Minecraft Server: {}", phase)),
            OnlineStatus::DoNotDisturb,
        ),
    }
}

use crate::{
    bot::embed::Reply,
    model::status::PlayerList,
    service::{console::UNAVAILABLE, supervisor::ServerControl},
};

/// /status: phase, intentional-stop flag and player count.
///
/// The probe is consulted fresh; the player list degrades to "N/A" when RCON
/// cannot be reached.
pub async fn status(control: &dyn ServerControl) -> Reply {
    let running = control.is_running().await;
    let phase = control.phase();

    let players = if running {
        player_summary(control).await
    } else {
        UNAVAILABLE.to_string()
    };

    let intentional = if control.is_intentionally_stopped() {
        "Yes"
    } else {
        "No"
    };

    Reply::info("Server status", format!("Server is **{}**", phase))
        .field("Players", players)
        .field("Stopped on purpose", intentional)
}

/// /players: names of everyone online.
pub async fn players(control: &dyn ServerControl) -> Reply {
    if !control.is_running().await {
        return Reply::failure("Players", "Server is not running");
    }

    match control.query("list").await {
        Ok(reply) => match PlayerList::parse(&reply) {
            Some(list) => Reply::info("Players", list.summary()),
            None => Reply::info("Players", reply),
        },
        Err(e) => {
            tracing::warn!("Player list unavailable: {}", e);
            Reply::failure("Players", UNAVAILABLE)
        }
    }
}

async fn player_summary(control: &dyn ServerControl) -> String {
    match control.query("list").await {
        Ok(reply) => PlayerList::parse(&reply)
            .map(|list| list.summary())
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        Err(e) => {
            tracing::debug!("Player list unavailable: {}", e);
            UNAVAILABLE.to_string()
        }
    }
}

use serenity::all::{Client, GatewayIntents};

use crate::{bot::handler::Handler, error::AppError, state::AppState};

/// Builds the Discord client without connecting it.
///
/// # Arguments
/// - `token` - Discord bot token
/// - `state` - Shared application state handed to the event handler
///
/// # Returns
/// - `Ok(Client)` - Client ready to start
/// - `Err(AppError::DiscordErr)` - Client could not be built
pub async fn init_bot(token: &str, state: AppState) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS;

    let client = Client::builder(token, intents)
        .event_handler(Handler::new(state))
        .await?;

    Ok(client)
}

/// Connects to the gateway and processes events until shutdown.
///
/// Should be called from within a `tokio::spawn` task since it only returns when
/// the connection is closed for good.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}

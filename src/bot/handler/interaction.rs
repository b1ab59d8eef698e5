//! Interaction event handler.
//!
//! Slash commands and panel buttons are acknowledged with an ephemeral defer right
//! away, since lifecycle operations take seconds and Discord expects an answer
//! within three. The deferred response is then edited with the result embed.

use serenity::all::{
    CommandInteraction, ComponentInteraction, Context, CreateMessage, EditInteractionResponse,
    Interaction,
};

use crate::{
    bot::{
        command::{self, control},
        embed::Reply,
    },
    state::AppState,
};

/// Handles an incoming interaction: slash commands and control panel buttons.
pub async fn handle_interaction(state: &AppState, ctx: Context, interaction: Interaction) {
    match interaction {
        Interaction::Command(cmd) => handle_command(state, &ctx, cmd).await,
        Interaction::Component(component) => handle_component(state, &ctx, component).await,
        _ => {}
    }
}

async fn handle_command(state: &AppState, ctx: &Context, cmd: CommandInteraction) {
    tracing::info!(
        "/{} invoked by {} ({})",
        cmd.data.name,
        cmd.user.name,
        cmd.user.id
    );

    if let Err(e) = cmd.defer_ephemeral(&ctx.http).await {
        tracing::error!("Failed to defer /{}: {}", cmd.data.name, e);
        return;
    }

    let reply = command::dispatch(state, &cmd.data.name, &option_args(&cmd)).await;

    let response = if cmd.data.name == "control" {
        match post_panel(ctx, &cmd, &reply).await {
            Ok(()) => EditInteractionResponse::new().content("Control panel posted."),
            Err(e) => {
                tracing::error!("Failed to post control panel: {}", e);
                let failure = Reply::failure("/control", format!("Could not post panel: {}", e));
                EditInteractionResponse::new().embed(failure.embed())
            }
        }
    } else {
        EditInteractionResponse::new().embed(reply.embed())
    };

    if let Err(e) = cmd.edit_response(&ctx.http, response).await {
        tracing::error!("Failed to respond to /{}: {}", cmd.data.name, e);
    }
}

/// Posts the panel as a regular channel message so it outlives the interaction.
async fn post_panel(
    ctx: &Context,
    cmd: &CommandInteraction,
    panel: &Reply,
) -> Result<(), serenity::Error> {
    let message = CreateMessage::new()
        .embed(panel.embed())
        .components(control::buttons());
    cmd.channel_id.send_message(&ctx.http, message).await?;
    Ok(())
}

async fn handle_component(state: &AppState, ctx: &Context, component: ComponentInteraction) {
    let Some(action) = control::PanelAction::from_custom_id(&component.data.custom_id) else {
        tracing::debug!("Ignoring component {}", component.data.custom_id);
        return;
    };

    tracing::info!(
        "Panel button {:?} pressed by {} ({})",
        action,
        component.user.name,
        component.user.id
    );

    if let Err(e) = component.defer_ephemeral(&ctx.http).await {
        tracing::error!("Failed to defer panel button {:?}: {}", action, e);
        return;
    }

    let permissions = component.member.as_ref().and_then(|m| m.permissions);
    let reply = if control::allowed(action, permissions) {
        control::handle(state, action).await
    } else {
        tracing::warn!(
            "{} ({}) lacks permission for panel button {:?}",
            component.user.name,
            component.user.id,
            action
        );
        Reply::failure(
            "Control panel",
            "You need the Manage Server permission to use this button",
        )
    };

    if let Err(e) = component
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(reply.embed()))
        .await
    {
        tracing::error!("Failed to respond to panel button {:?}: {}", action, e);
    }
}

/// String options of a command as `(name, value)` pairs.
fn option_args(cmd: &CommandInteraction) -> Vec<(String, String)> {
    cmd.data
        .options
        .iter()
        .filter_map(|option| {
            option
                .value
                .as_str()
                .map(|value| (option.name.clone(), value.to_string()))
        })
        .collect()
}

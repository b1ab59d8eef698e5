//! `/control` panel: a persistent message with lifecycle buttons.
//!
//! Button presses arrive as component interactions and are routed through
//! [`handle`]. Every button except Status needs the same rights as the admin
//! slash commands, checked against the pressing member's resolved permissions.

use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, Permissions};

use crate::{
    bot::{
        command::{lifecycle, status},
        embed::Reply,
    },
    model::lifecycle::LifecycleAction,
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Start,
    Stop,
    Restart,
    Status,
}

impl PanelAction {
    pub const ALL: [PanelAction; 4] = [Self::Start, Self::Stop, Self::Restart, Self::Status];

    pub fn custom_id(self) -> &'static str {
        match self {
            Self::Start => "cp_start",
            Self::Stop => "cp_stop",
            Self::Restart => "cp_restart",
            Self::Status => "cp_status",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.custom_id() == id)
    }

    fn button(self) -> CreateButton {
        let (label, style) = match self {
            Self::Start => ("▶️ Start", ButtonStyle::Success),
            Self::Stop => ("⏹️ Stop", ButtonStyle::Danger),
            Self::Restart => ("🔄 Restart", ButtonStyle::Primary),
            Self::Status => ("📊 Status", ButtonStyle::Secondary),
        };
        CreateButton::new(self.custom_id()).label(label).style(style)
    }

    pub fn requires_admin(self) -> bool {
        self != Self::Status
    }
}

/// Whether a member with `permissions` may press the button for `action`.
///
/// Permissions are absent when the button is pressed outside a guild; only
/// Status is allowed then.
pub fn allowed(action: PanelAction, permissions: Option<Permissions>) -> bool {
    if !action.requires_admin() {
        return true;
    }
    let admin = Permissions::ADMINISTRATOR | Permissions::MANAGE_GUILD;
    permissions.is_some_and(|p| p.intersects(admin))
}

/// One row with all four buttons.
pub fn buttons() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(
        PanelAction::ALL.into_iter().map(PanelAction::button).collect(),
    )]
}

/// Embed posted above the buttons.
pub async fn panel(state: &AppState) -> Reply {
    let current = if state.control.is_running().await {
        "🟢 Online"
    } else {
        "🔴 Offline"
    };

    Reply::info(
        "🎛️ Server Control Panel",
        "Use the buttons below to manage the Minecraft Server.",
    )
    .field("Current Status", current)
}

/// Runs the action behind a pressed button.
pub async fn handle(state: &AppState, action: PanelAction) -> Reply {
    match action {
        PanelAction::Start => lifecycle::run(state, LifecycleAction::Start).await,
        PanelAction::Stop => lifecycle::run(state, LifecycleAction::Stop).await,
        PanelAction::Restart => lifecycle::run(state, LifecycleAction::Restart).await,
        PanelAction::Status => status::status(state.control.as_ref()).await,
    }
}

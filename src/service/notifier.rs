//! Operator-facing notifications.
//!
//! Three destinations: the debug channel for operators, the public log channel
//! for players, and alerts that ping the admin role in the debug channel.
//! Delivery failures are logged and swallowed; a notification is never the
//! reason an operation fails.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::{
    all::{ChannelId, CreateAllowedMentions, CreateMessage, RoleId},
    http::Http,
};

use crate::config::Config;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Operator information (debug channel).
    async fn debug(&self, message: &str);

    /// Player-visible announcement (log channel).
    async fn log(&self, message: &str);

    /// Something needs a human; mentions the admin role when configured.
    async fn alert(&self, message: &str);
}

pub struct DiscordNotifier {
    http: Arc<Http>,
    debug_channel: Option<ChannelId>,
    log_channel: Option<ChannelId>,
    admin_role: Option<RoleId>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, config: &Config) -> Self {
        Self {
            http,
            debug_channel: config.debug_channel_id.map(ChannelId::new),
            log_channel: config.log_channel_id.map(ChannelId::new),
            admin_role: config.admin_role_id.map(RoleId::new),
        }
    }

    async fn send(&self, channel: Option<ChannelId>, message: CreateMessage, text: &str) {
        let Some(channel_id) = channel else {
            tracing::debug!("No channel configured, dropping notification: {}", text);
            return;
        };

        if let Err(e) = channel_id.send_message(&self.http, message).await {
            tracing::error!("Failed to send notification to channel {}: {}", channel_id, e);
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn debug(&self, message: &str) {
        tracing::info!("{}", message);
        self.send(
            self.debug_channel,
            CreateMessage::new().content(message),
            message,
        )
        .await;
    }

    async fn log(&self, message: &str) {
        self.send(self.log_channel, CreateMessage::new().content(message), message)
            .await;
    }

    async fn alert(&self, message: &str) {
        tracing::warn!("{}", message);

        let message_builder = match self.admin_role {
            Some(role) => CreateMessage::new()
                .content(format!("<@&{}> ⚠️ {}", role, message))
                .allowed_mentions(CreateAllowedMentions::new().roles(vec![role])),
            None => CreateMessage::new().content(format!("⚠️ {}", message)),
        };

        self.send(self.debug_channel, message_builder, message).await;
    }
}

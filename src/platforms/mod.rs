use anyhow::Result;
use async_trait::async_trait;

use crate::types::{
    InviteSettings, MessageSummary, Permissions, RemoteMember, RemoteMessage, RemoteRole,
    RemoteUser,
};

pub mod discord;

#[cfg(test)]
pub mod mock;

/// Maximum number of messages the platform returns or bulk-deletes per call
pub const MAX_MESSAGES_PER_CALL: u8 = 100;

/// Remote operations the command handlers rely on. Every call goes to the
/// platform; implementations keep no state between invocations.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post plain text to a channel
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()>;

    /// Post a rich summary to a channel
    async fn send_summary(&self, channel_id: u64, summary: &MessageSummary) -> Result<()>;

    /// Effective permissions of a user in a guild channel
    async fn channel_permissions(&self, guild_id: u64, channel_id: u64, user_id: u64) -> Result<Permissions>;

    async fn guild_name(&self, guild_id: u64) -> Result<String>;

    async fn set_nickname(&self, guild_id: u64, user_id: u64, nickname: &str) -> Result<()>;

    async fn kick_member(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()>;

    async fn ban_member(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()>;

    /// Up to `limit` messages preceding `before`, newest first
    async fn messages_before(&self, channel_id: u64, before: u64, limit: u8) -> Result<Vec<RemoteMessage>>;

    /// Remove up to `MAX_MESSAGES_PER_CALL` messages in one call
    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> Result<()>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()>;

    async fn user(&self, user_id: u64) -> Result<RemoteUser>;

    async fn member(&self, guild_id: u64, user_id: u64) -> Result<RemoteMember>;

    /// The guild's role catalog in platform order
    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<RemoteRole>>;

    /// Create an invite and return its code
    async fn create_invite(&self, channel_id: u64, settings: InviteSettings) -> Result<String>;

    /// Open (or reuse) a direct-message channel and return its id
    async fn open_dm(&self, user_id: u64) -> Result<u64>;

    /// Release the gateway connection
    async fn disconnect(&self);
}

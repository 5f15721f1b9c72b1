//! In-memory platform for unit testing handlers without a gateway connection.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::platforms::ChatPlatform;
use crate::types::{
    InviteSettings, MessageSummary, Permissions, RemoteMember, RemoteMessage, RemoteRole,
    RemoteUser,
};

/// One recorded platform call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send { channel_id: u64, text: String },
    Summary { channel_id: u64, summary: MessageSummary },
    Permissions { user_id: u64 },
    GuildName,
    SetNickname { user_id: u64, nickname: String },
    Kick { user_id: u64, reason: Option<String> },
    Ban { user_id: u64, reason: Option<String> },
    FetchMessages { channel_id: u64, before: u64, limit: u8 },
    BulkDelete { channel_id: u64, message_ids: Vec<u64> },
    Delete { channel_id: u64, message_id: u64 },
    User { user_id: u64 },
    Member { user_id: u64 },
    Roles,
    Invite { channel_id: u64, settings: InviteSettings },
    OpenDm { user_id: u64 },
    Disconnect,
}

/// Records every call and serves canned guild data. Channel contents are
/// kept oldest-first and shrink as messages are deleted.
pub struct MockPlatform {
    calls: Mutex<Vec<Call>>,
    channels: Mutex<HashMap<u64, Vec<RemoteMessage>>>,
    permissions: HashMap<u64, Permissions>,
    users: HashMap<u64, RemoteUser>,
    members: HashMap<u64, RemoteMember>,
    roles: Vec<RemoteRole>,
    guild_name: String,
    invite_code: String,
    failing: HashSet<&'static str>,
    undeletable: HashSet<u64>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            channels: Mutex::new(HashMap::new()),
            permissions: HashMap::new(),
            users: HashMap::new(),
            members: HashMap::new(),
            roles: Vec::new(),
            guild_name: "Test Guild".to_string(),
            invite_code: "AbCdEf".to_string(),
            failing: HashSet::new(),
            undeletable: HashSet::new(),
        }
    }

    pub fn with_permissions(mut self, user_id: u64, permissions: Permissions) -> Self {
        self.permissions.insert(user_id, permissions);
        self
    }

    /// Seed a channel, oldest message first
    pub fn with_messages(self, channel_id: u64, messages: Vec<RemoteMessage>) -> Self {
        self.channels.lock().unwrap().insert(channel_id, messages);
        self
    }

    pub fn with_user(mut self, user: RemoteUser) -> Self {
        self.users.insert(user.id, user);
        self
    }

    pub fn with_member(mut self, member: RemoteMember) -> Self {
        self.members.insert(member.user.id, member);
        self
    }

    pub fn with_roles(mut self, roles: Vec<RemoteRole>) -> Self {
        self.roles = roles;
        self
    }

    /// Make every call of the named trait method fail
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Make deletion of one message fail
    pub fn undeletable(mut self, message_id: u64) -> Self {
        self.undeletable.insert(message_id);
        self
    }

    pub fn dm_channel_for(user_id: u64) -> u64 {
        900_000 + user_id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self, channel_id: u64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { channel_id: c, text } if c == channel_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self, channel_id: u64) -> Vec<MessageSummary> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Summary { channel_id: c, summary } if c == channel_id => Some(summary),
                _ => None,
            })
            .collect()
    }

    /// Ids still present in a channel, oldest first
    pub fn remaining(&self, channel_id: u64) -> Vec<u64> {
        self.channels
            .lock()
            .unwrap()
            .get(&channel_id)
            .map(|msgs| msgs.iter().map(|m| m.id).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            Err(anyhow!("mock {} failure", operation))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()> {
        self.check("send_message")?;
        self.record(Call::Send {
            channel_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_summary(&self, channel_id: u64, summary: &MessageSummary) -> Result<()> {
        self.check("send_summary")?;
        self.record(Call::Summary {
            channel_id,
            summary: summary.clone(),
        });
        Ok(())
    }

    async fn channel_permissions(&self, _guild_id: u64, _channel_id: u64, user_id: u64) -> Result<Permissions> {
        self.record(Call::Permissions { user_id });
        self.check("channel_permissions")?;
        Ok(self.permissions.get(&user_id).copied().unwrap_or_default())
    }

    async fn guild_name(&self, _guild_id: u64) -> Result<String> {
        self.record(Call::GuildName);
        self.check("guild_name")?;
        Ok(self.guild_name.clone())
    }

    async fn set_nickname(&self, _guild_id: u64, user_id: u64, nickname: &str) -> Result<()> {
        self.check("set_nickname")?;
        self.record(Call::SetNickname {
            user_id,
            nickname: nickname.to_string(),
        });
        Ok(())
    }

    async fn kick_member(&self, _guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        self.check("kick_member")?;
        self.record(Call::Kick {
            user_id,
            reason: reason.map(String::from),
        });
        Ok(())
    }

    async fn ban_member(&self, _guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        self.check("ban_member")?;
        self.record(Call::Ban {
            user_id,
            reason: reason.map(String::from),
        });
        Ok(())
    }

    async fn messages_before(&self, channel_id: u64, before: u64, limit: u8) -> Result<Vec<RemoteMessage>> {
        self.record(Call::FetchMessages {
            channel_id,
            before,
            limit,
        });
        self.check("messages_before")?;

        let channels = self.channels.lock().unwrap();
        let Some(messages) = channels.get(&channel_id) else {
            return Ok(Vec::new());
        };
        let end = messages
            .iter()
            .position(|m| m.id == before)
            .unwrap_or(messages.len());
        let start = end.saturating_sub(usize::from(limit));
        Ok(messages[start..end].iter().rev().cloned().collect())
    }

    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> Result<()> {
        self.record(Call::BulkDelete {
            channel_id,
            message_ids: message_ids.to_vec(),
        });
        self.check("bulk_delete")?;
        if let Some(messages) = self.channels.lock().unwrap().get_mut(&channel_id) {
            messages.retain(|m| !message_ids.contains(&m.id));
        }
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.record(Call::Delete {
            channel_id,
            message_id,
        });
        self.check("delete_message")?;
        if self.undeletable.contains(&message_id) {
            return Err(anyhow!("message {} cannot be deleted", message_id));
        }
        if let Some(messages) = self.channels.lock().unwrap().get_mut(&channel_id) {
            messages.retain(|m| m.id != message_id);
        }
        Ok(())
    }

    async fn user(&self, user_id: u64) -> Result<RemoteUser> {
        self.record(Call::User { user_id });
        self.check("user")?;
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown user {}", user_id))
    }

    async fn member(&self, _guild_id: u64, user_id: u64) -> Result<RemoteMember> {
        self.record(Call::Member { user_id });
        self.check("member")?;
        self.members
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown member {}", user_id))
    }

    async fn guild_roles(&self, _guild_id: u64) -> Result<Vec<RemoteRole>> {
        self.record(Call::Roles);
        self.check("guild_roles")?;
        Ok(self.roles.clone())
    }

    async fn create_invite(&self, channel_id: u64, settings: InviteSettings) -> Result<String> {
        self.record(Call::Invite {
            channel_id,
            settings,
        });
        self.check("create_invite")?;
        Ok(self.invite_code.clone())
    }

    async fn open_dm(&self, user_id: u64) -> Result<u64> {
        self.record(Call::OpenDm { user_id });
        self.check("open_dm")?;
        Ok(Self::dm_channel_for(user_id))
    }

    async fn disconnect(&self) {
        self.record(Call::Disconnect);
    }
}

/// Canned invocations and remote objects shared by handler tests
pub mod fixtures {
    use super::MockPlatform;
    use crate::bot::CommandContext;
    use crate::types::{Invocation, RemoteMessage, RemoteUser};

    pub const GUILD: u64 = 99;
    pub const CHANNEL: u64 = 10;
    pub const COMMAND_MESSAGE: u64 = 1_000_000;

    pub fn invocation(author_id: u64, tokens: &[&str]) -> Invocation {
        Invocation {
            author_id,
            author_name: "caller".to_string(),
            author_discriminator: Some(1),
            message_id: COMMAND_MESSAGE,
            channel_id: CHANNEL,
            guild_id: GUILD,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn context<'a>(platform: &'a MockPlatform, invocation: &'a Invocation) -> CommandContext<'a> {
        CommandContext {
            platform,
            invocation,
            prefix: "~",
        }
    }

    pub fn user(id: u64, name: &str) -> RemoteUser {
        RemoteUser {
            id,
            name: name.to_string(),
            discriminator: Some(42),
            avatar_hash: Some("hash".to_string()),
        }
    }

    pub fn message(id: u64, author: &RemoteUser, content: &str) -> RemoteMessage {
        RemoteMessage {
            id,
            author: author.clone(),
            content: content.to_string(),
            timestamp: format!("2024-01-01T00:00:{:02}+00:00", id % 60),
            attachments: Vec::new(),
            embeds: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// `count` messages with ids 1..=count followed by the invoking command
    pub fn channel_history(count: u64) -> Vec<RemoteMessage> {
        let author = user(3, "chatter");
        let mut messages: Vec<RemoteMessage> = (1..=count)
            .map(|id| message(id, &author, &format!("message {}", id)))
            .collect();
        messages.push(message(COMMAND_MESSAGE, &user(2, "caller"), "~command"));
        messages
    }
}

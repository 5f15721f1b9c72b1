// src/types/mod.rs - Request-scoped types shared by the command handlers

use std::fmt;
use std::ops::BitOr;

use chrono::{DateTime, Utc};
use thiserror::Error;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// The triggering event for a single command invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub author_id: u64,
    pub author_name: String,
    pub author_discriminator: Option<u16>,
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    /// Whitespace-separated tokens; token 0 is the command name without prefix
    pub tokens: Vec<String>,
}

impl Invocation {
    /// `name#1234`, or just `name` for accounts without a discriminator
    pub fn author_tag(&self) -> String {
        user_tag(&self.author_name, self.author_discriminator)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Tokens from `start` onwards joined by single spaces, `None` when there are none
    pub fn rest_from(&self, start: usize) -> Option<String> {
        if self.tokens.len() > start {
            Some(self.tokens[start..].join(" "))
        } else {
            None
        }
    }

    pub fn line(&self) -> String {
        self.tokens.join(" ")
    }
}

pub fn user_tag(name: &str, discriminator: Option<u16>) -> String {
    match discriminator {
        Some(d) => format!("{}#{:04}", name, d),
        None => name.to_string(),
    }
}

/// Capability bitmask resolved for a user in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(pub u64);

impl Permissions {
    pub const NONE: Self = Self(0);
    pub const CREATE_INSTANT_INVITE: Self = Self(1 << 0);
    pub const KICK_MEMBERS: Self = Self(1 << 1);
    pub const BAN_MEMBERS: Self = Self(1 << 2);
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    pub const MANAGE_MESSAGES: Self = Self(1 << 13);
    pub const CHANGE_NICKNAME: Self = Self(1 << 26);
    pub const MANAGE_NICKNAMES: Self = Self(1 << 27);

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_administrator(self) -> bool {
        self.intersects(Self::ADMINISTRATOR)
    }

    /// Administrator overrides every other capability check
    pub fn allows(self, required: Self) -> bool {
        self.intersects(required) || self.is_administrator()
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A user as seen through the platform API
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteUser {
    pub id: u64,
    pub name: String,
    pub discriminator: Option<u16>,
    pub avatar_hash: Option<String>,
}

impl RemoteUser {
    pub fn tag(&self) -> String {
        user_tag(&self.name, self.discriminator)
    }

    /// CDN URL of the user's avatar at the requested size, falling back to the default avatar
    pub fn avatar_url(&self, size: u16) -> String {
        match &self.avatar_hash {
            Some(hash) => {
                let ext = if hash.starts_with("a_") { "gif" } else { "png" };
                format!("{}/avatars/{}/{}.{}?size={}", CDN_BASE, self.id, hash, ext, size)
            }
            None => {
                let index = match self.discriminator {
                    Some(d) => u64::from(d) % 5,
                    None => (self.id >> 22) % 6,
                };
                format!("{}/embed/avatars/{}.png", CDN_BASE, index)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteMember {
    pub user: RemoteUser,
    pub nickname: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub role_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRole {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAttachment {
    pub filename: String,
    pub proxy_url: String,
}

/// Rich embed on a fetched message. `Some` marks a present block even when its URL is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_proxy_url: Option<String>,
    pub thumbnail_proxy_url: Option<String>,
    pub video_url: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteReaction {
    pub emoji: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteMessage {
    pub id: u64,
    pub author: RemoteUser,
    pub content: String,
    /// ISO-8601 timestamp as reported by the platform
    pub timestamp: String,
    pub attachments: Vec<RemoteAttachment>,
    pub embeds: Vec<RemoteEmbed>,
    pub reactions: Vec<RemoteReaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryField {
    pub name: String,
    pub value: String,
}

/// Formatted rich post: republished messages, profile pictures and member info
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSummary {
    pub title: Option<String>,
    pub author: Option<SummaryAuthor>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
    pub image_url: Option<String>,
    pub fields: Vec<SummaryField>,
}

impl MessageSummary {
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(SummaryField {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Parameters for a channel invite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteSettings {
    pub max_age_seconds: u32,
    /// 0 means unlimited
    pub max_uses: u8,
    pub temporary: bool,
}

impl InviteSettings {
    pub const SIX_HOURS_UNLIMITED: Self = Self {
        max_age_seconds: 21600,
        max_uses: 0,
        temporary: false,
    };
}

/// Whether the bot keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFlow {
    Continue,
    Exit,
}

/// Terminal failure of a command; the display text is what the invoking channel sees
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Malformed invocation, nothing was sent to the platform
    #[error("{0}")]
    Usage(String),

    /// A platform call failed
    #[error("{reply}")]
    Remote { reply: String, detail: String },

    /// The invoking user lacks the capability
    #[error("{0}")]
    PermissionDenied(String),
}

impl CommandError {
    pub fn remote(reply: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self::Remote {
            reply: reply.into(),
            detail: detail.to_string(),
        }
    }

    pub fn reply(&self) -> String {
        self.to_string()
    }
}

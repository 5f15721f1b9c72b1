use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serenity::all::{
    ChannelId, Client, Context, CreateEmbed, CreateEmbedAuthor, CreateInvite, CreateMessage,
    EditMember, EventHandler, GatewayIntents, GetMessages, GuildId, Http, Message, MessageId,
    ReactionType, Ready, ShardMessenger, Timestamp, User, UserId,
};
use std::sync::Arc;

use crate::bot::ChatBot;
use crate::platforms::{ChatPlatform, MAX_MESSAGES_PER_CALL};
use crate::types::{
    CommandFlow, InviteSettings, MessageSummary, Permissions, RemoteAttachment, RemoteEmbed,
    RemoteMember, RemoteMessage, RemoteReaction, RemoteRole, RemoteUser,
};

/// Platform calls for one inbound event, backed by serenity's REST client
pub struct DiscordPlatform {
    http: Arc<Http>,
    shard: Option<ShardMessenger>,
}

impl DiscordPlatform {
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            http: Arc::clone(&ctx.http),
            shard: Some(ctx.shard.clone()),
        }
    }

    fn convert_user(user: &User) -> RemoteUser {
        RemoteUser {
            id: user.id.get(),
            name: user.name.clone(),
            discriminator: user.discriminator.map(|d| d.get()),
            avatar_hash: user.avatar.as_ref().map(|hash| hash.to_string()),
        }
    }

    fn convert_message(msg: &Message) -> RemoteMessage {
        let attachments = msg
            .attachments
            .iter()
            .map(|a| RemoteAttachment {
                filename: a.filename.clone(),
                proxy_url: a.proxy_url.clone(),
            })
            .collect();

        let embeds = msg
            .embeds
            .iter()
            .map(|e| RemoteEmbed {
                title: e.title.clone(),
                description: e.description.clone(),
                image_proxy_url: e.image.as_ref().map(|i| i.proxy_url.clone().unwrap_or_default()),
                thumbnail_proxy_url: e
                    .thumbnail
                    .as_ref()
                    .map(|t| t.proxy_url.clone().unwrap_or_default()),
                video_url: e.video.as_ref().map(|v| v.url.clone()),
                footer_text: e.footer.as_ref().map(|f| f.text.clone()),
            })
            .collect();

        let reactions = msg
            .reactions
            .iter()
            .map(|r| RemoteReaction {
                emoji: reaction_name(&r.reaction_type),
                count: r.count,
            })
            .collect();

        RemoteMessage {
            id: msg.id.get(),
            author: Self::convert_user(&msg.author),
            content: msg.content.clone(),
            timestamp: msg.timestamp.to_rfc3339().unwrap_or_default(),
            attachments,
            embeds,
            reactions,
        }
    }

    fn build_embed(summary: &MessageSummary) -> Result<CreateEmbed> {
        let mut embed = CreateEmbed::new();
        if let Some(title) = &summary.title {
            embed = embed.title(title);
        }
        if let Some(author) = &summary.author {
            let mut builder = CreateEmbedAuthor::new(&author.name);
            if let Some(icon) = &author.icon_url {
                builder = builder.icon_url(icon);
            }
            embed = embed.author(builder);
        }
        if let Some(description) = &summary.description {
            embed = embed.description(description);
        }
        if let Some(timestamp) = &summary.timestamp {
            let parsed = Timestamp::parse(timestamp)
                .map_err(|e| anyhow::anyhow!("Invalid timestamp '{}': {}", timestamp, e))?;
            embed = embed.timestamp(parsed);
        }
        if let Some(image) = &summary.image_url {
            embed = embed.image(image);
        }
        for field in &summary.fields {
            embed = embed.field(&field.name, &field.value, false);
        }
        Ok(embed)
    }
}

fn reaction_name(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(s) => s.clone(),
        ReactionType::Custom { name, .. } => name.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId::new(channel_id)
            .say(&*self.http, text)
            .await
            .with_context(|| format!("Failed to send message to channel {}", channel_id))?;
        debug!("Sent message to channel {}: {}", channel_id, text);
        Ok(())
    }

    async fn send_summary(&self, channel_id: u64, summary: &MessageSummary) -> Result<()> {
        let embed = Self::build_embed(summary)?;
        ChannelId::new(channel_id)
            .send_message(&*self.http, CreateMessage::new().embed(embed))
            .await
            .with_context(|| format!("Failed to send embed to channel {}", channel_id))?;
        Ok(())
    }

    async fn channel_permissions(&self, guild_id: u64, channel_id: u64, user_id: u64) -> Result<Permissions> {
        let guild_id = GuildId::new(guild_id);
        let guild = self.http.get_guild(guild_id).await.context("Failed to load guild")?;
        let channel = self
            .http
            .get_channel(ChannelId::new(channel_id))
            .await
            .context("Failed to load channel")?
            .guild()
            .context("Channel is not part of a guild")?;
        let member = self
            .http
            .get_member(guild_id, UserId::new(user_id))
            .await
            .context("Failed to load member")?;

        let resolved = guild.user_permissions_in(&channel, &member);
        Ok(Permissions(resolved.bits()))
    }

    async fn guild_name(&self, guild_id: u64) -> Result<String> {
        let guild = self.http.get_guild(GuildId::new(guild_id)).await?;
        Ok(guild.name)
    }

    async fn set_nickname(&self, guild_id: u64, user_id: u64, nickname: &str) -> Result<()> {
        GuildId::new(guild_id)
            .edit_member(&*self.http, UserId::new(user_id), EditMember::new().nickname(nickname))
            .await?;
        Ok(())
    }

    async fn kick_member(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        let guild = GuildId::new(guild_id);
        let user = UserId::new(user_id);
        match reason {
            Some(reason) => guild.kick_with_reason(&*self.http, user, reason).await?,
            None => guild.kick(&*self.http, user).await?,
        }
        Ok(())
    }

    async fn ban_member(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        let guild = GuildId::new(guild_id);
        let user = UserId::new(user_id);
        match reason {
            Some(reason) => guild.ban_with_reason(&*self.http, user, 0, reason).await?,
            None => guild.ban(&*self.http, user, 0).await?,
        }
        Ok(())
    }

    async fn messages_before(&self, channel_id: u64, before: u64, limit: u8) -> Result<Vec<RemoteMessage>> {
        let limit = limit.clamp(1, MAX_MESSAGES_PER_CALL);
        let messages = ChannelId::new(channel_id)
            .messages(
                &*self.http,
                GetMessages::new().before(MessageId::new(before)).limit(limit),
            )
            .await?;
        Ok(messages.iter().map(Self::convert_message).collect())
    }

    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> Result<()> {
        let channel = ChannelId::new(channel_id);
        match message_ids {
            [] => Ok(()),
            // The bulk endpoint rejects fewer than two ids
            [single] => {
                channel.delete_message(&*self.http, MessageId::new(*single)).await?;
                Ok(())
            }
            ids => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                let body = serde_json::json!({ "messages": ids });
                self.http.delete_messages(channel, &body, None).await?;
                Ok(())
            }
        }
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        ChannelId::new(channel_id)
            .delete_message(&*self.http, MessageId::new(message_id))
            .await?;
        Ok(())
    }

    async fn user(&self, user_id: u64) -> Result<RemoteUser> {
        let user = self.http.get_user(UserId::new(user_id)).await?;
        Ok(Self::convert_user(&user))
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Result<RemoteMember> {
        let member = self
            .http
            .get_member(GuildId::new(guild_id), UserId::new(user_id))
            .await?;
        Ok(RemoteMember {
            user: Self::convert_user(&member.user),
            nickname: member.nick.clone(),
            joined_at: member
                .joined_at
                .and_then(|t| chrono::DateTime::from_timestamp(t.unix_timestamp(), 0)),
            role_ids: member.roles.iter().map(|r| r.get()).collect(),
        })
    }

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<RemoteRole>> {
        let roles = self.http.get_guild_roles(GuildId::new(guild_id)).await?;
        Ok(roles
            .into_iter()
            .map(|r| RemoteRole {
                id: r.id.get(),
                name: r.name,
            })
            .collect())
    }

    async fn create_invite(&self, channel_id: u64, settings: InviteSettings) -> Result<String> {
        let builder = CreateInvite::new()
            .max_age(settings.max_age_seconds)
            .max_uses(settings.max_uses)
            .temporary(settings.temporary);
        let invite = ChannelId::new(channel_id)
            .create_invite(&*self.http, builder)
            .await?;
        Ok(invite.code)
    }

    async fn open_dm(&self, user_id: u64) -> Result<u64> {
        let channel = UserId::new(user_id).create_dm_channel(&*self.http).await?;
        Ok(channel.id.get())
    }

    async fn disconnect(&self) {
        match &self.shard {
            Some(shard) => {
                shard.shutdown_clean();
                info!("Disconnected from Discord");
            }
            None => warn!("No gateway connection to release"),
        }
    }
}

/// Gateway event handler forwarding guild messages to the bot
pub struct DiscordHandler {
    bot: Arc<ChatBot>,
}

impl DiscordHandler {
    pub fn new(bot: Arc<ChatBot>) -> Self {
        Self { bot }
    }
}

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Connected to Discord as {} in {} guilds",
            ready.user.tag(),
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let Some((command, invocation)) = self.bot.parse_invocation(
            &msg.content,
            msg.author.id.get(),
            &msg.author.name,
            msg.author.discriminator.map(|d| d.get()),
            msg.id.get(),
            msg.channel_id.get(),
            guild_id.get(),
        ) else {
            return;
        };

        let platform = DiscordPlatform::from_context(&ctx);
        if self.bot.process_invocation(&platform, command, invocation).await == CommandFlow::Exit {
            info!("Exiting on shutdown command");
            std::process::exit(0);
        }
    }
}

/// Member lookups go through REST, so the only privileged intent is message content
fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::DIRECT_MESSAGES
}

/// Connect to the gateway and dispatch events until the connection ends
pub async fn run(token: &str, bot: Arc<ChatBot>) -> Result<()> {
    info!("Connecting to Discord gateway...");

    let mut client = Client::builder(token, gateway_intents())
        .event_handler(DiscordHandler::new(bot))
        .await
        .context("Failed to create Discord client")?;

    if let Err(e) = client.start().await {
        error!("Discord client stopped: {}", e);
        return Err(e.into());
    }

    warn!("Discord connection handler exited");
    Ok(())
}

// src/bot/info.rs - Informational commands: profile, about, uptime, invite, help

use std::time::Duration;

use log::{error, info, warn};
use tokio::time::Instant;

use super::commands::Command;
use super::parsing::{parse_mention, TargetReference};
use super::permissions::require;
use super::reconstruct::author_label;
use super::CommandContext;
use crate::types::{CommandError, InviteSettings, MessageSummary, Permissions, RemoteRole};

const PROFILE_IMAGE_SIZE: u16 = 512;
const INVITE_BASE: &str = "https://discord.gg";

fn single_target(ctx: &CommandContext<'_>, command: Command) -> Result<TargetReference, CommandError> {
    if ctx.invocation.tokens.len() != 2 {
        return Err(ctx.usage(command));
    }
    ctx.invocation
        .arg(1)
        .and_then(parse_mention)
        .ok_or_else(|| ctx.usage(command))
}

async fn post_summary(ctx: &CommandContext<'_>, summary: &MessageSummary) -> bool {
    match ctx.platform.send_summary(ctx.invocation.channel_id, summary).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send result message! {}", e);
            false
        }
    }
}

/// Post a user's avatar at full size
pub async fn profile(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let target = single_target(ctx, Command::Profile)?;

    let user = ctx
        .platform
        .user(target.user_id)
        .await
        .map_err(|e| CommandError::remote("Error retrieving the user. :frowning:", e))?;

    let nickname = match ctx.platform.member(ctx.invocation.guild_id, user.id).await {
        Ok(member) => member.nickname,
        Err(e) => {
            warn!("Could not find a nickname for user {}: {}", user.id, e);
            None
        }
    };

    let summary = MessageSummary {
        title: Some(format!(
            "Profile Picture for {}",
            author_label(&user, nickname.as_deref())
        )),
        image_url: Some(user.avatar_url(PROFILE_IMAGE_SIZE)),
        ..MessageSummary::default()
    };

    if post_summary(ctx, &summary).await {
        info!("Returned profile picture for user {}", user.id);
    }
    Ok(())
}

/// Names of the member's roles, in the order the guild lists them
pub fn member_role_names(catalog: &[RemoteRole], member_roles: &[u64]) -> Vec<String> {
    catalog
        .iter()
        .filter(|role| member_roles.contains(&role.id))
        .map(|role| role.name.clone())
        .collect()
}

/// Post join date, nickname and roles for a member
pub async fn about(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let target = single_target(ctx, Command::About)?;
    let guild_id = ctx.invocation.guild_id;

    let member = ctx
        .platform
        .member(guild_id, target.user_id)
        .await
        .map_err(|e| CommandError::remote("Error retrieving the user. :frowning:", e))?;

    let joined_at = member.joined_at.ok_or_else(|| {
        CommandError::remote(
            "Error parsing Discord's dates. :frowning:",
            format!("member {} has no join date", member.user.id),
        )
    })?;

    let catalog = ctx
        .platform
        .guild_roles(guild_id)
        .await
        .map_err(|e| CommandError::remote("Error retrieving the guild's roles. :frowning:", e))?;

    let roles = member_role_names(&catalog, &member.role_ids);

    let mut summary = MessageSummary {
        title: Some(format!("About {}", member.user.tag())),
        ..MessageSummary::default()
    };
    summary.push_field("Server Join Date", joined_at.format("%m/%d/%Y").to_string());
    summary.push_field(
        "Nickname",
        member
            .nickname
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
    );
    // Empty field values are rejected by the platform
    summary.push_field(
        "Roles",
        if roles.is_empty() {
            "None".to_string()
        } else {
            roles.join(", ")
        },
    );

    if post_summary(ctx, &summary).await {
        info!("Returned information about user {}", member.user.id);
    }
    Ok(())
}

/// Render like `1h2m3.4s`, `2m0s`, `3.4s`, `400ms`, truncated to tenths of a second
pub fn format_uptime(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    if tenths == 0 {
        return "0s".to_string();
    }
    if tenths < 10 {
        return format!("{}ms", tenths * 100);
    }

    let total_secs = tenths / 10;
    let fraction = tenths % 10;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = if fraction > 0 {
        format!("{}.{}", total_secs % 60, fraction)
    } else {
        (total_secs % 60).to_string()
    };

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub async fn uptime(ctx: &CommandContext<'_>, started_at: Instant) -> Result<(), CommandError> {
    let text = format!(":robot: Uptime: {}", format_uptime(started_at.elapsed()));
    if ctx.reply(&text).await {
        info!("Reported uptime");
    }
    Ok(())
}

/// Six-hour, unlimited-use invite to the current channel
pub async fn invite(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    require(
        ctx,
        Permissions::CREATE_INSTANT_INVITE,
        "Sorry, you aren't allowed to create an instant invite.",
    )
    .await?;

    let code = ctx
        .platform
        .create_invite(ctx.invocation.channel_id, InviteSettings::SIX_HOURS_UNLIMITED)
        .await
        .map_err(|e| CommandError::remote("Error creating invite. Try again in a moment.", e))?;

    ctx.reply(&format!(
        ":mailbox_with_mail: Here's your invitation! {}/{}",
        INVITE_BASE, code
    ))
    .await;
    info!("Created invite {} for channel {}", code, ctx.invocation.channel_id);
    Ok(())
}

pub async fn help(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let lines: Vec<String> = Command::ALL
        .iter()
        .map(|command| command.usage(ctx.prefix))
        .collect();
    ctx.reply(&lines.join("\n")).await;
    Ok(())
}

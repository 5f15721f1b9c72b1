// src/bot/moderation.rs - Member moderation: rename, kick and ban

use log::{error, info};

use super::commands::Command;
use super::notifier;
use super::parsing::{parse_mention, TargetReference};
use super::permissions::{authorize, require};
use super::CommandContext;
use crate::types::{CommandError, Permissions};

const GUILD_NAME_FALLBACK: &str = "error: could not retrieve";

fn target(ctx: &CommandContext<'_>, command: Command) -> Result<TargetReference, CommandError> {
    ctx.invocation
        .arg(1)
        .and_then(parse_mention)
        .ok_or_else(|| ctx.usage(command))
}

async fn guild_name(ctx: &CommandContext<'_>) -> String {
    match ctx.platform.guild_name(ctx.invocation.guild_id).await {
        Ok(name) => name,
        Err(e) => {
            error!("Unable to load guild {}: {}", ctx.invocation.guild_id, e);
            GUILD_NAME_FALLBACK.to_string()
        }
    }
}

fn removal_notice(action: &str, guild: &str, moderator: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!(
            "You have been {} from **{}** by {} because: {}",
            action, guild, moderator, reason
        ),
        None => format!("You have been {} from **{}** by {}.", action, guild, moderator),
    }
}

/// Rename yourself (change-nickname) or anyone else (manage-nicknames)
pub async fn rename(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let inv = ctx.invocation;
    let self_target = inv
        .arg(1)
        .is_some_and(|token| token.contains(&inv.author_id.to_string()));

    let allowed = (self_target && authorize(ctx, Permissions::CHANGE_NICKNAME).await)
        || authorize(ctx, Permissions::MANAGE_NICKNAMES).await;
    if !allowed {
        return Err(CommandError::PermissionDenied(
            "Sorry, you aren't allowed to change nicknames.".to_string(),
        ));
    }

    let target = target(ctx, Command::Nick)?;
    let nickname = inv.rest_from(2).ok_or_else(|| ctx.usage(Command::Nick))?;

    ctx.platform
        .set_nickname(inv.guild_id, target.user_id, &nickname)
        .await
        .map_err(|e| CommandError::remote(e.to_string(), &e))?;

    ctx.reply("Done!").await;
    info!("Successfully renamed user {} to '{}'", target.user_id, nickname);
    Ok(())
}

/// Kick a member. The DM goes out first, while the bot still shares a server with them.
pub async fn kick(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    require(ctx, Permissions::KICK_MEMBERS, "Sorry, you aren't allowed to kick users.").await?;

    let inv = ctx.invocation;
    let target = target(ctx, Command::Kick)?;
    let reason = inv.rest_from(2);

    let guild = guild_name(ctx).await;
    let notice = removal_notice("kicked", &guild, &inv.author_tag(), reason.as_deref());
    notifier::notify(ctx.platform, target.user_id, &notice).await;

    ctx.platform
        .kick_member(inv.guild_id, target.user_id, reason.as_deref())
        .await
        .map_err(|e| CommandError::remote("Failed to kick the user.", e))?;

    let confirmation = match &reason {
        Some(reason) => format!(
            ":wave: Kicked {} for the following reason: '{}'.",
            target.mention, reason
        ),
        None => format!(":wave: Kicked {}.", target.mention),
    };
    ctx.reply(&confirmation).await;
    info!("Kicked user {}", target.user_id);
    Ok(())
}

/// Ban a member, then tell them why
pub async fn ban(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    require(ctx, Permissions::BAN_MEMBERS, "Sorry, you aren't allowed to ban users.").await?;

    let inv = ctx.invocation;
    let target = target(ctx, Command::Ban)?;
    let reason = inv.rest_from(2);

    ctx.platform
        .ban_member(inv.guild_id, target.user_id, reason.as_deref())
        .await
        .map_err(|e| CommandError::remote("Failed to ban the user.", e))?;

    let guild = guild_name(ctx).await;
    let notice = removal_notice("banned", &guild, &inv.author_tag(), reason.as_deref());
    notifier::notify(ctx.platform, target.user_id, &notice).await;

    let confirmation = match &reason {
        Some(reason) => format!(
            ":hammer: Banned {} for the following reason: '{}'.",
            target.mention, reason
        ),
        None => format!(":hammer: Banned {}.", target.mention),
    };
    ctx.reply(&confirmation).await;
    info!("Banned user {}", target.user_id);
    Ok(())
}

// src/bot/messages.rs - Channel housekeeping: purge, copy and move

use std::time::Duration;

use log::{error, info, warn};

use super::commands::Command;
use super::parsing::{parse_channel, parse_count};
use super::permissions::require;
use super::reconstruct::reconstruct;
use super::CommandContext;
use crate::platforms::MAX_MESSAGES_PER_CALL;
use crate::types::{CommandError, Permissions};

/// Pause between the last bulk delete and removing the command itself
pub const PURGE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Delete the last N messages before the command, then the command message
pub async fn purge(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    require(ctx, Permissions::MANAGE_MESSAGES, "Sorry, you aren't allowed to remove messages.").await?;

    let inv = ctx.invocation;
    if inv.tokens.len() != 2 {
        return Err(ctx.usage(Command::Purge));
    }
    let count = inv
        .arg(1)
        .and_then(parse_count)
        .ok_or_else(|| ctx.usage(Command::Purge))?;
    if count < 1 {
        warn!("User '{}' attempted to purge {} messages", inv.author_tag(), count);
        return Err(CommandError::Usage(
            ":frowning: Sorry, you must purge at least 1 message. Try again.".to_string(),
        ));
    }

    let mut remaining = count as u64;
    let mut removed = 0usize;
    while remaining > 0 {
        let page = remaining.min(u64::from(MAX_MESSAGES_PER_CALL)) as u8;

        let messages = ctx
            .platform
            .messages_before(inv.channel_id, inv.message_id, page)
            .await
            .map_err(|e| {
                CommandError::remote(
                    ":frowning: I couldn't pull messages from the channel. Try again.",
                    e,
                )
            })?;

        // A short page means the channel is exhausted
        if messages.len() < usize::from(page) {
            remaining = 0;
        } else {
            remaining -= u64::from(page);
        }

        if messages.is_empty() {
            continue;
        }

        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        match ctx.platform.bulk_delete(inv.channel_id, &ids).await {
            Ok(()) => removed += ids.len(),
            Err(e) => warn!("Failed to bulk delete messages! Attempting to continue... {}", e),
        }
    }

    tokio::time::sleep(PURGE_SETTLE_DELAY).await;

    if let Err(e) = ctx.platform.delete_message(inv.channel_id, inv.message_id).await {
        error!("Failed to delete invoked command! {}", e);
        return Ok(());
    }
    info!("Purged {} messages, including command invoked", removed + 1);
    Ok(())
}

/// Whether republished messages stay in the source channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    fn command(self) -> Command {
        match self {
            TransferMode::Copy => Command::Copy,
            TransferMode::Move => Command::Move,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            TransferMode::Copy => "Copied",
            TransferMode::Move => "Moved",
        }
    }
}

/// Republish the last N messages into another channel, oldest first.
/// In move mode every source message is deleted before its copy is posted.
pub async fn transfer(ctx: &CommandContext<'_>, mode: TransferMode) -> Result<(), CommandError> {
    require(ctx, Permissions::MANAGE_MESSAGES, "Sorry, you aren't allowed to manage messages.").await?;

    let inv = ctx.invocation;
    let command = mode.command();
    if inv.tokens.len() != 3 {
        return Err(ctx.usage(command));
    }
    let count = inv
        .arg(1)
        .and_then(parse_count)
        .filter(|c| *c >= 1)
        .ok_or_else(|| ctx.usage(command))?;
    let destination = inv
        .arg(2)
        .and_then(parse_channel)
        .ok_or_else(|| ctx.usage(command))?;

    let limit = count.min(i64::from(MAX_MESSAGES_PER_CALL)) as u8;
    let mut messages = ctx
        .platform
        .messages_before(inv.channel_id, inv.message_id, limit)
        .await
        .map_err(|e| CommandError::remote("Ran into an error retrieving messages. :slight_frown:", e))?;

    // Fetched newest first
    messages.reverse();

    let mut posted = 0usize;
    for message in &messages {
        if mode == TransferMode::Move {
            if let Err(e) = ctx.platform.delete_message(inv.channel_id, message.id).await {
                warn!("Failed to delete a message. Attempting to continue... {}", e);
            }
        }

        let summary = reconstruct(ctx.platform, inv.guild_id, message).await;
        if let Err(e) = ctx.platform.send_summary(destination, &summary).await {
            return Err(CommandError::remote(
                format!(
                    "Ran into an error posting messages to <#{}>. :slight_frown:",
                    destination
                ),
                e,
            ));
        }
        posted += 1;
    }

    ctx.reply(&format!(
        "Copied {} messages from <#{}> to <#{}>! :smile:",
        posted,
        inv.channel_id,
        destination
    ))
    .await;
    info!(
        "{} {} messages from channel {} to channel {}",
        mode.verb(),
        posted,
        inv.channel_id,
        destination
    );
    Ok(())
}

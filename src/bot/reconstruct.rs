// src/bot/reconstruct.rs - Rebuilds a fetched message as a rich summary for republishing

use log::{debug, warn};

use crate::platforms::ChatPlatform;
use crate::types::{MessageSummary, RemoteMessage, RemoteUser, SummaryAuthor};

/// Discord's embed limits; larger summaries are rejected outright
pub const MAX_SUMMARY_FIELDS: usize = 25;
pub const MAX_FIELD_NAME_CHARS: usize = 256;
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

const AVATAR_ICON_SIZE: u16 = 128;

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
fn clip(text: &mut String, max: usize) -> bool {
    if text.chars().count() <= max {
        return false;
    }
    let kept: String = text.chars().take(max - 1).collect();
    *text = kept + "…";
    true
}

/// `nick (name#1234)` when a nickname is set, otherwise `name#1234`
pub fn author_label(user: &RemoteUser, nickname: Option<&str>) -> String {
    match nickname.filter(|n| !n.is_empty()) {
        Some(nick) => format!("{} ({})", nick, user.tag()),
        None => user.tag(),
    }
}

/// Build the summary for one message. Field order is attachments, embeds, reactions.
pub fn summarize(message: &RemoteMessage, nickname: Option<&str>) -> MessageSummary {
    let mut summary = MessageSummary {
        author: Some(SummaryAuthor {
            name: author_label(&message.author, nickname),
            icon_url: Some(message.author.avatar_url(AVATAR_ICON_SIZE)),
        }),
        timestamp: Some(message.timestamp.clone()).filter(|t| !t.is_empty()),
        ..MessageSummary::default()
    };

    if !message.content.is_empty() {
        summary.description = Some(message.content.clone());
    }

    for attachment in &message.attachments {
        summary.push_field(
            format!("Attachment: {}", attachment.filename),
            attachment.proxy_url.clone(),
        );
    }

    for embed in &message.embeds {
        let parts = [
            ("Embed Title", &embed.title),
            ("Embed Text", &embed.description),
            ("Embed Image", &embed.image_proxy_url),
            ("Embed Thumbnail", &embed.thumbnail_proxy_url),
            ("Embed Video", &embed.video_url),
            ("Embed Footer", &embed.footer_text),
        ];
        // Empty field values are rejected by the platform
        for (name, value) in parts {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                summary.push_field(name, value);
            }
        }
    }

    if !message.reactions.is_empty() {
        let tally = message
            .reactions
            .iter()
            .map(|r| format!("{} x{}", r.emoji, r.count))
            .collect::<Vec<_>>()
            .join(", ");
        summary.push_field("Reactions", tally);
    }

    if summary.fields.len() > MAX_SUMMARY_FIELDS {
        warn!(
            "Message {} has {} summary fields, keeping the first {}",
            message.id,
            summary.fields.len(),
            MAX_SUMMARY_FIELDS
        );
        summary.fields.truncate(MAX_SUMMARY_FIELDS);
    }

    for field in &mut summary.fields {
        let clipped_name = clip(&mut field.name, MAX_FIELD_NAME_CHARS);
        let clipped_value = clip(&mut field.value, MAX_FIELD_VALUE_CHARS);
        if clipped_name || clipped_value {
            debug!("Shortened oversized field '{}' on message {}", field.name, message.id);
        }
    }

    summary
}

/// Look up the author's nickname in the guild and summarize the message.
/// A failed lookup only drops the nickname decoration.
pub async fn reconstruct(platform: &dyn ChatPlatform, guild_id: u64, message: &RemoteMessage) -> MessageSummary {
    let nickname = match platform.member(guild_id, message.author.id).await {
        Ok(member) => member.nickname,
        Err(e) => {
            warn!("Could not find a nickname for user {}: {}", message.author.id, e);
            None
        }
    };

    debug!(
        "Reconstructing message {}: {} attachments, {} embeds, {} reactions",
        message.id,
        message.attachments.len(),
        message.embeds.len(),
        message.reactions.len()
    );

    summarize(message, nickname.as_deref())
}

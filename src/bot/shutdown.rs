// src/bot/shutdown.rs - Remote shutdown for authorized operators

use log::{info, warn};
use std::time::Duration;
use tokio::time::sleep;

use super::CommandContext;
use crate::types::{CommandError, CommandFlow};

/// Pauses between the messages an unauthorized caller receives
pub const JOKE_PAUSES: [Duration; 2] = [Duration::from_secs(10), Duration::from_secs(2)];

const JOKE_FOLLOW_UP: &str =
    "Bruh this gonna be you when the bot owner and their crew get here... I just pinged them so you better be afraid :slight_smile:";
const JOKE_GIF: &str = "https://media4.giphy.com/media/3o6Ztm3eJNDBy4NfiM/giphy.gif";

fn owner_reference(authorized: &[u64]) -> String {
    match authorized.first() {
        Some(id) => format!("<@{}>", id),
        None => "the bot owner".to_string(),
    }
}

/// Close the gateway and ask the process to exit, or tease whoever tried
pub async fn shutdown(ctx: &CommandContext<'_>, authorized: &[u64]) -> Result<CommandFlow, CommandError> {
    let inv = ctx.invocation;

    if authorized.contains(&inv.author_id) {
        ctx.reply("Shutting Down.").await;
        info!("Shutdown requested by '{}', closing connection", inv.author_tag());
        ctx.platform.disconnect().await;
        return Ok(CommandFlow::Exit);
    }

    warn!("User '{}' attempted to shut down the bot", inv.author_tag());

    let opener = format!(
        "You dare try and go against the wishes of {} ..? ",
        owner_reference(authorized)
    );
    let follow_ups = [JOKE_FOLLOW_UP, JOKE_GIF];

    if !ctx.reply(&opener).await {
        return Ok(CommandFlow::Continue);
    }
    for (pause, text) in JOKE_PAUSES.iter().zip(follow_ups) {
        sleep(*pause).await;
        if !ctx.reply(text).await {
            break;
        }
    }

    Ok(CommandFlow::Continue)
}

use log::{error, info, warn};
use tokio::time::Instant;

use crate::config::BotConfig;
use crate::platforms::ChatPlatform;
use crate::types::{CommandError, CommandFlow, Invocation};

pub mod commands;
pub mod info;
pub mod messages;
pub mod moderation;
pub mod notifier;
pub mod parsing;
pub mod permissions;
pub mod reconstruct;
pub mod shutdown;

use commands::{Command, CommandSystem};

/// Everything a handler needs for one invocation
pub struct CommandContext<'a> {
    pub platform: &'a dyn ChatPlatform,
    pub invocation: &'a Invocation,
    pub prefix: &'a str,
}

impl CommandContext<'_> {
    /// Post to the originating channel. Returns false (after logging) when delivery fails.
    pub async fn reply(&self, text: &str) -> bool {
        match self.platform.send_message(self.invocation.channel_id, text).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send message to channel {}: {}", self.invocation.channel_id, e);
                false
            }
        }
    }

    pub fn usage(&self, command: Command) -> CommandError {
        CommandError::Usage(command.usage(self.prefix))
    }
}

/// Core bot engine: recognises commands and runs their handlers
pub struct ChatBot {
    command_system: CommandSystem,
    shutdown_users: Vec<u64>,
    started_at: Instant,
}

impl ChatBot {
    pub fn new(config: &BotConfig, started_at: Instant) -> Self {
        Self {
            command_system: CommandSystem::new(config.prefix.clone()),
            shutdown_users: config.shutdown_users.clone(),
            started_at,
        }
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_system.command_prefix
    }

    /// Recognise a prefixed command in an inbound guild message
    #[allow(clippy::too_many_arguments)]
    pub fn parse_invocation(
        &self,
        content: &str,
        author_id: u64,
        author_name: &str,
        author_discriminator: Option<u16>,
        message_id: u64,
        channel_id: u64,
        guild_id: u64,
    ) -> Option<(Command, Invocation)> {
        self.command_system.invocation(
            content,
            author_id,
            author_name,
            author_discriminator,
            message_id,
            channel_id,
            guild_id,
        )
    }

    /// Run one command to completion and report any failure back to the channel
    pub async fn process_invocation(
        &self,
        platform: &dyn ChatPlatform,
        command: Command,
        invocation: Invocation,
    ) -> CommandFlow {
        info!(
            "Executing command '{}' for user '{}' in channel {}",
            invocation.line(),
            invocation.author_tag(),
            invocation.channel_id
        );

        let ctx = CommandContext {
            platform,
            invocation: &invocation,
            prefix: self.command_prefix(),
        };

        let result = match command {
            Command::Nick => moderation::rename(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Kick => moderation::kick(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Ban => moderation::ban(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Purge => messages::purge(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Copy => messages::transfer(&ctx, messages::TransferMode::Copy)
                .await
                .map(|()| CommandFlow::Continue),
            Command::Move => messages::transfer(&ctx, messages::TransferMode::Move)
                .await
                .map(|()| CommandFlow::Continue),
            Command::Profile => info::profile(&ctx).await.map(|()| CommandFlow::Continue),
            Command::About => info::about(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Uptime => info::uptime(&ctx, self.started_at)
                .await
                .map(|()| CommandFlow::Continue),
            Command::Invite => info::invite(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Help => info::help(&ctx).await.map(|()| CommandFlow::Continue),
            Command::Shutdown => shutdown::shutdown(&ctx, &self.shutdown_users).await,
        };

        match result {
            Ok(flow) => flow,
            Err(e) => {
                Self::report_failure(&ctx, command, &e).await;
                CommandFlow::Continue
            }
        }
    }

    async fn report_failure(ctx: &CommandContext<'_>, command: Command, err: &CommandError) {
        match err {
            CommandError::Usage(_) => {
                info!("Rejected malformed invocation: {}", ctx.invocation.line());
            }
            CommandError::PermissionDenied(_) => {
                warn!(
                    "User '{}' attempted to use {} without proper permissions",
                    ctx.invocation.author_tag(),
                    command.name()
                );
            }
            CommandError::Remote { reply, detail } => {
                error!("{} failed ({}): {}", command.name(), reply, detail);
            }
        }
        ctx.reply(&err.reply()).await;
    }
}

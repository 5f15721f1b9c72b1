use log::{debug, info};

use crate::types::Invocation;

/// Every command the bot answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Nick,
    Kick,
    Ban,
    Purge,
    Copy,
    Move,
    Profile,
    About,
    Uptime,
    Invite,
    Shutdown,
    Help,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::Nick,
        Command::Kick,
        Command::Ban,
        Command::Purge,
        Command::Copy,
        Command::Move,
        Command::Profile,
        Command::About,
        Command::Uptime,
        Command::Invite,
        Command::Shutdown,
        Command::Help,
    ];

    /// Trigger word typed after the prefix
    pub fn name(self) -> &'static str {
        match self {
            Command::Nick => "nick",
            Command::Kick => "kick",
            Command::Ban => "ban",
            Command::Purge => "purge",
            Command::Copy => "cp",
            Command::Move => "mv",
            Command::Profile => "profile",
            Command::About => "about",
            Command::Uptime => "uptime",
            Command::Invite => "invite",
            Command::Shutdown => "shutdown",
            Command::Help => "help",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Expected token shape after the command name
    fn arguments(self) -> &'static str {
        match self {
            Command::Nick => " @<user> <new name>",
            Command::Kick | Command::Ban => " @<user> (reason: optional)",
            Command::Purge => " <number>",
            Command::Copy | Command::Move => " <number <= 100> <#channel>",
            Command::Profile | Command::About => " @user",
            Command::Uptime | Command::Invite | Command::Shutdown | Command::Help => "",
        }
    }

    /// Fixed usage line shown for malformed invocations
    pub fn usage(self, prefix: &str) -> String {
        format!("Usage: `{}{}{}`", prefix, self.name(), self.arguments())
    }
}

/// Recognises prefixed command lines
pub struct CommandSystem {
    pub command_prefix: String,
}

impl CommandSystem {
    pub fn new(prefix: impl Into<String>) -> Self {
        let command_prefix = prefix.into();
        info!("Command prefix set to: {}", command_prefix);
        Self { command_prefix }
    }

    /// Split a raw message into a known command and its tokens
    pub fn parse(&self, content: &str) -> Option<(Command, Vec<String>)> {
        let content_without_prefix = content.strip_prefix(self.command_prefix.as_str())?;
        let tokens: Vec<String> = content_without_prefix
            .split_whitespace()
            .map(String::from)
            .collect();

        let first = tokens.first()?;
        match Command::from_name(first) {
            Some(command) => Some((command, tokens)),
            None => {
                debug!("Unknown command: {}", first);
                None
            }
        }
    }

    /// Build the invocation context for an inbound guild message
    #[allow(clippy::too_many_arguments)]
    pub fn invocation(
        &self,
        content: &str,
        author_id: u64,
        author_name: &str,
        author_discriminator: Option<u16>,
        message_id: u64,
        channel_id: u64,
        guild_id: u64,
    ) -> Option<(Command, Invocation)> {
        let (command, tokens) = self.parse(content)?;
        Some((
            command,
            Invocation {
                author_id,
                author_name: author_name.to_string(),
                author_discriminator,
                message_id,
                channel_id,
                guild_id,
                tokens,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_round_trips_by_name() {
        for command in Command::ALL {
            assert_eq!(Command::from_name(command.name()), Some(command));
        }
        assert_eq!(Command::from_name("NICK"), Some(Command::Nick));
        assert_eq!(Command::from_name("frobnicate"), None);
    }

    #[test]
    fn test_usage_lines() {
        assert_eq!(Command::Nick.usage("~"), "Usage: `~nick @<user> <new name>`");
        assert_eq!(Command::Kick.usage("~"), "Usage: `~kick @<user> (reason: optional)`");
        assert_eq!(Command::Move.usage("!"), "Usage: `!mv <number <= 100> <#channel>`");
        assert_eq!(Command::About.usage("~"), "Usage: `~about @user`");
    }

    #[test]
    fn test_parse_requires_prefix_and_known_command() {
        let system = CommandSystem::new("~");

        let (command, tokens) = system.parse("~kick <@123>   being rude").unwrap();
        assert_eq!(command, Command::Kick);
        assert_eq!(tokens, vec!["kick", "<@123>", "being", "rude"]);

        assert!(system.parse("kick <@123>").is_none());
        assert!(system.parse("~").is_none());
        assert!(system.parse("~   ").is_none());
        assert!(system.parse("~dance").is_none());
    }

    #[test]
    fn test_multi_character_prefix() {
        let system = CommandSystem::new("mod!");
        let (command, _) = system.parse("mod!uptime").unwrap();
        assert_eq!(command, Command::Uptime);
        assert!(system.parse("~uptime").is_none());
    }
}

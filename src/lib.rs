//! # modbot
//!
//! A Discord moderation bot driven by prefixed text commands.
//!
//! ## Features
//!
//! - **Moderation**: rename, kick and ban members, with DM notices to the target
//! - **Channel housekeeping**: purge recent messages, copy or move them to another channel
//! - **Member info**: profile pictures, join dates, nicknames and roles
//! - **Operations**: uptime, channel invites and a guarded remote shutdown
//!
//! Every command checks the caller's channel permissions before touching the server.
//! All state lives on Discord; the bot keeps nothing between commands.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modbot::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let started_at = tokio::time::Instant::now();
//!     let config = BotConfig::from_env().await?;
//!     let bot = Arc::new(ChatBot::new(&config, started_at));
//!
//!     modbot::platforms::discord::run(&config.token, bot).await
//! }
//! ```

pub mod bot;
pub mod config;
pub mod platforms;
pub mod types;

// Re-export commonly used items
pub mod prelude {
    pub use crate::bot::commands::Command;
    pub use crate::bot::{ChatBot, CommandContext};
    pub use crate::config::BotConfig;
    pub use crate::platforms::{discord::DiscordPlatform, ChatPlatform};
    pub use crate::types::{
        CommandError, CommandFlow, Invocation, MessageSummary, Permissions, RemoteMessage,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

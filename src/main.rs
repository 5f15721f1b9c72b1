use anyhow::Result;
use log::{error, info};
use std::sync::Arc;
use tokio::signal;
use tokio::time::Instant;

use modbot::platforms::discord;
use modbot::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let started_at = Instant::now();

    // Load environment variables and initialize logging
    dotenv::dotenv().ok();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting modbot v{}", modbot::VERSION);

    let config = match BotConfig::from_env().await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    let bot = Arc::new(ChatBot::new(&config, started_at));
    info!("Listening for commands with prefix '{}'", bot.command_prefix());

    tokio::select! {
        result = discord::run(&config.token, Arc::clone(&bot)) => {
            if let Err(e) = &result {
                error!("Bot stopped with error: {:#}", e);
            }
            result
        }
        signal_result = signal::ctrl_c() => {
            match signal_result {
                Ok(()) => info!("Received Ctrl+C signal, shutting down..."),
                Err(e) => error!("Failed to listen for Ctrl+C signal: {}", e),
            }
            Ok(())
        }
    }
}

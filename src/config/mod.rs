// src/config/mod.rs - Bot configuration: YAML file plus environment overrides

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tokio::fs;

pub const DEFAULT_CONFIG_PATH: &str = "config/bot.yaml";
pub const DEFAULT_PREFIX: &str = "~";

/// Runtime settings. The token only ever comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    #[serde(skip)]
    pub token: String,
    pub prefix: String,
    /// Users allowed to run the shutdown command
    pub shutdown_users: Vec<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            shutdown_users: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid bot configuration")
    }

    /// Read the YAML file at `path`, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)?;
        debug!("Loaded bot configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `DISCORD_TOKEN`, `MODBOT_PREFIX` and `MODBOT_SHUTDOWN_USERS`
    /// from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            self.token = token.trim().to_string();
        }
        if let Some(prefix) = lookup("MODBOT_PREFIX") {
            self.prefix = prefix;
        }
        if let Some(users) = lookup("MODBOT_SHUTDOWN_USERS") {
            self.shutdown_users = parse_user_list(&users)?;
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(anyhow::anyhow!("DISCORD_TOKEN is not set"));
        }
        if self.prefix.is_empty() || self.prefix.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!(
                "Command prefix must be non-empty and contain no whitespace, got {:?}",
                self.prefix
            ));
        }
        if self.shutdown_users.is_empty() {
            warn!("No shutdown users configured; ~shutdown will be refused for everyone");
        }
        Ok(())
    }

    /// Load from `MODBOT_CONFIG` (or the default path), apply the environment and validate
    pub async fn from_env() -> Result<Self> {
        let path = env::var("MODBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path).await?;
        config.apply_env()?;
        config.validate()?;

        info!(
            "Configuration ready: prefix '{}', {} shutdown user(s)",
            config.prefix,
            config.shutdown_users.len()
        );
        Ok(config)
    }
}

/// Comma-separated user ids; blank entries are skipped
pub fn parse_user_list(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("Invalid user id in MODBOT_SHUTDOWN_USERS: {:?}", s))
        })
        .collect()
}

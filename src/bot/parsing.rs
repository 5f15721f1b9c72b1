// src/bot/parsing.rs - Argument validators for the command line tokens

use regex::Regex;
use std::sync::OnceLock;

/// A user referenced through a mention token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReference {
    pub user_id: u64,
    /// The mention exactly as typed, echoed back in confirmations
    pub mention: String,
}

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^<@!?[0-9]+>$").expect("mention pattern is valid"))
}

/// Parse `<@123>` or `<@!123>` into a target; anything else is rejected
pub fn parse_mention(token: &str) -> Option<TargetReference> {
    if !mention_pattern().is_match(token) {
        return None;
    }

    let digits = token
        .trim_start_matches("<@")
        .trim_start_matches('!')
        .trim_end_matches('>');

    // Grammar-valid ids that overflow a snowflake, or are zero, are still unusable
    let user_id = digits.parse::<u64>().ok().filter(|id| *id != 0)?;
    Some(TargetReference {
        user_id,
        mention: token.to_string(),
    })
}

/// Parse `<#123>` into a channel id
pub fn parse_channel(token: &str) -> Option<u64> {
    let inner = token.strip_prefix("<#")?.strip_suffix('>')?;
    inner.parse::<u64>().ok().filter(|id| *id != 0)
}

/// Signed message count; range checks belong to each command
pub fn parse_count(token: &str) -> Option<i64> {
    token.parse::<i64>().ok()
}

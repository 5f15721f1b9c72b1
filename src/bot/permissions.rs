use log::{debug, error};

use super::CommandContext;
use crate::types::{CommandError, Permissions};

pub const PERMISSION_CHECK_FAILED: &str = "Error occurred while validating your permissions.";

/// Decide whether the invoking user holds `required` in the origin channel.
///
/// Permissions are fetched fresh on every call. A failed fetch is reported to
/// the channel and treated as a denial.
pub async fn authorize(ctx: &CommandContext<'_>, required: Permissions) -> bool {
    let inv = ctx.invocation;
    match ctx
        .platform
        .channel_permissions(inv.guild_id, inv.channel_id, inv.author_id)
        .await
    {
        Ok(granted) => {
            let allowed = granted.allows(required);
            debug!(
                "Permission check for {}: granted={:#x} required={:#x} -> {}",
                inv.author_id,
                granted.bits(),
                required.bits(),
                allowed
            );
            allowed
        }
        Err(e) => {
            error!("Failed to acquire user permissions! {}", e);
            ctx.reply(PERMISSION_CHECK_FAILED).await;
            false
        }
    }
}

/// `authorize`, turning a denial into `PermissionDenied` with the given reply
pub async fn require(
    ctx: &CommandContext<'_>,
    required: Permissions,
    denied: &str,
) -> Result<(), CommandError> {
    if authorize(ctx, required).await {
        Ok(())
    } else {
        Err(CommandError::PermissionDenied(denied.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::{fixtures, MockPlatform};

    #[tokio::test]
    async fn test_authorize_uses_fetched_bitmask() {
        let inv = fixtures::invocation(7, &["kick", "<@5>"]);
        let platform = MockPlatform::new().with_permissions(7, Permissions::KICK_MEMBERS);
        let ctx = fixtures::context(&platform, &inv);

        assert!(authorize(&ctx, Permissions::KICK_MEMBERS).await);
        assert!(!authorize(&ctx, Permissions::BAN_MEMBERS).await);
    }

    #[tokio::test]
    async fn test_administrator_override() {
        let inv = fixtures::invocation(7, &["ban", "<@5>"]);
        let platform = MockPlatform::new().with_permissions(7, Permissions::ADMINISTRATOR);
        let ctx = fixtures::context(&platform, &inv);

        assert!(authorize(&ctx, Permissions::BAN_MEMBERS).await);
        assert!(authorize(&ctx, Permissions::MANAGE_MESSAGES).await);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fail_closed_and_reported() {
        let inv = fixtures::invocation(7, &["kick", "<@5>"]);
        let platform = MockPlatform::new()
            .with_permissions(7, Permissions::ADMINISTRATOR)
            .failing("channel_permissions");
        let ctx = fixtures::context(&platform, &inv);

        assert!(!authorize(&ctx, Permissions::KICK_MEMBERS).await);
        assert_eq!(platform.sent_texts(inv.channel_id), vec![PERMISSION_CHECK_FAILED]);
    }

    #[tokio::test]
    async fn test_require_maps_denial() {
        let inv = fixtures::invocation(7, &["purge", "3"]);
        let platform = MockPlatform::new();
        let ctx = fixtures::context(&platform, &inv);

        let err = require(&ctx, Permissions::MANAGE_MESSAGES, "nope").await.unwrap_err();
        assert_eq!(err, CommandError::PermissionDenied("nope".to_string()));
    }
}

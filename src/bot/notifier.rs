use log::{error, info};

use crate::platforms::ChatPlatform;

/// Best-effort direct message. Failures are logged and never reach the caller;
/// the return value only says whether delivery succeeded.
pub async fn notify(platform: &dyn ChatPlatform, user_id: u64, text: &str) -> bool {
    let dm_channel = match platform.open_dm(user_id).await {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to create DM with user {}: {}", user_id, e);
            return false;
        }
    };

    match platform.send_message(dm_channel, text).await {
        Ok(()) => {
            info!("Sent DM to user {}", user_id);
            true
        }
        Err(e) => {
            error!("Failed to send DM to user {}: {}", user_id, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::{Call, MockPlatform};

    #[tokio::test]
    async fn test_notify_opens_dm_and_sends() {
        let platform = MockPlatform::new();

        assert!(notify(&platform, 5, "hello").await);

        let dm = MockPlatform::dm_channel_for(5);
        assert_eq!(platform.sent_texts(dm), vec!["hello"]);
        assert_eq!(platform.calls()[0], Call::OpenDm { user_id: 5 });
    }

    #[tokio::test]
    async fn test_notify_absorbs_failures() {
        let platform = MockPlatform::new().failing("open_dm");
        assert!(!notify(&platform, 5, "hello").await);
        assert!(platform.sent_texts(MockPlatform::dm_channel_for(5)).is_empty());
    }
}

//! Log notification sender
//!
//! Development sender that writes the code to the log instead of
//! delivering it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use bk_core::{DeliveryError, NotificationSender};
use bk_shared::utils::{is_valid_email, is_valid_phone, mask_recipient};

/// Notification sender for development and testing
///
/// This implementation:
/// - Accepts email addresses and E.164 phone numbers
/// - Logs the code with the recipient masked, or only a placeholder
///   when redacted
/// - Generates message IDs
/// - Tracks message count
#[derive(Clone, Default)]
pub struct LogNotificationSender {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Keep the code itself out of the log
    redact_codes: bool,
}

impl LogNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that fails every delivery
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Create a sender that never writes the code to the log
    pub fn redacted() -> Self {
        Self {
            redact_codes: true,
            ..Self::default()
        }
    }

    /// Whether codes are kept out of the log
    pub fn redacts_codes(&self) -> bool {
        self.redact_codes
    }

    /// Get the total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn deliver_code(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, DeliveryError> {
        let masked = mask_recipient(recipient);

        if !is_valid_email(recipient) && !is_valid_phone(recipient) {
            return Err(DeliveryError::Unreachable {
                reason: format!("{} is neither an email address nor a phone number", masked),
            });
        }

        if self.simulate_failure {
            warn!(recipient = %masked, "Log sender simulating delivery failure");
            return Err(DeliveryError::Provider {
                message: "Simulated delivery failure".to_string(),
            });
        }

        let message_id = format!("log_{}", Uuid::new_v4());
        let logged_code = if self.redact_codes { "[redacted]" } else { code };
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            target: "notification",
            provider = "log",
            recipient = %masked,
            message_id = %message_id,
            code = %logged_code,
            expires_at = %expires_at,
            count,
            "Verification code (not delivered, log provider)"
        );

        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_deliver_counts_messages() {
        let sender = LogNotificationSender::new();
        let expires_at = Utc::now() + Duration::minutes(10);

        let id = sender.deliver_code("a@x.com", "483920", expires_at).await.unwrap();
        assert!(id.starts_with("log_"));
        sender
            .deliver_code("+61412345678", "483920", expires_at)
            .await
            .unwrap();

        assert_eq!(sender.message_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_recipient() {
        let sender = LogNotificationSender::new();
        let result = sender
            .deliver_code("not-an-address", "483920", Utc::now())
            .await;
        assert!(matches!(result, Err(DeliveryError::Unreachable { .. })));
        assert_eq!(sender.message_count(), 0);
    }

    #[tokio::test]
    async fn test_redacted_sender_still_counts() {
        let sender = LogNotificationSender::redacted();
        assert!(sender.redacts_codes());
        assert!(!LogNotificationSender::new().redacts_codes());

        sender.deliver_code("a@x.com", "483920", Utc::now()).await.unwrap();
        assert_eq!(sender.message_count(), 1);
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let sender = LogNotificationSender::failing();
        let result = sender.deliver_code("a@x.com", "483920", Utc::now()).await;
        assert!(matches!(result, Err(DeliveryError::Provider { .. })));
    }
}

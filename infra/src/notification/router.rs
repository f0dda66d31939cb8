//! Channel routing by recipient kind

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use bk_core::{DeliveryError, NotificationSender};
use bk_shared::utils::{is_valid_email, is_valid_phone, mask_recipient};

/// Sends email recipients through the email channel and E.164 phone
/// numbers through the SMS channel
pub struct RoutingNotificationSender {
    email: Option<Arc<dyn NotificationSender>>,
    sms: Option<Arc<dyn NotificationSender>>,
}

impl RoutingNotificationSender {
    pub fn new(
        email: Option<Arc<dyn NotificationSender>>,
        sms: Option<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self { email, sms }
    }

    fn channel_for(&self, recipient: &str) -> Result<&Arc<dyn NotificationSender>, DeliveryError> {
        let (channel, kind) = if is_valid_email(recipient) {
            (self.email.as_ref(), "email")
        } else if is_valid_phone(recipient) {
            (self.sms.as_ref(), "SMS")
        } else {
            return Err(DeliveryError::Unreachable {
                reason: format!(
                    "{} is neither an email address nor a phone number",
                    mask_recipient(recipient)
                ),
            });
        };

        channel.ok_or_else(|| DeliveryError::Unreachable {
            reason: format!("{} delivery is not configured", kind),
        })
    }
}

#[async_trait]
impl NotificationSender for RoutingNotificationSender {
    async fn deliver_code(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, DeliveryError> {
        self.channel_for(recipient)?
            .deliver_code(recipient, code, expires_at)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::LogNotificationSender;

    #[tokio::test]
    async fn test_routes_by_recipient_kind() {
        let email = LogNotificationSender::new();
        let sms = LogNotificationSender::new();
        let router = RoutingNotificationSender::new(
            Some(Arc::new(email.clone())),
            Some(Arc::new(sms.clone())),
        );

        router.deliver_code("a@x.com", "483920", Utc::now()).await.unwrap();
        router
            .deliver_code("+61412345678", "483920", Utc::now())
            .await
            .unwrap();
        router
            .deliver_code("b@x.com", "483920", Utc::now())
            .await
            .unwrap();

        assert_eq!(email.message_count(), 2);
        assert_eq!(sms.message_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_channel_is_unreachable() {
        let email = LogNotificationSender::new();
        let router = RoutingNotificationSender::new(Some(Arc::new(email.clone())), None);

        let result = router
            .deliver_code("+61412345678", "483920", Utc::now())
            .await;
        assert!(matches!(result, Err(DeliveryError::Unreachable { .. })));

        let result = router.deliver_code("not-an-address", "483920", Utc::now()).await;
        assert!(matches!(result, Err(DeliveryError::Unreachable { .. })));
        assert_eq!(email.message_count(), 0);
    }
}

//! Twilio SMS notification sender
//!
//! Delivers verification codes by SMS through the Twilio API.
//!
//! ## Features
//!
//! - E.164 validation with the `phonenumber` crate
//! - Bounded retries with exponential backoff
//! - Phone number masking in logs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phonenumber::{Mode, PhoneNumber};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use bk_core::{DeliveryError, NotificationSender};
use bk_shared::config::TwilioSettings;
use bk_shared::utils::mask_recipient;

use super::code_message;
use crate::InfraError;

/// Twilio limit for a single message body
const MAX_MESSAGE_LENGTH: usize = 1600;

/// Twilio SMS sender
pub struct TwilioNotificationSender {
    client: Client,
    settings: TwilioSettings,
}

impl TwilioNotificationSender {
    /// Create a new Twilio sender
    ///
    /// The sending number must be in E.164 format.
    pub fn new(settings: TwilioSettings) -> Result<Self, InfraError> {
        if !settings.from_number.starts_with('+') {
            return Err(InfraError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }
        if settings.account_sid.is_empty() || settings.auth_token.is_empty() {
            return Err(InfraError::Config(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must be set".to_string(),
            ));
        }

        let client = Client::new(&settings.account_sid, &settings.auth_token);

        info!(
            from = %mask_recipient(&settings.from_number),
            "Twilio notification sender initialized"
        );

        Ok(Self { client, settings })
    }

    /// Send SMS with retry logic
    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let max_attempts = self.settings.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.settings.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                attempt = attempts,
                max_attempts,
                recipient = %mask_recipient(to),
                "Sending verification SMS"
            );

            let message = OutboundMessage::new(&self.settings.from_number, to, body);

            match self.client.send_message(message).await {
                Ok(response) => {
                    info!(
                        recipient = %mask_recipient(to),
                        message_id = %response.sid,
                        event = "verification_sms_sent",
                        "Verification SMS sent"
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(
                        attempt = attempts,
                        max_attempts,
                        error = %error_msg,
                        "Failed to send verification SMS"
                    );

                    if attempts >= max_attempts {
                        return Err(DeliveryError::Provider {
                            message: format!(
                                "failed to send SMS after {} attempts: {}",
                                attempts, error_msg
                            ),
                        });
                    }

                    if !is_retryable(&error_msg) {
                        return Err(DeliveryError::Provider {
                            message: format!("invalid request: {}", error_msg),
                        });
                    }

                    warn!(delay_ms = delay.as_millis() as u64, "Retrying verification SMS");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

/// Validate and normalize a phone number to E.164
fn normalize_phone_number(phone: &str) -> Result<String, DeliveryError> {
    if !phone.starts_with('+') {
        return Err(DeliveryError::Unreachable {
            reason: "SMS recipients must be in E.164 format (e.g. +14155552671)".to_string(),
        });
    }

    let parsed = phone
        .parse::<PhoneNumber>()
        .map_err(|e| DeliveryError::Unreachable {
            reason: format!("invalid phone number: {}", e),
        })?;

    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Rate limits and server errors are worth retrying, client errors are not
fn is_retryable(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    if lower.contains("400") || lower.contains("invalid") {
        return false;
    }
    true
}

#[async_trait]
impl NotificationSender for TwilioNotificationSender {
    async fn deliver_code(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, DeliveryError> {
        let phone = normalize_phone_number(recipient)?;
        let body = code_message(code, expires_at, Utc::now());

        if body.len() > MAX_MESSAGE_LENGTH {
            return Err(DeliveryError::Provider {
                message: format!("message exceeds {} characters", MAX_MESSAGE_LENGTH),
            });
        }

        self.send_with_retry(&phone, &body).await
    }
}

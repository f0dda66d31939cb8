//! Notification Module
//!
//! Senders that deliver verification codes to recipients.
//!
//! ## Features
//!
//! - **Log sender**: writes codes to the log for development
//! - **Email**: delivery through a transactional mail API with retries
//! - **Twilio**: SMS delivery with retries (feature `twilio-sms`)
//! - **Routing**: picks the channel from the recipient kind

use chrono::{DateTime, Utc};
use std::sync::Arc;

use bk_core::NotificationSender;
use bk_shared::config::{Environment, NotificationConfig, NotificationProvider};

use crate::InfraError;

pub mod email;
pub mod log_sender;
pub mod router;

// Twilio SMS sender (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use email::EmailNotificationSender;
pub use log_sender::LogNotificationSender;
pub use router::RoutingNotificationSender;

#[cfg(feature = "twilio-sms")]
pub use twilio::TwilioNotificationSender;

/// Create a notification sender based on configuration
///
/// The log sender is refused in production and redacts codes outside
/// development. A live provider needs at least one channel that builds;
/// misconfiguration is an error, never a silent downgrade to logging.
pub fn create_notification_sender(
    config: &NotificationConfig,
    environment: Environment,
) -> Result<Arc<dyn NotificationSender>, InfraError> {
    match config.provider {
        NotificationProvider::Log => {
            if environment.is_production() {
                return Err(InfraError::Config(
                    "the log notification provider cannot be used in production".to_string(),
                ));
            }
            tracing::info!(%environment, "Using log notification sender");
            if environment.is_development() {
                Ok(Arc::new(LogNotificationSender::new()))
            } else {
                Ok(Arc::new(LogNotificationSender::redacted()))
            }
        }
        NotificationProvider::Live => create_live_sender(config),
    }
}

fn create_live_sender(config: &NotificationConfig) -> Result<Arc<dyn NotificationSender>, InfraError> {
    let email = match config.email.clone() {
        Some(settings) => {
            let sender: Arc<dyn NotificationSender> = Arc::new(EmailNotificationSender::new(settings)?);
            Some(sender)
        }
        None => None,
    };
    let sms = create_sms_sender(config)?;

    if email.is_none() && sms.is_none() {
        return Err(InfraError::Config(
            "NOTIFICATION_PROVIDER=live needs EMAIL_* or TWILIO_* settings".to_string(),
        ));
    }

    tracing::info!(
        email = email.is_some(),
        sms = sms.is_some(),
        "Using live notification senders"
    );
    Ok(Arc::new(RoutingNotificationSender::new(email, sms)))
}

#[cfg(feature = "twilio-sms")]
fn create_sms_sender(
    config: &NotificationConfig,
) -> Result<Option<Arc<dyn NotificationSender>>, InfraError> {
    match config.twilio.clone() {
        Some(settings) => {
            let sender: Arc<dyn NotificationSender> = Arc::new(TwilioNotificationSender::new(settings)?);
            Ok(Some(sender))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "twilio-sms"))]
fn create_sms_sender(
    config: &NotificationConfig,
) -> Result<Option<Arc<dyn NotificationSender>>, InfraError> {
    if config.twilio.is_some() {
        return Err(InfraError::Config(
            "TWILIO_* settings given but Twilio support is not compiled in".to_string(),
        ));
    }
    Ok(None)
}

/// Text of the code message, with the remaining lifetime rounded up to
/// whole minutes
pub(crate) fn code_message(code: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (expires_at - now).num_seconds().max(0);
    let minutes = (seconds + 59) / 60;
    format!(
        "Your Bookly password reset code is {}. It expires in {} minutes.",
        code, minutes
    )
}

//! Notification delivery configuration module

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// Outbound delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProvider {
    /// Log the code instead of sending it (development)
    #[default]
    Log,
    /// Deliver through the configured channels: email over the mail API,
    /// SMS through Twilio
    Live,
}

impl std::str::FromStr for NotificationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" | "mock" | "console" => Ok(NotificationProvider::Log),
            "live" | "email" | "twilio" => Ok(NotificationProvider::Live),
            _ => Err(format!("Invalid notification provider: {}", s)),
        }
    }
}

/// Twilio credentials and retry behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwilioSettings {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Sending phone number (E.164)
    pub from_number: String,
    /// Maximum send attempts per message
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial retry delay in milliseconds, doubled per attempt
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Transactional mail API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailSettings {
    /// Send endpoint of the mail API
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    /// Bearer key for the mail API
    pub api_key: String,
    /// Sender address
    pub from_address: String,
    /// Sender display name
    #[serde(default)]
    pub from_name: Option<String>,
    /// Subject line of the code email
    #[serde(default = "default_email_subject")]
    pub subject: String,
    /// Maximum send attempts per message
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial retry delay in milliseconds, doubled per attempt
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Notification delivery configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: NotificationProvider,

    /// Twilio settings, enables SMS delivery when `provider` is `live`
    #[serde(default)]
    pub twilio: Option<TwilioSettings>,

    /// Mail API settings, enables email delivery when `provider` is `live`
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

impl NotificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let provider = env_opt("NOTIFICATION_PROVIDER")
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();

        let twilio = match (
            env_opt("TWILIO_ACCOUNT_SID"),
            env_opt("TWILIO_AUTH_TOKEN"),
            env_opt("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioSettings {
                account_sid,
                auth_token,
                from_number,
                max_retries: env_or("TWILIO_MAX_RETRIES", default_max_retries()),
                retry_delay_ms: env_or("TWILIO_RETRY_DELAY_MS", default_retry_delay_ms()),
            }),
            _ => None,
        };

        let email = match (env_opt("EMAIL_API_KEY"), env_opt("EMAIL_FROM_ADDRESS")) {
            (Some(api_key), Some(from_address)) => Some(EmailSettings {
                api_url: env_opt("EMAIL_API_URL").unwrap_or_else(default_email_api_url),
                api_key,
                from_address,
                from_name: env_opt("EMAIL_FROM_NAME"),
                subject: env_opt("EMAIL_SUBJECT").unwrap_or_else(default_email_subject),
                max_retries: env_or("EMAIL_MAX_RETRIES", default_max_retries()),
                retry_delay_ms: env_or("EMAIL_RETRY_DELAY_MS", default_retry_delay_ms()),
                request_timeout_secs: env_or(
                    "EMAIL_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs(),
                ),
            }),
            _ => None,
        };

        Self {
            provider,
            twilio,
            email,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_email_api_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_email_subject() -> String {
    "Your Bookly password reset code".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

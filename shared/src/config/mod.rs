//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `environment` - Environment detection and logging configuration
//! - `identity` - Identity provider selection and credentials
//! - `notification` - Outbound code delivery provider
//! - `server` - HTTP server binding
//! - `verification` - Verification code lifetime, store bounds and sweeping

pub mod environment;
pub mod identity;
pub mod notification;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use identity::{IdentityConfig, IdentityProvider};
pub use notification::{EmailSettings, NotificationConfig, NotificationProvider, TwilioSettings};
pub use server::ServerConfig;
pub use verification::VerificationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Verification code configuration
    pub verification: VerificationConfig,

    /// Notification delivery configuration
    pub notification: NotificationConfig,

    /// Identity provider configuration
    pub identity: IdentityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            verification: VerificationConfig::default(),
            notification: NotificationConfig::default(),
            identity: IdentityConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// Every section falls back to its default when a variable is missing
    /// or cannot be parsed.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            verification: VerificationConfig::from_env(),
            notification: NotificationConfig::from_env(),
            identity: IdentityConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

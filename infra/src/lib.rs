//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Bookly backend.
//! It provides the concrete collaborators driven by the verification code
//! manager in `bk_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Identity**: account directories that own credentials (in-memory,
//!   managed identity toolkit over REST)
//! - **Notification**: code delivery (log sender, mail API email, Twilio
//!   SMS) routed by recipient kind
//!
//! ## Features
//!
//! - `twilio-sms`: Enable Twilio SMS delivery (default)

// Re-export core types for convenience
pub use bk_core::errors::*;

/// Identity module - account lookup and credential updates
pub mod identity;

/// Notification module - verification code delivery
pub mod notification;

pub use identity::{create_identity_delegate, IdentityToolkitDelegate, InMemoryIdentityDirectory};
pub use notification::{
    create_notification_sender, EmailNotificationSender, LogNotificationSender,
    RoutingNotificationSender,
};

#[cfg(feature = "twilio-sms")]
pub use notification::TwilioNotificationSender;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Identity provider rejected an operation
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

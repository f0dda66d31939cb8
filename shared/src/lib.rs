//! Shared utilities and common types for the Bookly server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures
//! - Recipient validation and masking helpers

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, IdentityConfig, LoggingConfig, NotificationConfig, ServerConfig,
    VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::recipient;

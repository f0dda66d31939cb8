//! Verification code module for the password reset workflow
//!
//! This module provides:
//! - Issuing time-boxed, single-use codes and handing them to a sender
//! - Non-consuming validation of supplied codes
//! - Credential reset through an identity delegate, consuming the code
//! - A background sweeper for expired codes

mod config;
mod service;
mod store;
mod sweeper;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationCodeManager;
pub use store::{InsertOutcome, Lookup, VerificationStore};
pub use sweeper::{SweepConfig, SweeperHandle, VerificationSweeper};
pub use traits::{Clock, IdentityDelegate, NotificationSender, SystemClock};
pub use types::{IssuedCode, SweepResult};

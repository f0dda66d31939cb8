//! Password reset route handlers
//!
//! This module contains the password reset endpoints:
//! - Requesting a verification code
//! - Checking a code without consuming it
//! - Confirming the reset with a new password

pub mod confirm;
pub mod request_code;
pub mod verify_code;

pub use confirm::confirm;
pub use request_code::request_code;
pub use verify_code::verify_code;

//! Types for verification code manager results

use chrono::{DateTime, Utc};

/// Result of issuing a verification code
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// Normalized recipient the code was issued for
    pub recipient: String,
    /// The generated code
    pub code: String,
    /// When the code was issued
    pub issued_at: DateTime<Utc>,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Message id returned by the notification sender
    pub message_id: String,
}

/// Result of a sweep cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Number of expired entries removed
    pub expired_removed: usize,
    /// Number of entries left in the store
    pub remaining: usize,
}

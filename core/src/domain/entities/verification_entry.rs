//! Verification entry entity for the password reset workflow.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Smallest code that can be issued
pub const CODE_MIN: u32 = 100_000;

/// Largest code that can be issued
pub const CODE_MAX: u32 = 999_999;

/// Default lifetime of an issued code (10 minutes)
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// A live verification code issued for one recipient
///
/// At most one entry exists per recipient; issuing again replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEntry {
    /// Identifier the code was issued for (email address or phone number)
    pub recipient: String,

    /// The 6-digit verification code
    pub code: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp from which the code is no longer accepted
    pub expires_at: DateTime<Utc>,

    /// Issuance number assigned by the store, distinguishes a superseding
    /// issuance from the one it replaced
    #[serde(default)]
    pub issue_seq: u64,
}

impl VerificationEntry {
    /// Creates an entry valid for `ttl` starting at `issued_at`
    pub fn new(
        recipient: impl Into<String>,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            code: code.into(),
            issued_at,
            expires_at: issued_at + ttl,
            issue_seq: 0,
        }
    }

    /// Creates an entry with a freshly generated code
    pub fn issue(recipient: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self::new(recipient, generate_code(), issued_at, ttl)
    }

    /// `true` once `now` has reached `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `true` inside the half-open window `[issued_at, expires_at)`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && !self.is_expired_at(now)
    }

    /// Compares a supplied code against the stored one in constant time
    pub fn matches(&self, supplied: &str) -> bool {
        if supplied.len() != self.code.len() {
            return false;
        }
        constant_time_eq(self.code.as_bytes(), supplied.as_bytes())
    }

    /// Time remaining until expiration, or zero if already expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Generates a 6-digit code drawn uniformly from `CODE_MIN..=CODE_MAX`
///
/// Codes with a leading zero are never produced.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

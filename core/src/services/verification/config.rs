//! Configuration for the verification code manager

use bk_shared::config::VerificationConfig;
use chrono::Duration;

use crate::domain::entities::verification_entry::DEFAULT_TTL_MINUTES;

/// Configuration for the verification code manager
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of minutes before a verification code expires
    pub code_ttl_minutes: i64,
    /// Maximum number of outstanding codes kept in memory
    pub max_entries: usize,
    /// Number of lock stripes used to serialise resets per recipient
    pub lock_stripes: usize,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: DEFAULT_TTL_MINUTES,
            max_entries: 100_000,
            lock_stripes: 64,
        }
    }
}

impl VerificationServiceConfig {
    /// Lifetime of an issued code
    pub fn code_ttl(&self) -> Duration {
        Duration::minutes(self.code_ttl_minutes)
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_ttl_minutes: config.code_ttl_minutes.max(1),
            max_entries: config.max_entries.max(1),
            lock_stripes: config.lock_stripes.max(1),
        }
    }
}

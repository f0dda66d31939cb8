//! Verification code configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Verification code lifetime, store bounds and sweeping
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Minutes an issued code stays valid
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,

    /// Maximum number of outstanding codes held in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Number of lock stripes serialising resets per recipient
    #[serde(default = "default_lock_stripes")]
    pub lock_stripes: usize,

    /// Seconds between background sweeps of expired codes
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Whether the background sweeper runs at all
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
            max_entries: default_max_entries(),
            lock_stripes: default_lock_stripes(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            code_ttl_minutes: env_or("VERIFICATION_CODE_TTL_MINUTES", default_code_ttl_minutes())
                .max(1),
            max_entries: env_or("VERIFICATION_MAX_ENTRIES", default_max_entries()).max(1),
            lock_stripes: env_or("VERIFICATION_LOCK_STRIPES", default_lock_stripes()).max(1),
            sweep_interval_seconds: env_or(
                "VERIFICATION_SWEEP_INTERVAL_SECONDS",
                default_sweep_interval_seconds(),
            )
            .max(1),
            sweep_enabled: env_or("VERIFICATION_SWEEP_ENABLED", default_sweep_enabled()),
        }
    }
}

fn default_code_ttl_minutes() -> i64 {
    10
}

fn default_max_entries() -> usize {
    100_000
}

fn default_lock_stripes() -> usize {
    64
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_sweep_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_config_default() {
        let config = VerificationConfig::default();
        assert_eq!(config.code_ttl_minutes, 10);
        assert_eq!(config.lock_stripes, 64);
        assert_eq!(config.sweep_interval_seconds, 60);
        assert!(config.sweep_enabled);
    }

    #[test]
    fn test_verification_config_deserialize_partial() {
        let config: VerificationConfig =
            serde_json::from_str(r#"{"code_ttl_minutes": 15}"#).unwrap();
        assert_eq!(config.code_ttl_minutes, 15);
        assert_eq!(config.max_entries, 100_000);
    }
}

//! Identity provider configuration module

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// Which identity authority owns account credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityProvider {
    /// Process-local account directory (development and tests)
    #[default]
    InMemory,
    /// Managed identity platform reached over its REST API
    IdentityToolkit,
}

impl std::str::FromStr for IdentityProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in-memory" | "memory" => Ok(IdentityProvider::InMemory),
            "identity-toolkit" | "toolkit" => Ok(IdentityProvider::IdentityToolkit),
            _ => Err(format!("Invalid identity provider: {}", s)),
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: IdentityProvider,

    /// Base URL of the identity toolkit REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Project identifier used in toolkit request paths
    #[serde(default)]
    pub project_id: Option<String>,

    /// OAuth2 bearer token authorising admin calls
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Accounts seeded into the in-memory directory, as `recipient:password` pairs
    #[serde(default)]
    pub seed_accounts: Vec<(String, String)>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProvider::default(),
            base_url: default_base_url(),
            project_id: None,
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            seed_accounts: Vec::new(),
        }
    }
}

impl IdentityConfig {
    /// Create from environment variables
    ///
    /// `IDENTITY_SEED_ACCOUNTS` is a comma separated list of
    /// `recipient:password` pairs; malformed pairs are skipped.
    pub fn from_env() -> Self {
        let provider = env_opt("IDENTITY_PROVIDER")
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();

        let seed_accounts = env_opt("IDENTITY_SEED_ACCOUNTS")
            .map(|raw| parse_seed_accounts(&raw))
            .unwrap_or_default();

        Self {
            provider,
            base_url: env_opt("IDENTITY_TOOLKIT_BASE_URL").unwrap_or_else(default_base_url),
            project_id: env_opt("IDENTITY_TOOLKIT_PROJECT_ID"),
            access_token: env_opt("IDENTITY_TOOLKIT_ACCESS_TOKEN"),
            request_timeout_secs: env_or(
                "IDENTITY_TOOLKIT_TIMEOUT_SECS",
                default_request_timeout_secs(),
            ),
            seed_accounts,
        }
    }
}

fn parse_seed_accounts(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (recipient, password) = pair.trim().split_once(':')?;
            if recipient.is_empty() || password.is_empty() {
                return None;
            }
            Some((recipient.to_string(), password.to_string()))
        })
        .collect()
}

fn default_base_url() -> String {
    String::from("https://identitytoolkit.googleapis.com/v1")
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_accounts() {
        let seeds = parse_seed_accounts("a@x.com:Secret12, bad-pair ,b@y.com:Other345,:nope");
        assert_eq!(
            seeds,
            vec![
                ("a@x.com".to_string(), "Secret12".to_string()),
                ("b@y.com".to_string(), "Other345".to_string()),
            ]
        );
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("memory".parse::<IdentityProvider>().unwrap(), IdentityProvider::InMemory);
        assert_eq!(
            "identity-toolkit".parse::<IdentityProvider>().unwrap(),
            IdentityProvider::IdentityToolkit
        );
    }
}

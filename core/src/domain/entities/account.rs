//! Account handle and credential types exchanged with the identity authority.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an account held by the identity authority
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountHandle {
    /// Provider-side account identifier
    pub account_id: String,

    /// Recipient the account was resolved from
    pub recipient: String,
}

impl AccountHandle {
    pub fn new(account_id: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            recipient: recipient.into(),
        }
    }
}

/// A new secret to install on an account
///
/// The value never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the raw secret for handing to the identity authority
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

//! Traits for the collaborators driven by the verification code manager

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{AccountHandle, Credential};
use crate::errors::{DeliveryError, IdentityError};

/// Trait for the identity authority that owns account credentials
///
/// The authority is the only component allowed to mutate passwords.
#[async_trait]
pub trait IdentityDelegate: Send + Sync {
    /// Look up the account associated with a recipient identifier
    ///
    /// # Returns
    /// * `Ok(Some(AccountHandle))` - Account found
    /// * `Ok(None)` - No account registered for the recipient
    /// * `Err(IdentityError)` - The provider could not answer
    async fn find_account(&self, recipient: &str) -> Result<Option<AccountHandle>, IdentityError>;

    /// Overwrite the credential of an account
    async fn update_credential(
        &self,
        account: &AccountHandle,
        credential: &Credential,
    ) -> Result<(), IdentityError>;
}

/// Trait for outbound delivery of verification codes (email, SMS)
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a code to its recipient, returning the provider message id
    async fn deliver_code(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, DeliveryError>;
}

/// Source of the current time used for issuance and expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

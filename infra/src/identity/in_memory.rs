//! In-memory identity directory
//!
//! Process-local account store used in development and tests. Passwords are
//! kept as bcrypt hashes, never in plain text.

use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use bk_core::{AccountHandle, Credential, IdentityDelegate, IdentityError};
use bk_shared::utils::{mask_recipient, normalize_recipient};

use crate::InfraError;

/// Minimum password length accepted by the directory
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
struct StoredAccount {
    account_id: String,
    password_hash: String,
}

/// Account directory keyed by normalized recipient
pub struct InMemoryIdentityDirectory {
    accounts: RwLock<HashMap<String, StoredAccount>>,
    hash_cost: u32,
}

impl InMemoryIdentityDirectory {
    /// Create an empty directory hashing with the bcrypt default cost
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_COST)
    }

    /// Create an empty directory with an explicit bcrypt cost
    pub fn with_cost(hash_cost: u32) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            hash_cost,
        }
    }

    /// Register an account, replacing any existing account for the recipient
    pub async fn register(
        &self,
        recipient: &str,
        password: &str,
    ) -> Result<AccountHandle, InfraError> {
        check_password_policy(password)?;

        let recipient = normalize_recipient(recipient);
        let stored = StoredAccount {
            account_id: Uuid::new_v4().to_string(),
            password_hash: hash_password(password, self.hash_cost).await?,
        };
        let handle = AccountHandle::new(stored.account_id.clone(), recipient.clone());

        self.accounts.write().await.insert(recipient.clone(), stored);
        info!(
            recipient = %mask_recipient(&recipient),
            account_id = %handle.account_id,
            event = "account_registered",
            "Registered account in identity directory"
        );

        Ok(handle)
    }

    /// Check a password against the stored hash
    pub async fn verify_password(&self, recipient: &str, password: &str) -> bool {
        let recipient = normalize_recipient(recipient);
        let password_hash = match self.accounts.read().await.get(&recipient) {
            Some(account) => account.password_hash.clone(),
            None => return false,
        };

        let password = password.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// Number of registered accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl Default for InMemoryIdentityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// At least `MIN_PASSWORD_LENGTH` characters with a letter and a digit
fn check_password_policy(password: &str) -> Result<(), IdentityError> {
    let reason = if password.chars().count() < MIN_PASSWORD_LENGTH {
        format!("password must be at least {} characters", MIN_PASSWORD_LENGTH)
    } else if !password.chars().any(|c| c.is_alphabetic()) {
        "password must contain a letter".to_string()
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        "password must contain a digit".to_string()
    } else {
        return Ok(());
    };

    Err(IdentityError::WeakCredential { reason })
}

/// Hash on the blocking pool; bcrypt is CPU-bound for the whole cost
async fn hash_password(password: &str, cost: u32) -> Result<String, IdentityError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| IdentityError::Unavailable {
            message: format!("credential hashing task failed: {}", e),
        })?
        .map_err(|e| IdentityError::Unavailable {
            message: format!("failed to hash credential: {}", e),
        })
}

#[async_trait]
impl IdentityDelegate for InMemoryIdentityDirectory {
    async fn find_account(&self, recipient: &str) -> Result<Option<AccountHandle>, IdentityError> {
        let recipient = normalize_recipient(recipient);
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&recipient)
            .map(|account| AccountHandle::new(account.account_id.clone(), recipient.clone())))
    }

    async fn update_credential(
        &self,
        account: &AccountHandle,
        credential: &Credential,
    ) -> Result<(), IdentityError> {
        check_password_policy(credential.expose())?;

        let password_hash = hash_password(credential.expose(), self.hash_cost).await?;

        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(&account.recipient)
            .filter(|stored| stored.account_id == account.account_id)
            .ok_or(IdentityError::NotFound)?;
        stored.password_hash = password_hash;

        debug!(
            account_id = %account.account_id,
            event = "credential_updated",
            "Credential updated in identity directory"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryIdentityDirectory {
        InMemoryIdentityDirectory::with_cost(4)
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("NewPass1!").is_ok());
        assert!(matches!(
            check_password_policy("Sh0rt"),
            Err(IdentityError::WeakCredential { .. })
        ));
        assert!(check_password_policy("12345678").is_err());
        assert!(check_password_policy("abcdefgh").is_err());
    }

    #[tokio::test]
    async fn test_register_and_find() {
        let directory = directory();
        let handle = directory.register(" A@X.com", "Original1").await.unwrap();
        assert_eq!(handle.recipient, "a@x.com");

        let found = directory.find_account("a@x.com").await.unwrap().unwrap();
        assert_eq!(found, handle);
        assert!(directory.find_account("b@x.com").await.unwrap().is_none());
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let directory = directory();
        let result = directory.register("a@x.com", "weak").await;
        assert!(matches!(
            result,
            Err(InfraError::Identity(IdentityError::WeakCredential { .. }))
        ));
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_credential() {
        let directory = directory();
        let handle = directory.register("a@x.com", "Original1").await.unwrap();

        directory
            .update_credential(&handle, &Credential::new("NewPass1!"))
            .await
            .unwrap();

        assert!(directory.verify_password("a@x.com", "NewPass1!").await);
        assert!(!directory.verify_password("a@x.com", "Original1").await);
    }

    #[tokio::test]
    async fn test_update_credential_weak_keeps_old_password() {
        let directory = directory();
        let handle = directory.register("a@x.com", "Original1").await.unwrap();

        let result = directory
            .update_credential(&handle, &Credential::new("short"))
            .await;
        assert!(matches!(result, Err(IdentityError::WeakCredential { .. })));
        assert!(directory.verify_password("a@x.com", "Original1").await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_does_not_stall_the_runtime() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let directory = InMemoryIdentityDirectory::with_cost(8);
        let handle = directory.register("a@x.com", "Original1").await.unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        directory
            .update_credential(&handle, &Credential::new("NewPass1!"))
            .await
            .unwrap();
        let during_update = ticks.load(Ordering::SeqCst);
        ticker.abort();

        assert!(during_update > 0);
        assert!(directory.verify_password("a@x.com", "NewPass1!").await);
    }

    #[tokio::test]
    async fn test_update_credential_unknown_account() {
        let directory = directory();
        let ghost = AccountHandle::new("missing", "ghost@x.com");

        let result = directory
            .update_credential(&ghost, &Credential::new("NewPass1!"))
            .await;
        assert_eq!(result, Err(IdentityError::NotFound));
    }
}

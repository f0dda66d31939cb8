//! Verification code manager implementation

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bk_shared::utils::{is_well_formed_recipient, mask_recipient, normalize_recipient};
use tokio::sync::Mutex;

use crate::domain::entities::{AccountHandle, Credential, VerificationEntry};
use crate::errors::{IdentityError, VerificationError, VerificationResult};

use super::config::VerificationServiceConfig;
use super::store::{Lookup, VerificationStore};
use super::traits::{Clock, IdentityDelegate, NotificationSender, SystemClock};
use super::types::IssuedCode;

/// Issues, checks and consumes single-use password reset codes
///
/// The manager exclusively owns the entry store. Resets for the same
/// recipient are serialised through a lock stripe chosen by hashing the
/// recipient, so the check, the credential update and the consumption of
/// the code happen as one step with respect to that recipient. Resets for
/// different recipients only contend when they hash to the same stripe.
pub struct VerificationCodeManager<I: ?Sized, N: ?Sized> {
    /// Identity authority that owns credentials
    identity: Arc<I>,
    /// Outbound channel for delivering codes
    notifier: Arc<N>,
    /// Time source for issuance and expiry
    clock: Arc<dyn Clock>,
    /// Entry store
    store: VerificationStore,
    /// Per-recipient reset locks
    stripes: Vec<Mutex<()>>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<I, N> VerificationCodeManager<I, N>
where
    I: IdentityDelegate + ?Sized,
    N: NotificationSender + ?Sized,
{
    /// Create a new manager using the system clock
    ///
    /// # Arguments
    ///
    /// * `identity` - Identity delegate that applies credential changes
    /// * `notifier` - Sender that delivers codes to recipients
    /// * `config` - Service configuration
    pub fn new(identity: Arc<I>, notifier: Arc<N>, config: VerificationServiceConfig) -> Self {
        Self::with_clock(identity, notifier, config, Arc::new(SystemClock))
    }

    /// Create a new manager with an explicit time source
    pub fn with_clock(
        identity: Arc<I>,
        notifier: Arc<N>,
        config: VerificationServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stripes = (0..config.lock_stripes.max(1))
            .map(|_| Mutex::new(()))
            .collect();

        Self {
            identity,
            notifier,
            clock,
            store: VerificationStore::new(config.max_entries),
            stripes,
            config,
        }
    }

    /// Issue a verification code for a recipient
    ///
    /// This method:
    /// 1. Normalizes and validates the recipient
    /// 2. Generates a new code valid for the configured TTL
    /// 3. Stores it, invalidating any previous code for the recipient
    /// 4. Delivers it through the notification sender
    ///
    /// The identity authority is not consulted, so the outcome does not
    /// reveal whether an account exists for the recipient.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - The code was stored and handed to the sender
    /// * `Err(VerificationError::InvalidRecipient)` - Empty or malformed recipient
    /// * `Err(VerificationError::DeliveryFailed)` - The sender failed; the
    ///   code is stored and remains valid regardless
    pub async fn issue(&self, recipient: &str) -> VerificationResult<IssuedCode> {
        let recipient = Self::normalize(recipient)?;
        let now = self.clock.now();

        let entry = VerificationEntry::issue(recipient.clone(), now, self.config.code_ttl());
        let outcome = self.store.insert(entry, now).await;
        let entry = outcome.entry;

        tracing::info!(
            recipient = %mask_recipient(&recipient),
            event = "verification_code_issued",
            superseded = outcome.superseded,
            expires_at = %entry.expires_at,
            "Issued new verification code"
        );

        let message_id = self
            .notifier
            .deliver_code(&recipient, &entry.code, entry.expires_at)
            .await
            .map_err(|reason| {
                tracing::error!(
                    recipient = %mask_recipient(&recipient),
                    error = %reason,
                    event = "verification_code_delivery_failed",
                    "Failed to deliver verification code; code remains valid"
                );
                VerificationError::DeliveryFailed { reason }
            })?;

        tracing::debug!(
            recipient = %mask_recipient(&recipient),
            message_id = %message_id,
            event = "verification_code_delivered",
            "Verification code handed to notification sender"
        );

        Ok(IssuedCode {
            recipient,
            code: entry.code,
            issued_at: entry.issued_at,
            expires_at: entry.expires_at,
            message_id,
        })
    }

    /// Check whether a supplied code is currently valid for a recipient
    ///
    /// Never consumes the code: calling this repeatedly with the correct
    /// code keeps returning `true` until the code is consumed, superseded
    /// or expires. Expired entries are removed on sight.
    pub async fn validate(&self, recipient: &str, supplied_code: &str) -> bool {
        match self.check(recipient, supplied_code).await {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!(
                    event = "verification_code_rejected",
                    reason = error.kind(),
                    "Verification code rejected"
                );
                false
            }
        }
    }

    /// Check a supplied code, reporting why it was rejected
    ///
    /// # Returns
    ///
    /// * `Ok(VerificationEntry)` - The live entry the code matched
    /// * `Err(CodeNotFound)` - No live entry for the recipient
    /// * `Err(CodeExpired)` - The entry expired (and has been removed)
    /// * `Err(CodeMismatch)` - The entry is live but the code differs
    pub async fn check(
        &self,
        recipient: &str,
        supplied_code: &str,
    ) -> VerificationResult<VerificationEntry> {
        let recipient = Self::normalize(recipient)?;
        let now = self.clock.now();

        match self.store.lookup(&recipient, now).await {
            Lookup::Missing | Lookup::NotYetValid(_) => {
                tracing::info!(
                    recipient = %mask_recipient(&recipient),
                    event = "verification_code_not_found",
                    "No live verification code for recipient"
                );
                Err(VerificationError::CodeNotFound)
            }
            Lookup::Expired(entry) => {
                tracing::info!(
                    recipient = %mask_recipient(&recipient),
                    expired_at = %entry.expires_at,
                    event = "verification_code_expired",
                    "Verification code expired and was removed"
                );
                Err(VerificationError::CodeExpired)
            }
            Lookup::Live(entry) if entry.matches(supplied_code) => Ok(entry),
            Lookup::Live(_) => {
                tracing::warn!(
                    recipient = %mask_recipient(&recipient),
                    event = "verification_code_mismatch",
                    "Supplied verification code does not match"
                );
                Err(VerificationError::CodeMismatch)
            }
        }
    }

    /// Reset the credential of the account behind a recipient
    ///
    /// This method, serialised per recipient:
    /// 1. Checks the supplied code
    /// 2. Resolves the account through the identity delegate
    /// 3. Overwrites the credential
    /// 4. Consumes the code
    ///
    /// The code is only consumed on success. When the identity delegate
    /// rejects the credential the code stays live, so the caller can retry
    /// with a corrected credential before it expires.
    pub async fn reset_credential(
        &self,
        recipient: &str,
        supplied_code: &str,
        new_credential: Credential,
    ) -> VerificationResult<()> {
        let recipient = Self::normalize(recipient)?;
        let _guard = self.stripe_for(&recipient).lock().await;

        let entry = self.check(&recipient, supplied_code).await?;

        if new_credential.is_empty() {
            return Err(VerificationError::CredentialUpdateFailed {
                reason: IdentityError::WeakCredential {
                    reason: "credential must not be empty".to_string(),
                },
            });
        }

        let account = self.resolve_account(&recipient).await?;

        if let Err(reason) = self
            .identity
            .update_credential(&account, &new_credential)
            .await
        {
            tracing::warn!(
                recipient = %mask_recipient(&recipient),
                account_id = %account.account_id,
                error = %reason,
                event = "credential_update_failed",
                "Identity delegate rejected credential update; code kept for retry"
            );
            // Not found at update time is reported as a provider failure
            return Err(VerificationError::CredentialUpdateFailed { reason });
        }

        if !self.store.remove_if_seq(&recipient, entry.issue_seq).await {
            tracing::debug!(
                recipient = %mask_recipient(&recipient),
                event = "verification_code_superseded_during_reset",
                "Code was superseded while the reset was in flight; newer code left intact"
            );
        }

        tracing::info!(
            recipient = %mask_recipient(&recipient),
            account_id = %account.account_id,
            event = "credential_reset",
            "Credential reset and verification code consumed"
        );

        Ok(())
    }

    /// Remove every expired entry, returning how many were removed
    pub async fn sweep_expired(&self) -> usize {
        self.store.sweep_expired(self.clock.now()).await
    }

    /// Number of codes currently held, including expired ones not yet swept
    pub async fn outstanding_codes(&self) -> usize {
        self.store.len().await
    }

    /// Service configuration
    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    async fn resolve_account(&self, recipient: &str) -> VerificationResult<AccountHandle> {
        match self.identity.find_account(recipient).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) | Err(IdentityError::NotFound) => {
                tracing::warn!(
                    recipient = %mask_recipient(recipient),
                    event = "account_not_found",
                    "Valid code presented but no account exists for recipient"
                );
                Err(VerificationError::AccountNotFound)
            }
            Err(reason) => {
                tracing::error!(
                    recipient = %mask_recipient(recipient),
                    error = %reason,
                    event = "account_lookup_failed",
                    "Identity delegate failed to look up account"
                );
                Err(VerificationError::CredentialUpdateFailed { reason })
            }
        }
    }

    fn stripe_for(&self, recipient: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        recipient.hash(&mut hasher);
        let index = (hasher.finish() % self.stripes.len() as u64) as usize;
        &self.stripes[index]
    }

    fn normalize(recipient: &str) -> VerificationResult<String> {
        let normalized = normalize_recipient(recipient);
        if is_well_formed_recipient(&normalized) {
            Ok(normalized)
        } else {
            Err(VerificationError::InvalidRecipient)
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &VerificationStore {
        &self.store
    }
}

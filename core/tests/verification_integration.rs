//! Integration tests for the password reset workflow through the public API

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use bk_core::{
        AccountHandle, Credential, DeliveryError, IdentityDelegate, IdentityError,
        NotificationSender, SweepConfig, VerificationCodeManager, VerificationError,
        VerificationServiceConfig, VerificationSweeper,
    };

    // Identity directory keyed by recipient
    struct Directory {
        passwords: RwLock<HashMap<String, String>>,
    }

    impl Directory {
        fn with(recipient: &str, password: &str) -> Self {
            let mut passwords = HashMap::new();
            passwords.insert(recipient.to_string(), password.to_string());
            Self {
                passwords: RwLock::new(passwords),
            }
        }
    }

    #[async_trait]
    impl IdentityDelegate for Directory {
        async fn find_account(
            &self,
            recipient: &str,
        ) -> Result<Option<AccountHandle>, IdentityError> {
            let passwords = self.passwords.read().await;
            Ok(passwords
                .contains_key(recipient)
                .then(|| AccountHandle::new(format!("uid-{}", recipient), recipient)))
        }

        async fn update_credential(
            &self,
            account: &AccountHandle,
            credential: &Credential,
        ) -> Result<(), IdentityError> {
            if credential.len() < 8 {
                return Err(IdentityError::WeakCredential {
                    reason: "minimum 8 characters".to_string(),
                });
            }
            self.passwords
                .write()
                .await
                .insert(account.recipient.clone(), credential.expose().to_string());
            Ok(())
        }
    }

    // Outbox that records the last code per recipient
    #[derive(Default)]
    struct Outbox {
        messages: RwLock<HashMap<String, String>>,
    }

    #[async_trait]
    impl NotificationSender for Outbox {
        async fn deliver_code(
            &self,
            recipient: &str,
            code: &str,
            _expires_at: DateTime<Utc>,
        ) -> Result<String, DeliveryError> {
            self.messages
                .write()
                .await
                .insert(recipient.to_string(), code.to_string());
            Ok(format!("outbox-{}", recipient))
        }
    }

    #[tokio::test]
    async fn test_password_reset_end_to_end() {
        let directory = Arc::new(Directory::with("a@x.com", "Original1"));
        let outbox = Arc::new(Outbox::default());
        let identity: Arc<dyn IdentityDelegate> = directory.clone();
        let notifier: Arc<dyn NotificationSender> = outbox.clone();

        let manager = VerificationCodeManager::new(
            identity,
            notifier,
            VerificationServiceConfig::default(),
        );

        manager.issue("a@x.com").await.unwrap();
        let code = outbox.messages.read().await.get("a@x.com").cloned().unwrap();

        assert!(manager.validate("a@x.com", &code).await);
        assert!(manager.validate("a@x.com", &code).await);

        manager
            .reset_credential("a@x.com", &code, Credential::new("NewPass1!"))
            .await
            .unwrap();

        assert_eq!(
            directory.passwords.read().await.get("a@x.com").cloned(),
            Some("NewPass1!".to_string())
        );
        assert!(!manager.validate("a@x.com", &code).await);
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_indistinguishable_until_reset() {
        let directory = Arc::new(Directory::with("a@x.com", "Original1"));
        let outbox = Arc::new(Outbox::default());
        let manager = VerificationCodeManager::new(
            directory,
            outbox.clone(),
            VerificationServiceConfig::default(),
        );

        let known = manager.issue("a@x.com").await;
        let unknown = manager.issue("nobody@x.com").await;
        assert!(known.is_ok());
        assert!(unknown.is_ok());

        let code = outbox
            .messages
            .read()
            .await
            .get("nobody@x.com")
            .cloned()
            .unwrap();
        let result = manager
            .reset_credential("nobody@x.com", &code, Credential::new("NewPass1!"))
            .await;
        assert_eq!(result.unwrap_err(), VerificationError::AccountNotFound);
    }

    #[tokio::test]
    async fn test_sweeper_lifecycle() {
        let manager = Arc::new(VerificationCodeManager::new(
            Arc::new(Directory::with("a@x.com", "Original1")),
            Arc::new(Outbox::default()),
            VerificationServiceConfig::default(),
        ));
        manager.issue("a@x.com").await.unwrap();

        let sweeper = Arc::new(VerificationSweeper::new(
            manager.clone(),
            SweepConfig::default(),
        ));

        // Nothing has expired yet
        let result = sweeper.run_sweep().await;
        assert_eq!(result.expired_removed, 0);
        assert_eq!(result.remaining, 1);

        let handle = sweeper.start();
        assert!(handle.is_running());
        handle.shutdown().await;
        assert_eq!(manager.outstanding_codes().await, 1);
    }
}

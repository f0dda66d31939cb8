//! Domain-specific error types and error handling.

mod types;

pub use types::{DeliveryError, IdentityError, VerificationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Result alias for the verification code operations
pub type VerificationResult<T> = Result<T, VerificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_rejections() {
        assert!(VerificationError::CodeNotFound.is_code_rejection());
        assert!(VerificationError::CodeExpired.is_code_rejection());
        assert!(VerificationError::CodeMismatch.is_code_rejection());
        assert!(!VerificationError::AccountNotFound.is_code_rejection());
        assert!(!VerificationError::InvalidRecipient.is_code_rejection());
    }

    #[test]
    fn test_error_display_includes_reason() {
        let error = VerificationError::CredentialUpdateFailed {
            reason: IdentityError::WeakCredential {
                reason: "too short".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "Credential update rejected: Weak credential: too short"
        );
        assert_eq!(error.kind(), "credential_update_failed");
    }

    #[test]
    fn test_domain_error_bridge() {
        let error: DomainError = VerificationError::CodeExpired.into();
        assert!(matches!(
            error,
            DomainError::Verification(VerificationError::CodeExpired)
        ));
        assert_eq!(error.to_string(), "Verification code expired");
    }
}

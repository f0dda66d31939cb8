//! Error types for the verification code workflow and its collaborators
//!
//! Validation outcomes (`CodeNotFound`, `CodeExpired`, `CodeMismatch`) are
//! expected results, not faults. Collaborator failures are kept distinct so
//! the transport layer can present an actionable message.

use thiserror::Error;

/// Failures reported by the identity authority
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Account not found")]
    NotFound,

    #[error("Weak credential: {reason}")]
    WeakCredential { reason: String },

    #[error("Identity provider rate limit exceeded")]
    RateLimited,

    #[error("Identity provider unavailable: {message}")]
    Unavailable { message: String },
}

/// Failures reported by the notification sender
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Recipient cannot be reached by this channel: {reason}")]
    Unreachable { reason: String },

    #[error("Delivery provider failure: {message}")]
    Provider { message: String },
}

/// Outcomes of the verification code operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid recipient identifier")]
    InvalidRecipient,

    #[error("No verification code issued for recipient")]
    CodeNotFound,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Verification code does not match")]
    CodeMismatch,

    #[error("No account found for recipient")]
    AccountNotFound,

    #[error("Verification code could not be delivered: {reason}")]
    DeliveryFailed { reason: DeliveryError },

    #[error("Credential update rejected: {reason}")]
    CredentialUpdateFailed { reason: IdentityError },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl VerificationError {
    /// `true` for the expected outcomes of checking a supplied code
    pub fn is_code_rejection(&self) -> bool {
        matches!(
            self,
            VerificationError::CodeNotFound
                | VerificationError::CodeExpired
                | VerificationError::CodeMismatch
        )
    }

    /// Stable identifier used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::InvalidRecipient => "invalid_recipient",
            VerificationError::CodeNotFound => "code_not_found",
            VerificationError::CodeExpired => "code_expired",
            VerificationError::CodeMismatch => "code_mismatch",
            VerificationError::AccountNotFound => "account_not_found",
            VerificationError::DeliveryFailed { .. } => "delivery_failed",
            VerificationError::CredentialUpdateFailed { .. } => "credential_update_failed",
            VerificationError::Internal { .. } => "internal",
        }
    }
}

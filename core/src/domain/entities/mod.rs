//! Domain entities representing core business objects.

pub mod account;
pub mod verification_entry;

// Re-export commonly used types
pub use account::{AccountHandle, Credential};
pub use verification_entry::{
    generate_code, VerificationEntry, CODE_LENGTH, CODE_MAX, CODE_MIN, DEFAULT_TTL_MINUTES,
};

//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Clock, IdentityDelegate, IssuedCode, NotificationSender, SweepConfig, SweepResult,
    SweeperHandle, SystemClock, VerificationCodeManager, VerificationServiceConfig,
    VerificationSweeper,
};

//! Identity delegates
//!
//! Implementations of `IdentityDelegate`, the only components allowed to
//! change an account's credential.

use std::sync::Arc;

use bk_core::IdentityDelegate;
use bk_shared::config::{IdentityConfig, IdentityProvider};

use crate::InfraError;

pub mod identity_toolkit;
pub mod in_memory;

pub use identity_toolkit::IdentityToolkitDelegate;
pub use in_memory::InMemoryIdentityDirectory;

/// Create the identity delegate selected by configuration
///
/// The in-memory directory is seeded with `config.seed_accounts`.
pub async fn create_identity_delegate(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityDelegate>, InfraError> {
    match config.provider {
        IdentityProvider::InMemory => {
            let directory = InMemoryIdentityDirectory::new();
            for (recipient, password) in &config.seed_accounts {
                directory.register(recipient, password).await?;
            }
            tracing::info!(
                seeded = config.seed_accounts.len(),
                "Using in-memory identity directory"
            );
            Ok(Arc::new(directory))
        }
        IdentityProvider::IdentityToolkit => {
            let delegate = IdentityToolkitDelegate::new(config)?;
            tracing::info!(base_url = %config.base_url, "Using identity toolkit delegate");
            Ok(Arc::new(delegate))
        }
    }
}

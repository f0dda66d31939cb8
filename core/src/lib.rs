//! # Bookly Core
//!
//! Core domain layer for the Bookly backend.
//! This crate contains the verification entry entity, the password reset
//! workflow built around it, the collaborator traits it drives, and the
//! error types shared by the outer layers.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;

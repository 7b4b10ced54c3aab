//! Error types for the filedex crate
//!
//! This module re-exports all error types so callers can import them from
//! one place.

// Re-export error types from submodules
pub use crate::registry::RegistryError;
pub use crate::registry::policy::{ParseLogNamingError, ParseNamingPolicyError};
pub use crate::tree::delete::ParseDeleteModeError;
pub use crate::tree::spec::TreeError;

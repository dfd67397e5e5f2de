use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Failure of a registry lookup that the caller required to succeed.
///
/// Only [`Registry::run`](crate::Registry::run) and
/// [`Registry::try_get`](crate::Registry::try_get) produce this.
/// The creator registry reports absence through `Option` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("Registry key not found: {0}")]
    KeyNotFound(String),
}

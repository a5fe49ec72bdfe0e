//! Result alias for call-domain operations

use super::error::DomainError;

/// Every fallible domain and application call returns this
pub type Result<T> = std::result::Result<T, DomainError>;

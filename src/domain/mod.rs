//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - The `Call` aggregate and its value objects
//! - Membership predicates and the status transition engine
//! - Domain events emitted on status changes

pub mod call;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};

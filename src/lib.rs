//! callsync - call status derived from server participant snapshots
//!
//! Snapshots of who joined, declined, left or is waiting in a lobby are
//! reconciled into a single local call status, and lifecycle notifications
//! are emitted at most once per transition.

pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;

//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Serializing snapshot processing per call
//! - Publishing domain events to the call observer

pub mod call_status_service;
pub mod notification;

pub use call_status_service::CallStatusService;
pub use notification::{CallObserver, LoggingObserver, NotificationDispatcher};

//! Notification delivery
//!
//! Events leave the aggregate synchronously but reach the observer on a
//! dedicated tokio task. The channel keeps them in the order they were
//! recorded, so a ringing notification is always observed before the
//! connected one produced by the same snapshot.

use crate::domain::call::{CallEvent, DisconnectReason, WaitReason};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::CallId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Receiver of call lifecycle callbacks
pub trait CallObserver: Send + Sync {
    fn on_ringing(&self, call_id: CallId);

    fn on_connected(&self, call_id: CallId);

    fn on_waiting(&self, call_id: CallId, reason: WaitReason);

    fn on_terminated(&self, call_id: CallId, reason: DisconnectReason);
}

/// Forwards call events to a [`CallObserver`] on its own task
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<CallEvent>,
    worker: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Spawn the delivery task on the current tokio runtime
    pub fn spawn(observer: Arc<dyn CallObserver>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<CallEvent>();

        let worker = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                deliver(observer.as_ref(), event);
            }
            debug!("Notification dispatcher drained");
        });

        Self { sender, worker }
    }

    /// Queue events for delivery without waiting for the observer
    pub fn dispatch(&self, events: Vec<CallEvent>) {
        for event in events {
            if self.sender.send(event).is_err() {
                warn!("Notification dispatcher stopped, dropping event");
                return;
            }
        }
    }

    /// Deliver everything already queued, then stop the task
    pub async fn shutdown(self) -> Result<()> {
        drop(self.sender);
        self.worker
            .await
            .map_err(|e| DomainError::Internal(format!("notification task failed: {}", e)))
    }
}

fn deliver(observer: &dyn CallObserver, event: CallEvent) {
    let call_id = *event.call_id();
    match event {
        CallEvent::Ringing(_) => observer.on_ringing(call_id),
        CallEvent::Connected(_) => observer.on_connected(call_id),
        CallEvent::Waiting(e) => observer.on_waiting(call_id, e.reason),
        CallEvent::Terminated(e) => observer.on_terminated(call_id, e.reason),
    }
}

/// Observer that only logs, used by the demo binary
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl CallObserver for LoggingObserver {
    fn on_ringing(&self, call_id: CallId) {
        tracing::info!("Call {} is ringing", call_id);
    }

    fn on_connected(&self, call_id: CallId) {
        tracing::info!("Call {} connected", call_id);
    }

    fn on_waiting(&self, call_id: CallId, reason: WaitReason) {
        tracing::info!("Call {} waiting ({:?})", call_id, reason);
    }

    fn on_terminated(&self, call_id: CallId, reason: DisconnectReason) {
        tracing::info!("Call {} terminated: {}", call_id, reason);
    }
}

//! Call status application service
//!
//! Keeps the registry of calls, serializes snapshot processing per call and
//! hands recorded events to the notification dispatcher.

use crate::application::notification::NotificationDispatcher;
use crate::config::EngineConfig;
use crate::domain::call::{Call, CallDirection, CallEvent, CallStatus, CallTopology, Snapshot};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, DeviceId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

pub struct CallStatusService {
    config: EngineConfig,
    /// Each call has its own lock so snapshots of one call never interleave
    calls: RwLock<HashMap<CallId, Arc<Mutex<Call>>>>,
    dispatcher: NotificationDispatcher,
}

impl CallStatusService {
    pub fn new(config: EngineConfig, dispatcher: NotificationDispatcher) -> Self {
        Self {
            config,
            calls: RwLock::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Start tracking a call in `Initiated` status
    ///
    /// The call stays registered until `remove_call`, including after it
    /// reaches `Disconnected`.
    pub async fn register_call(
        &self,
        call_id: CallId,
        direction: CallDirection,
        topology: CallTopology,
        local_device: Option<DeviceId>,
    ) -> Result<()> {
        let mut calls = self.calls.write().await;
        if calls.contains_key(&call_id) {
            return Err(DomainError::AlreadyExists(format!("call {}", call_id)));
        }

        let mut call = Call::new(call_id, direction, topology)
            .with_empty_remote_policy(self.config.empty_remote_policy)
            .with_wait_reason(self.config.default_wait_reason);
        if let Some(device) = local_device {
            call = call.with_local_device(device);
        }

        calls.insert(call_id, Arc::new(Mutex::new(call)));
        info!("Registered {:?} {:?} call {}", direction, topology, call_id);
        Ok(())
    }

    async fn call(&self, call_id: &CallId) -> Result<Arc<Mutex<Call>>> {
        self.calls
            .read()
            .await
            .get(call_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("call {}", call_id)))
    }

    /// Feed a snapshot to its call and dispatch whatever it produced
    ///
    /// Returns the dispatched events. A call that ends here is not evicted:
    /// its final status stays queryable and later snapshots are absorbed
    /// without events until the owner calls `remove_call`.
    pub async fn ingest(&self, snapshot: Snapshot) -> Result<Vec<CallEvent>> {
        let call = self.call(&snapshot.call_id).await?;
        let mut call = call.lock().await;

        call.apply_snapshot(snapshot)?;
        let events = call.take_events();
        debug!("Call {} produced {} event(s)", call.id(), events.len());

        // queued while the call lock is held, so per-call order is kept
        self.dispatcher.dispatch(events.clone());
        Ok(events)
    }

    pub async fn status(&self, call_id: &CallId) -> Result<CallStatus> {
        let call = self.call(call_id).await?;
        let status = call.lock().await.status();
        Ok(status)
    }

    pub async fn is_in_illegal_status(&self, call_id: &CallId) -> Result<bool> {
        let call = self.call(call_id).await?;
        let illegal = call.lock().await.is_in_illegal_status();
        Ok(illegal)
    }

    /// Fails with `IllegalStatus` while the call must not accept API actions
    pub async fn ensure_legal_status(&self, call_id: &CallId) -> Result<()> {
        let call = self.call(call_id).await?;
        let guard = call.lock().await;
        guard.ensure_legal_status()
    }

    /// Stop tracking a call, returning its final status
    pub async fn remove_call(&self, call_id: &CallId) -> Result<CallStatus> {
        let call = self
            .calls
            .write()
            .await
            .remove(call_id)
            .ok_or_else(|| DomainError::NotFound(format!("call {}", call_id)))?;
        let status = call.lock().await.status();
        info!("Removed call {} in status {}", call_id, status);
        Ok(status)
    }

    pub async fn active_calls(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Flush pending notifications and stop the dispatcher
    pub async fn shutdown(self) -> Result<()> {
        self.dispatcher.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notification::LoggingObserver;
    use crate::domain::call::{Membership, MembershipState};

    #[test]
    fn test_ingest_returns_dispatched_events() {
        tokio_test::block_on(async {
            let dispatcher = NotificationDispatcher::spawn(Arc::new(LoggingObserver));
            let service = CallStatusService::new(EngineConfig::default(), dispatcher);
            let call_id = CallId::new();

            service
                .register_call(call_id, CallDirection::Incoming, CallTopology::OneToOne, None)
                .await
                .unwrap();

            let snapshot = Snapshot::new(call_id, CallTopology::OneToOne)
                .with_membership(Membership::local(MembershipState::Joined, "phone"))
                .with_membership(Membership::remote(MembershipState::Joined));
            let events = service.ingest(snapshot).await.unwrap();

            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_type(), "call.connected");
            assert_eq!(service.status(&call_id).await.unwrap(), CallStatus::Connected);

            service.shutdown().await.unwrap();
        });
    }

    #[test]
    fn test_disconnected_call_stays_registered_until_removed() {
        tokio_test::block_on(async {
            let dispatcher = NotificationDispatcher::spawn(Arc::new(LoggingObserver));
            let service = CallStatusService::new(EngineConfig::default(), dispatcher);
            let call_id = CallId::new();

            service
                .register_call(call_id, CallDirection::Outgoing, CallTopology::OneToOne, None)
                .await
                .unwrap();

            let declined = Snapshot::new(call_id, CallTopology::OneToOne)
                .with_membership(Membership::local(MembershipState::Joined, "phone"))
                .with_membership(Membership::remote(MembershipState::Declined));
            let events = service.ingest(declined.clone()).await.unwrap();
            assert_eq!(events[0].event_type(), "call.terminated");

            assert_eq!(service.active_calls().await, 1);
            assert_eq!(service.status(&call_id).await.unwrap(), CallStatus::Disconnected);
            assert!(service.ingest(declined).await.unwrap().is_empty());

            assert_eq!(service.remove_call(&call_id).await.unwrap(), CallStatus::Disconnected);
            assert_eq!(service.active_calls().await, 0);
            assert!(matches!(
                service.status(&call_id).await,
                Err(DomainError::NotFound(_))
            ));

            service.shutdown().await.unwrap();
        });
    }
}

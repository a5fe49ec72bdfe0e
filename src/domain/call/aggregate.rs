//! Call aggregate root

use crate::domain::call::engine::{self, Action, EvalContext};
use crate::domain::call::entity::Membership;
use crate::domain::call::event::CallEvent;
use crate::domain::call::guard::OneShot;
use crate::domain::call::membership::MembershipView;
use crate::domain::call::snapshot::Snapshot;
use crate::domain::call::value_object::{
    CallDirection, CallStatus, CallTopology, DisconnectReason, EmptyRemotePolicy, WaitReason,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, DeviceId};
use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Call aggregate root
///
/// Owns the local view of a call's lifecycle. The status is never assigned
/// from outside: every change comes from feeding a snapshot through
/// [`Call::apply_snapshot`], which runs the transition engine and records the
/// resulting domain events.
#[derive(Debug)]
pub struct Call {
    /// Aggregate root ID
    id: CallId,
    /// Current status
    status: CallStatus,
    direction: CallDirection,
    topology: CallTopology,
    /// This device, as it appears in memberships
    local_device: Option<DeviceId>,
    /// Memberships of the latest snapshot, swapped in as a whole
    memberships: Arc<[Membership]>,
    /// Server-side activity flag of the latest snapshot
    active: bool,
    connected_notified: OneShot,
    wait_reason: WaitReason,
    empty_remote: EmptyRemotePolicy,
    disconnect_reason: Option<DisconnectReason>,
    created_at: DateTime<Utc>,
    connected_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    /// Pending domain events
    events: Vec<CallEvent>,
}

impl Call {
    /// Create a new call
    pub fn new(id: CallId, direction: CallDirection, topology: CallTopology) -> Self {
        Self {
            id,
            status: CallStatus::Initiated,
            direction,
            topology,
            local_device: None,
            memberships: Arc::from(Vec::new()),
            active: true,
            connected_notified: OneShot::new(),
            wait_reason: WaitReason::default(),
            empty_remote: EmptyRemotePolicy::default(),
            disconnect_reason: None,
            created_at: Utc::now(),
            connected_at: None,
            ended_at: None,
            events: Vec::new(),
        }
    }

    pub fn with_local_device(mut self, device: impl Into<DeviceId>) -> Self {
        self.local_device = Some(device.into());
        self
    }

    pub fn with_empty_remote_policy(mut self, policy: EmptyRemotePolicy) -> Self {
        self.empty_remote = policy;
        self
    }

    pub fn with_wait_reason(mut self, reason: WaitReason) -> Self {
        self.wait_reason = reason;
        self
    }

    /// Context reported with the next waiting notification
    pub fn set_wait_reason(&mut self, reason: WaitReason) {
        self.wait_reason = reason;
    }

    /// Replace the membership list with `snapshot` and advance the status
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.call_id != self.id {
            return Err(DomainError::InvalidOperation(format!(
                "snapshot for call {} applied to call {}",
                snapshot.call_id, self.id
            )));
        }

        if snapshot.topology != self.topology {
            debug!(
                "Call {} topology changed from {:?} to {:?}",
                self.id, self.topology, snapshot.topology
            );
            self.topology = snapshot.topology;
        }
        if snapshot.local_device.is_some() {
            self.local_device = snapshot.local_device;
        }
        self.active = snapshot.active;
        self.memberships = Arc::from(snapshot.memberships);

        self.evaluate();
        Ok(())
    }

    /// Run the engine against the current memberships and apply its actions
    fn evaluate(&mut self) {
        let memberships = Arc::clone(&self.memberships);
        let ctx = EvalContext {
            direction: self.direction,
            members: MembershipView::new(
                &memberships,
                self.local_device.as_ref(),
                self.topology,
                self.empty_remote,
            ),
            active: self.active,
            wait_reason: self.wait_reason,
        };

        let transition = engine::evaluate(self.status, &ctx);
        if transition.is_none() {
            debug!("Call {} stays {}", self.id, self.status);
            return;
        }

        if let Some(target) = transition.final_status() {
            debug!("Call {} moving {} -> {}", self.id, self.status, target);
        }
        for action in transition.into_actions() {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        let next = action.target_status();
        if !self.status.can_transition_to(next) {
            warn!(
                "Call {} rejected status change {} -> {}",
                self.id, self.status, next
            );
            return;
        }

        let previous = self.status;
        self.status = next;
        info!("Call {} status {} -> {}", self.id, previous, next);
        counter!("callsync_status_changes_total", "status" => next.as_str()).increment(1);

        match action {
            Action::Ring => self.record_event(CallEvent::ringing(self.id)),
            Action::Connect => {
                self.connected_at = Some(Utc::now());
                self.connected_notified.try_fire();
                self.record_event(CallEvent::connected(self.id));
            }
            Action::ConnectOnce => {
                self.connected_at = Some(Utc::now());
                if self.connected_notified.try_fire() {
                    self.record_event(CallEvent::connected(self.id));
                } else {
                    debug!("Call {} connected notification already delivered", self.id);
                }
            }
            Action::Wait(reason) => self.record_event(CallEvent::waiting(self.id, reason)),
            Action::Terminate(reason) => {
                self.disconnect_reason = Some(reason);
                self.ended_at = Some(Utc::now());
                counter!("callsync_terminations_total", "reason" => reason.as_str())
                    .increment(1);
                self.record_event(CallEvent::terminated(self.id, reason, previous));
            }
        }
    }

    /// Outgoing one-to-one call still initiated or ringing while the remote
    /// side has already left
    pub fn is_in_illegal_status(&self) -> bool {
        engine::is_illegal_status(self.status, self.direction, &self.members())
    }

    /// Guard for API actions that must not run in an illegal status
    pub fn ensure_legal_status(&self) -> Result<()> {
        if self.is_in_illegal_status() {
            return Err(DomainError::IllegalStatus(format!(
                "call {} is {} but the remote party already left",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// Predicates over the latest snapshot
    pub fn members(&self) -> MembershipView<'_> {
        MembershipView::new(
            &self.memberships,
            self.local_device.as_ref(),
            self.topology,
            self.empty_remote,
        )
    }

    /// Record a domain event
    fn record_event(&mut self, event: CallEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn take_events(&mut self) -> Vec<CallEvent> {
        std::mem::take(&mut self.events)
    }

    // Getters
    pub fn id(&self) -> &CallId {
        &self.id
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    pub fn topology(&self) -> CallTopology {
        self.topology
    }

    pub fn local_device(&self) -> Option<&DeviceId> {
        self.local_device.as_ref()
    }

    /// Shared handle to the latest membership list
    pub fn memberships(&self) -> Arc<[Membership]> {
        Arc::clone(&self.memberships)
    }

    pub fn wait_reason(&self) -> WaitReason {
        self.wait_reason
    }

    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        self.disconnect_reason
    }

    /// Whether a connected notification has been recorded for this call
    pub fn has_connected_notified(&self) -> bool {
        self.connected_notified.has_fired()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn connected_at(&self) -> Option<&DateTime<Utc>> {
        self.connected_at.as_ref()
    }

    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.connected_at
            .and_then(|connected| self.ended_at.map(|ended| ended - connected))
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::entity::MembershipState::*;

    fn outgoing_one_to_one() -> Call {
        Call::new(CallId::new(), CallDirection::Outgoing, CallTopology::OneToOne)
            .with_local_device("phone")
    }

    fn snapshot(call: &Call, memberships: Vec<Membership>) -> Snapshot {
        let mut snapshot = Snapshot::new(*call.id(), call.topology()).with_local_device("phone");
        snapshot.memberships = memberships;
        snapshot
    }

    fn event_types(call: &mut Call) -> Vec<&'static str> {
        call.take_events().iter().map(CallEvent::event_type).collect()
    }

    #[test]
    fn test_call_lifecycle() {
        let mut call = outgoing_one_to_one();
        assert_eq!(call.status(), CallStatus::Initiated);

        let ringing = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Notified)],
        );
        call.apply_snapshot(ringing).unwrap();
        assert_eq!(call.status(), CallStatus::Ringing);

        let answered = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Joined)],
        );
        call.apply_snapshot(answered).unwrap();
        assert_eq!(call.status(), CallStatus::Connected);
        assert!(call.has_connected_notified());
        assert!(call.connected_at().is_some());

        let hung_up = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Left)],
        );
        call.apply_snapshot(hung_up).unwrap();
        assert_eq!(call.status(), CallStatus::Disconnected);
        assert_eq!(call.disconnect_reason(), Some(DisconnectReason::RemoteLeft));
        assert!(call.duration().is_some());
        assert!(!call.is_active());

        assert_eq!(
            event_types(&mut call),
            vec!["call.ringing", "call.connected", "call.terminated"]
        );
    }

    #[test]
    fn test_connected_flag_tracks_every_connect() {
        let mut incoming = Call::new(CallId::new(), CallDirection::Incoming, CallTopology::OneToOne)
            .with_local_device("phone");
        let answered = snapshot(
            &incoming,
            vec![Membership::local(Joined, "phone"), Membership::remote(Joined)],
        );
        incoming.apply_snapshot(answered).unwrap();
        assert_eq!(event_types(&mut incoming), vec!["call.connected"]);
        assert!(incoming.has_connected_notified());

        let mut group = Call::new(CallId::new(), CallDirection::Outgoing, CallTopology::Group)
            .with_local_device("phone");
        assert!(!group.has_connected_notified());
        let joined = snapshot(&group, vec![Membership::local(Joined, "phone")]);
        group.apply_snapshot(joined).unwrap();
        assert_eq!(event_types(&mut group), vec!["call.ringing", "call.connected"]);
        assert!(group.has_connected_notified());
    }

    #[test]
    fn test_snapshot_for_other_call_is_rejected() {
        let mut call = outgoing_one_to_one();
        let foreign = Snapshot::new(CallId::new(), CallTopology::OneToOne);

        let result = call.apply_snapshot(foreign);
        assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
        assert_eq!(call.status(), CallStatus::Initiated);
    }

    #[test]
    fn test_memberships_replaced_wholesale() {
        let mut call = outgoing_one_to_one();
        let first = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Notified)],
        );
        call.apply_snapshot(first).unwrap();
        let before = call.memberships();

        let second = snapshot(&call, vec![Membership::local(Joined, "phone")]);
        call.apply_snapshot(second).unwrap();

        // an earlier handle keeps seeing its own snapshot
        assert_eq!(before.len(), 2);
        assert_eq!(call.memberships().len(), 1);
    }

    #[test]
    fn test_illegal_status_window() {
        let mut call = outgoing_one_to_one();
        let ringing = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Notified)],
        );
        call.apply_snapshot(ringing).unwrap();
        assert!(call.ensure_legal_status().is_ok());

        let remote_gone = snapshot(
            &call,
            vec![Membership::local(Joined, "phone"), Membership::remote(Left)],
        );
        call.apply_snapshot(remote_gone).unwrap();

        // no transition, only the diagnostic
        assert_eq!(call.status(), CallStatus::Ringing);
        assert!(call.is_in_illegal_status());
        assert!(matches!(
            call.ensure_legal_status(),
            Err(DomainError::IllegalStatus(_))
        ));
    }

    #[test]
    fn test_waiting_carries_call_context() {
        let mut call = Call::new(CallId::new(), CallDirection::Outgoing, CallTopology::Group)
            .with_local_device("phone");
        call.set_wait_reason(WaitReason::AwaitingHost);

        let lobby = snapshot(&call, vec![Membership::local(InLobby, "phone")]);
        call.apply_snapshot(lobby).unwrap();

        assert_eq!(call.status(), CallStatus::Waiting);
        let events = call.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            CallEvent::Waiting(waiting) => assert_eq!(waiting.reason, WaitReason::AwaitingHost),
            other => panic!("unexpected event {:?}", other),
        }
    }
}

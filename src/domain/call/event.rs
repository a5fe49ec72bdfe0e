//! Call domain events

use crate::domain::call::value_object::{CallStatus, DisconnectReason, WaitReason};
use crate::domain::shared::events::{DomainEvent, EventMetadata};
use crate::domain::shared::value_objects::CallId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base struct for all call events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEventBase {
    pub metadata: EventMetadata,
    pub call_id: CallId,
}

impl CallEventBase {
    pub fn new(event_type: &str, call_id: CallId) -> Self {
        Self {
            metadata: EventMetadata::new(event_type),
            call_id,
        }
    }
}

/// Call ringing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRinging {
    pub base: CallEventBase,
}

impl DomainEvent for CallRinging {
    fn event_type(&self) -> &'static str {
        "call.ringing"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base.metadata.occurred_at
    }
}

/// Call connected event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallConnected {
    pub base: CallEventBase,
}

impl DomainEvent for CallConnected {
    fn event_type(&self) -> &'static str {
        "call.connected"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base.metadata.occurred_at
    }
}

/// Local participant placed in a waiting room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallWaiting {
    pub base: CallEventBase,
    pub reason: WaitReason,
}

impl DomainEvent for CallWaiting {
    fn event_type(&self) -> &'static str {
        "call.waiting"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base.metadata.occurred_at
    }
}

/// Call terminated event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTerminated {
    pub base: CallEventBase,
    pub reason: DisconnectReason,
    /// Status the call was in when it ended
    pub previous_status: CallStatus,
}

impl DomainEvent for CallTerminated {
    fn event_type(&self) -> &'static str {
        "call.terminated"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base.metadata.occurred_at
    }
}

/// Union of all call events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallEvent {
    Ringing(CallRinging),
    Connected(CallConnected),
    Waiting(CallWaiting),
    Terminated(CallTerminated),
}

impl CallEvent {
    pub fn ringing(call_id: CallId) -> Self {
        CallEvent::Ringing(CallRinging {
            base: CallEventBase::new("call.ringing", call_id),
        })
    }

    pub fn connected(call_id: CallId) -> Self {
        CallEvent::Connected(CallConnected {
            base: CallEventBase::new("call.connected", call_id),
        })
    }

    pub fn waiting(call_id: CallId, reason: WaitReason) -> Self {
        CallEvent::Waiting(CallWaiting {
            base: CallEventBase::new("call.waiting", call_id),
            reason,
        })
    }

    pub fn terminated(
        call_id: CallId,
        reason: DisconnectReason,
        previous_status: CallStatus,
    ) -> Self {
        CallEvent::Terminated(CallTerminated {
            base: CallEventBase::new("call.terminated", call_id),
            reason,
            previous_status,
        })
    }

    pub fn call_id(&self) -> &CallId {
        match self {
            CallEvent::Ringing(e) => &e.base.call_id,
            CallEvent::Connected(e) => &e.base.call_id,
            CallEvent::Waiting(e) => &e.base.call_id,
            CallEvent::Terminated(e) => &e.base.call_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            CallEvent::Ringing(e) => e.event_type(),
            CallEvent::Connected(e) => e.event_type(),
            CallEvent::Waiting(e) => e.event_type(),
            CallEvent::Terminated(e) => e.event_type(),
        }
    }
}

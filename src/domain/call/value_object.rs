//! Call value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call direction, seen from the local device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    /// Someone else started the call
    Incoming,
    /// The local user started the call
    Outgoing,
}

/// Call topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTopology {
    /// Exactly one remote party
    OneToOne,
    /// Multi-party room; no single remote party is tracked
    Group,
}

impl CallTopology {
    pub fn is_group(&self) -> bool {
        matches!(self, CallTopology::Group)
    }
}

/// Local call status
///
/// Ordered: `Initiated < Waiting < Ringing < Connected < Disconnected`.
/// Status only ever moves forward, and `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Call object exists, nothing resolved yet
    Initiated,
    /// Local participant is held in a lobby
    Waiting,
    /// Remote side is being alerted
    Ringing,
    /// Media may flow
    Connected,
    /// Call is over
    Disconnected,
}

impl CallStatus {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        match self {
            CallStatus::Disconnected => false,
            _ => next > *self,
        }
    }

    /// Status that have not reached a resolved outcome yet
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            CallStatus::Initiated | CallStatus::Waiting | CallStatus::Ringing
        )
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, CallStatus::Disconnected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Initiated => "initiated",
            CallStatus::Waiting => "waiting",
            CallStatus::Ringing => "ringing",
            CallStatus::Connected => "connected",
            CallStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a call was terminated
///
/// Attached to every termination and passed through untouched to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Local device left a connected call
    LocalLeft,
    /// Remote party left a connected one-to-one call
    RemoteLeft,
    /// Local device declined an incoming call
    LocalDecline,
    /// Remote party declined an outgoing call
    RemoteDecline,
    /// Another device of the local user answered
    OtherConnected,
    /// Another device of the local user declined
    OtherDeclined,
    /// Caller gave up, or the server ended the call before it was answered
    RemoteCancel,
    /// Local device left before the outgoing call was answered
    LocalCancel,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::LocalLeft => "local_left",
            DisconnectReason::RemoteLeft => "remote_left",
            DisconnectReason::LocalDecline => "local_decline",
            DisconnectReason::RemoteDecline => "remote_decline",
            DisconnectReason::OtherConnected => "other_connected",
            DisconnectReason::OtherDeclined => "other_declined",
            DisconnectReason::RemoteCancel => "remote_cancel",
            DisconnectReason::LocalCancel => "local_cancel",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context carried by the waiting notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitReason {
    /// Held in the lobby until admitted
    #[default]
    Lobby,
    /// Held until the organizer starts the call
    AwaitingHost,
}

/// How one-to-one predicates treat a snapshot with no remote memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRemotePolicy {
    /// No remote party means no remote predicate holds
    #[default]
    Strict,
    /// "Every remote membership" holds over the empty set
    Vacuous,
}

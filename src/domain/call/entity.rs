//! Call entities

use crate::domain::shared::value_objects::DeviceId;
use serde::{Deserialize, Serialize};

/// Participant state as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    Idle,
    Notified,
    Joined,
    Declined,
    Left,
    InLobby,
}

/// One participant's relationship to a call
///
/// Memberships arrive as part of a snapshot and are never edited afterwards;
/// a new snapshot replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Belongs to the local user (on this or another device)
    is_self: bool,
    state: MembershipState,
    #[serde(default)]
    device_id: Option<DeviceId>,
}

impl Membership {
    pub fn new(is_self: bool, state: MembershipState, device_id: Option<DeviceId>) -> Self {
        Self {
            is_self,
            state,
            device_id,
        }
    }

    /// Remote participant membership
    pub fn remote(state: MembershipState) -> Self {
        Self::new(false, state, None)
    }

    /// Local user's membership on the given device
    pub fn local(state: MembershipState, device_id: impl Into<DeviceId>) -> Self {
        Self::new(true, state, Some(device_id.into()))
    }

    pub fn is_self(&self) -> bool {
        self.is_self
    }

    pub fn state(&self) -> MembershipState {
        self.state
    }

    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device_id.as_ref()
    }

    /// Whether this membership is the local device's own entry
    ///
    /// A self entry without a device identifier, or a call without a known
    /// local device, matches any self entry.
    pub fn is_local_device(&self, local_device: Option<&DeviceId>) -> bool {
        if !self.is_self {
            return false;
        }
        match (self.device_id.as_ref(), local_device) {
            (Some(device), Some(local)) => device == local,
            _ => true,
        }
    }

    /// Whether this membership is the local user on a different device
    pub fn is_other_device(&self, local_device: Option<&DeviceId>) -> bool {
        self.is_self && !self.is_local_device(local_device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_device_matching() {
        let phone = DeviceId::from("phone");
        let desktop = DeviceId::from("desktop");

        let on_phone = Membership::local(MembershipState::Joined, "phone");
        assert!(on_phone.is_local_device(Some(&phone)));
        assert!(!on_phone.is_other_device(Some(&phone)));
        assert!(!on_phone.is_local_device(Some(&desktop)));
        assert!(on_phone.is_other_device(Some(&desktop)));

        // no local device known: any self entry is local
        assert!(on_phone.is_local_device(None));

        let anonymous = Membership::new(true, MembershipState::Joined, None);
        assert!(anonymous.is_local_device(Some(&desktop)));
    }

    #[test]
    fn test_remote_is_never_local() {
        let remote = Membership::remote(MembershipState::Joined);
        assert!(!remote.is_local_device(None));
        assert!(!remote.is_other_device(None));
    }

    #[test]
    fn test_deserialize_membership() {
        let json = r#"{"is_self": true, "state": "in_lobby", "device_id": "tablet"}"#;
        let membership: Membership = serde_json::from_str(json).unwrap();
        assert!(membership.is_self());
        assert_eq!(membership.state(), MembershipState::InLobby);
        assert_eq!(membership.device_id(), Some(&DeviceId::from("tablet")));

        let json = r#"{"is_self": false, "state": "notified"}"#;
        let membership: Membership = serde_json::from_str(json).unwrap();
        assert_eq!(membership.device_id(), None);
    }
}

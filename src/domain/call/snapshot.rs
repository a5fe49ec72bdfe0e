//! Server-reported participant snapshot

use crate::domain::call::entity::Membership;
use crate::domain::call::value_object::CallTopology;
use crate::domain::shared::value_objects::{CallId, DeviceId};
use serde::{Deserialize, Serialize};

/// Full participant state of one call at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub call_id: CallId,
    pub topology: CallTopology,
    #[serde(default)]
    pub local_device: Option<DeviceId>,
    /// False once the server considers the call inactive or terminated
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

fn default_active() -> bool {
    true
}

impl Snapshot {
    pub fn new(call_id: CallId, topology: CallTopology) -> Self {
        Self {
            call_id,
            topology,
            local_device: None,
            active: true,
            memberships: Vec::new(),
        }
    }

    pub fn with_local_device(mut self, device: impl Into<DeviceId>) -> Self {
        self.local_device = Some(device.into());
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.memberships.push(membership);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::entity::MembershipState;

    #[test]
    fn test_parse_snapshot_defaults() {
        let call_id = CallId::new();
        let json = format!(
            r#"{{
                "call_id": "{}",
                "topology": "one_to_one",
                "memberships": [
                    {{"is_self": true, "state": "joined", "device_id": "phone"}},
                    {{"is_self": false, "state": "notified"}}
                ]
            }}"#,
            call_id
        );

        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.call_id, call_id);
        assert_eq!(snapshot.topology, CallTopology::OneToOne);
        assert!(snapshot.active);
        assert_eq!(snapshot.local_device, None);
        assert_eq!(snapshot.memberships.len(), 2);
        assert_eq!(snapshot.memberships[1].state(), MembershipState::Notified);
    }

    #[test]
    fn test_builder() {
        let snapshot = Snapshot::new(CallId::new(), CallTopology::Group)
            .with_local_device("phone")
            .with_membership(Membership::local(MembershipState::Joined, "phone"))
            .inactive();

        assert!(!snapshot.active);
        assert_eq!(snapshot.local_device, Some(DeviceId::from("phone")));
        assert_eq!(snapshot.memberships.len(), 1);
    }
}

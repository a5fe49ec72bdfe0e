//! Membership predicates
//!
//! Read-only questions about a call's membership list. One-to-one calls must
//! resolve unanimously across their remote memberships; group calls are a
//! standing room, so the remote predicates collapse to constants there.

use crate::domain::call::entity::{Membership, MembershipState};
use crate::domain::call::value_object::{CallTopology, EmptyRemotePolicy};
use crate::domain::shared::value_objects::DeviceId;

/// Predicate view over one snapshot's memberships
#[derive(Debug, Clone, Copy)]
pub struct MembershipView<'a> {
    memberships: &'a [Membership],
    local_device: Option<&'a DeviceId>,
    topology: CallTopology,
    empty_remote: EmptyRemotePolicy,
}

impl<'a> MembershipView<'a> {
    pub fn new(
        memberships: &'a [Membership],
        local_device: Option<&'a DeviceId>,
        topology: CallTopology,
        empty_remote: EmptyRemotePolicy,
    ) -> Self {
        Self {
            memberships,
            local_device,
            topology,
            empty_remote,
        }
    }

    pub fn topology(&self) -> CallTopology {
        self.topology
    }

    fn remotes(&self) -> impl Iterator<Item = &'a Membership> + 'a {
        self.memberships.iter().filter(|m| !m.is_self())
    }

    fn every_remote(&self, state: MembershipState) -> bool {
        let mut remotes = self.remotes().peekable();
        if remotes.peek().is_none() {
            return self.empty_remote == EmptyRemotePolicy::Vacuous;
        }
        remotes.all(|m| m.state() == state)
    }

    pub fn is_remote_left(&self) -> bool {
        match self.topology {
            CallTopology::Group => false,
            CallTopology::OneToOne => self.every_remote(MembershipState::Left),
        }
    }

    pub fn is_remote_joined(&self) -> bool {
        match self.topology {
            CallTopology::Group => true,
            CallTopology::OneToOne => self.every_remote(MembershipState::Joined),
        }
    }

    pub fn is_remote_declined(&self) -> bool {
        match self.topology {
            CallTopology::Group => false,
            CallTopology::OneToOne => self.every_remote(MembershipState::Declined),
        }
    }

    /// Remote party has been alerted but has not answered
    pub fn is_remote_notified(&self) -> bool {
        match self.topology {
            CallTopology::Group => true,
            CallTopology::OneToOne => self.remotes().any(|m| {
                matches!(m.state(), MembershipState::Idle | MembershipState::Notified)
            }),
        }
    }

    /// The local device's own membership, if the snapshot carries one
    pub fn local(&self) -> Option<&'a Membership> {
        let local_device = self.local_device;
        self.memberships
            .iter()
            .find(|m| m.is_local_device(local_device))
    }

    pub fn has_local(&self) -> bool {
        self.local().is_some()
    }

    fn local_in(&self, state: MembershipState) -> bool {
        let local_device = self.local_device;
        self.memberships
            .iter()
            .any(|m| m.is_local_device(local_device) && m.state() == state)
    }

    pub fn is_local_joined(&self) -> bool {
        self.local_in(MembershipState::Joined)
    }

    pub fn is_local_left(&self) -> bool {
        self.local_in(MembershipState::Left)
    }

    pub fn is_local_declined(&self) -> bool {
        self.local_in(MembershipState::Declined)
    }

    pub fn is_in_lobby(&self) -> bool {
        self.local_in(MembershipState::InLobby)
    }

    fn other_device_in(&self, state: MembershipState) -> bool {
        let local_device = self.local_device;
        self.memberships
            .iter()
            .any(|m| m.is_other_device(local_device) && m.state() == state)
    }

    /// Another device of the local user answered
    pub fn is_other_device_joined(&self) -> bool {
        self.other_device_in(MembershipState::Joined)
    }

    /// Another device of the local user declined
    pub fn is_other_device_declined(&self) -> bool {
        self.other_device_in(MembershipState::Declined)
    }
}

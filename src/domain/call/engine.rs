//! Status transition engine
//!
//! A pure function from `(status, snapshot view)` to an ordered list of
//! actions. The engine never touches the call; the aggregate applies the
//! actions and records the resulting events.

use crate::domain::call::membership::MembershipView;
use crate::domain::call::value_object::{
    CallDirection, CallStatus, CallTopology, DisconnectReason, WaitReason,
};
use tracing::debug;

/// One step decided by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move to `Ringing` and fire the ringing notification
    Ring,
    /// Move to `Connected` and fire the connected notification
    Connect,
    /// Move to `Connected`; the notification fires only if the call's
    /// one-shot guard has not been consumed yet
    ConnectOnce,
    /// Move to `Waiting` and fire the waiting notification
    Wait(WaitReason),
    /// Move to `Disconnected` with the given reason
    Terminate(DisconnectReason),
}

impl Action {
    pub fn target_status(&self) -> CallStatus {
        match self {
            Action::Ring => CallStatus::Ringing,
            Action::Connect | Action::ConnectOnce => CallStatus::Connected,
            Action::Wait(_) => CallStatus::Waiting,
            Action::Terminate(_) => CallStatus::Disconnected,
        }
    }
}

/// Ordered actions produced by one evaluation; empty means no transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    actions: Vec<Action>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    fn single(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    fn terminate(reason: DisconnectReason) -> Self {
        Self::single(Action::Terminate(reason))
    }

    pub fn is_none(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Status the call ends up in once every action is applied
    pub fn final_status(&self) -> Option<CallStatus> {
        self.actions.last().map(Action::target_status)
    }
}

/// Everything the engine reads besides the current status
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub direction: CallDirection,
    /// Also carries the call topology
    pub members: MembershipView<'a>,
    /// False once the server marked the call inactive
    pub active: bool,
    pub wait_reason: WaitReason,
}

/// Decide the next transition for a call in `status`
pub fn evaluate(status: CallStatus, ctx: &EvalContext<'_>) -> Transition {
    if status == CallStatus::Disconnected {
        return Transition::none();
    }

    if !ctx.members.has_local() {
        debug!("snapshot carries no local membership, skipping evaluation");
        return Transition::none();
    }

    let transition = if status.is_pending() {
        match ctx.direction {
            CallDirection::Incoming => pending_incoming(ctx),
            CallDirection::Outgoing => pending_outgoing(ctx),
        }
    } else {
        connected(ctx)
    };

    // a status already held is not entered (or announced) again
    Transition {
        actions: transition
            .actions
            .into_iter()
            .filter(|action| action.target_status() != status)
            .collect(),
    }
}

fn connected(ctx: &EvalContext<'_>) -> Transition {
    let members = &ctx.members;
    if members.is_local_left() {
        return Transition::terminate(DisconnectReason::LocalLeft);
    }
    if !members.topology().is_group() && members.is_remote_left() {
        return Transition::terminate(DisconnectReason::RemoteLeft);
    }
    Transition::none()
}

fn pending_incoming(ctx: &EvalContext<'_>) -> Transition {
    let members = &ctx.members;

    if members.is_remote_joined() {
        if members.is_local_joined() {
            Transition::single(Action::Connect)
        } else if members.is_local_declined() {
            Transition::terminate(DisconnectReason::LocalDecline)
        } else if members.is_other_device_joined() {
            Transition::terminate(DisconnectReason::OtherConnected)
        } else if members.is_other_device_declined() {
            Transition::terminate(DisconnectReason::OtherDeclined)
        } else if !ctx.active {
            Transition::terminate(DisconnectReason::RemoteCancel)
        } else {
            Transition::none()
        }
    } else if members.is_remote_declined() || members.is_remote_left() {
        Transition::terminate(DisconnectReason::RemoteCancel)
    } else {
        Transition::none()
    }
}

fn pending_outgoing(ctx: &EvalContext<'_>) -> Transition {
    let members = &ctx.members;

    if members.is_local_left() {
        return Transition::terminate(DisconnectReason::LocalCancel);
    }

    if members.is_local_joined() {
        return match members.topology() {
            CallTopology::Group => Transition {
                actions: vec![Action::Ring, Action::Connect],
            },
            CallTopology::OneToOne => {
                if members.is_remote_notified() {
                    Transition::single(Action::Ring)
                } else if members.is_remote_joined() {
                    Transition::single(Action::ConnectOnce)
                } else if members.is_remote_declined() {
                    Transition::terminate(DisconnectReason::RemoteDecline)
                } else {
                    Transition::none()
                }
            }
        };
    }

    if members.is_in_lobby() {
        return Transition::single(Action::Wait(ctx.wait_reason));
    }

    Transition::none()
}

/// Outgoing one-to-one call still ringing although the remote side already
/// left. Callers use this to reject API actions during that window.
pub fn is_illegal_status(
    status: CallStatus,
    direction: CallDirection,
    members: &MembershipView<'_>,
) -> bool {
    matches!(status, CallStatus::Initiated | CallStatus::Ringing)
        && direction == CallDirection::Outgoing
        && !members.topology().is_group()
        && members.is_remote_left()
}

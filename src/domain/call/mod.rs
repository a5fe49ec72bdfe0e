//! Call bounded context - derives call status from participant snapshots

pub mod aggregate;
pub mod engine;
pub mod entity;
pub mod event;
pub mod guard;
pub mod membership;
pub mod snapshot;
pub mod value_object;

pub use aggregate::Call;
pub use engine::{Action, EvalContext, Transition};
pub use entity::{Membership, MembershipState};
pub use event::CallEvent;
pub use membership::MembershipView;
pub use snapshot::Snapshot;
pub use value_object::{
    CallDirection, CallStatus, CallTopology, DisconnectReason, EmptyRemotePolicy, WaitReason,
};

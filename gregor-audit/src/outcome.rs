// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcomes of classifying one subject and the actions remediating them.
use std::fmt::{Display, Formatter};

use gregor_store::{AccessLevel, GroupId, MembershipRole, WorkspaceId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grant::Sharing;

/// How urgent a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Observed state matches the policy, or the group is exempt from it.
    Verified,

    /// Routine drift which is expected to occur while the lifecycle advances.
    NeedsAction,

    /// Access the group should never hold, needs human review.
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Verified => "verified",
            Severity::NeedsAction => "needs action",
            Severity::Error => "error",
        };

        write!(f, "{}", s)
    }
}

/// What was found for a subject, or what needs to happen to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutcomeKind {
    VerifiedShared,
    VerifiedNotShared,
    VerifiedMember,
    VerifiedAdmin,
    VerifiedNotMember,

    /// Group is deliberately not audited.
    Exempt,

    ShareAsReader,
    ShareAsWriter,
    ShareAsOwner,
    ShareWithCompute,
    StopSharing,

    AddMember,
    AddAdmin,
    ChangeToMember,
    ChangeToAdmin,
    Remove,
}

impl OutcomeKind {
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            OutcomeKind::VerifiedShared
                | OutcomeKind::VerifiedNotShared
                | OutcomeKind::VerifiedMember
                | OutcomeKind::VerifiedAdmin
                | OutcomeKind::VerifiedNotMember
                | OutcomeKind::Exempt
        )
    }

    /// Human-readable label of the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::VerifiedShared => "Verified shared",
            OutcomeKind::VerifiedNotShared => "Verified not shared",
            OutcomeKind::VerifiedMember => "Verified member",
            OutcomeKind::VerifiedAdmin => "Verified admin",
            OutcomeKind::VerifiedNotMember => "Verified not member",
            OutcomeKind::Exempt => "Exempt",
            OutcomeKind::ShareAsReader => "Share as reader",
            OutcomeKind::ShareAsWriter => "Share as writer",
            OutcomeKind::ShareAsOwner => "Share as owner",
            OutcomeKind::ShareWithCompute => "Share with compute",
            OutcomeKind::StopSharing => "Stop sharing",
            OutcomeKind::AddMember => "Add member",
            OutcomeKind::AddAdmin => "Add admin",
            OutcomeKind::ChangeToMember => "Change to member",
            OutcomeKind::ChangeToAdmin => "Change to admin",
            OutcomeKind::Remove => "Remove",
        }
    }
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Snapshot of the access state of a subject, either observed or expected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessState {
    /// Direct sharing of a workspace with a group, `None` if not shared.
    Sharing(Option<Sharing>),

    /// Membership of a group in the workspace auth domain, `None` if not a member.
    Membership(Option<MembershipRole>),
}

impl Display for AccessState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessState::Sharing(Some(sharing)) => write!(f, "{}", sharing),
            AccessState::Sharing(None) => write!(f, "not shared"),
            AccessState::Membership(Some(role)) => write!(f, "{}", role),
            AccessState::Membership(None) => write!(f, "not a member"),
        }
    }
}

/// Change converging the access state of one subject to the expected state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    /// Create or replace the sharing grant of a workspace with a group.
    Share {
        workspace: WorkspaceId,
        group: GroupId,
        access: AccessLevel,
        can_compute: bool,
    },

    StopSharing {
        workspace: WorkspaceId,
        group: GroupId,
    },

    /// Add a child group to a parent group or change its role.
    SetMembership {
        parent: GroupId,
        child: GroupId,
        role: MembershipRole,
    },

    RemoveMembership {
        parent: GroupId,
        child: GroupId,
    },
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Share {
                workspace,
                group,
                access,
                can_compute,
            } => {
                let sharing = Sharing::new(*access, *can_compute);
                write!(f, "share {} with {} as {}", workspace, group, sharing)
            }
            Action::StopSharing { workspace, group } => {
                write!(f, "stop sharing {} with {}", workspace, group)
            }
            Action::SetMembership {
                parent,
                child,
                role,
            } => write!(f, "make {} {} of {}", child, role, parent),
            Action::RemoveMembership { parent, child } => {
                write!(f, "remove {} from {}", child, parent)
            }
        }
    }
}

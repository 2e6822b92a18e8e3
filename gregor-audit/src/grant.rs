// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kinds of access a subject can hold and how they compare.
use std::fmt::{Debug, Display, Formatter};

use gregor_store::{AccessLevel, MembershipRole, SharingGrant};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::discovery::Subject;
use crate::outcome::{AccessState, Action, OutcomeKind};

/// Access a subject holds, either a sharing of the workspace or a membership in its auth domain.
pub trait Grant: Clone + Debug + PartialEq {
    /// Ordered privilege levels used to detect unexpected escalation.
    type Level: Copy + Debug + Display + Ord;

    fn level(&self) -> Self::Level;

    /// Returns true when this observed grant fulfills the expected one.
    fn satisfies(&self, expected: &Self) -> bool;

    /// Outcome of a subject whose observed state matches the expected one.
    fn verified(expected: Option<&Self>) -> OutcomeKind;

    /// Outcome of a subject which should hold `expected` but does not.
    fn converge(observed: Option<&Self>, expected: &Self) -> OutcomeKind;

    /// Outcome of a subject which should not hold anything but does.
    fn revoke() -> OutcomeKind;

    fn state(grant: Option<&Self>) -> AccessState;

    /// Action setting the state of the subject to `target`, revoking everything on `None`.
    fn action(subject: &Subject, target: Option<&Self>) -> Action;
}

/// Direct sharing of a workspace with a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sharing {
    pub access: AccessLevel,
    pub can_compute: bool,
}

impl Sharing {
    pub fn new(access: AccessLevel, can_compute: bool) -> Self {
        Self {
            access,
            can_compute,
        }
    }

    pub fn reader() -> Self {
        Self::new(AccessLevel::Reader, false)
    }

    pub fn writer() -> Self {
        Self::new(AccessLevel::Writer, false)
    }

    pub fn writer_with_compute() -> Self {
        Self::new(AccessLevel::Writer, true)
    }

    pub fn owner() -> Self {
        Self::new(AccessLevel::Owner, true)
    }
}

impl From<&SharingGrant> for Sharing {
    fn from(grant: &SharingGrant) -> Self {
        Self::new(grant.access, grant.can_compute)
    }
}

impl Display for Sharing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.can_compute {
            write!(f, "{} with compute", self.access)
        } else {
            write!(f, "{}", self.access)
        }
    }
}

impl Grant for Sharing {
    type Level = AccessLevel;

    fn level(&self) -> AccessLevel {
        self.access
    }

    /// Access levels need to be equal. The compute flag only matters for writers, owners can
    /// always compute and readers never can.
    fn satisfies(&self, expected: &Self) -> bool {
        match (self.access, expected.access) {
            (AccessLevel::Writer, AccessLevel::Writer) => self.can_compute == expected.can_compute,
            (observed, expected) => observed == expected,
        }
    }

    fn verified(expected: Option<&Self>) -> OutcomeKind {
        match expected {
            Some(_) => OutcomeKind::VerifiedShared,
            None => OutcomeKind::VerifiedNotShared,
        }
    }

    fn converge(_observed: Option<&Self>, expected: &Self) -> OutcomeKind {
        match expected.access {
            AccessLevel::Reader => OutcomeKind::ShareAsReader,
            AccessLevel::Writer if expected.can_compute => OutcomeKind::ShareWithCompute,
            AccessLevel::Writer => OutcomeKind::ShareAsWriter,
            AccessLevel::Owner => OutcomeKind::ShareAsOwner,
        }
    }

    fn revoke() -> OutcomeKind {
        OutcomeKind::StopSharing
    }

    fn state(grant: Option<&Self>) -> AccessState {
        AccessState::Sharing(grant.copied())
    }

    fn action(subject: &Subject, target: Option<&Self>) -> Action {
        match target {
            Some(sharing) => Action::Share {
                workspace: subject.workspace,
                group: subject.group.id,
                access: sharing.access,
                can_compute: sharing.can_compute,
            },
            None => Action::StopSharing {
                workspace: subject.workspace,
                group: subject.group.id,
            },
        }
    }
}

impl Grant for MembershipRole {
    type Level = MembershipRole;

    fn level(&self) -> MembershipRole {
        *self
    }

    fn satisfies(&self, expected: &Self) -> bool {
        self == expected
    }

    fn verified(expected: Option<&Self>) -> OutcomeKind {
        match expected {
            Some(MembershipRole::Member) => OutcomeKind::VerifiedMember,
            Some(MembershipRole::Admin) => OutcomeKind::VerifiedAdmin,
            None => OutcomeKind::VerifiedNotMember,
        }
    }

    fn converge(observed: Option<&Self>, expected: &Self) -> OutcomeKind {
        match (observed, expected) {
            (None, MembershipRole::Member) => OutcomeKind::AddMember,
            (None, MembershipRole::Admin) => OutcomeKind::AddAdmin,
            (Some(_), MembershipRole::Member) => OutcomeKind::ChangeToMember,
            (Some(_), MembershipRole::Admin) => OutcomeKind::ChangeToAdmin,
        }
    }

    fn revoke() -> OutcomeKind {
        OutcomeKind::Remove
    }

    fn state(grant: Option<&Self>) -> AccessState {
        AccessState::Membership(grant.copied())
    }

    fn action(subject: &Subject, target: Option<&Self>) -> Action {
        match target {
            Some(role) => Action::SetMembership {
                parent: subject.auth_domain,
                child: subject.group.id,
                role: *role,
            },
            None => Action::RemoveMembership {
                parent: subject.auth_domain,
                child: subject.group.id,
            },
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::collections::VecDeque;

use gregor_store::{AccessLevel, GroupId, MembershipRole, WorkspaceId};

use crate::traits::{Platform, PlatformError};

/// Call received by [`MockPlatform`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformCall {
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

/// Platform recording every successful call.
///
/// Failures can be injected with [`MockPlatform::fail_next`], every queued failure is returned by
/// exactly one call which is then not recorded.
#[derive(Debug, Default)]
pub struct MockPlatform {
    calls: RefCell<Vec<PlatformCall>>,
    failures: RefCell<VecDeque<PlatformError>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: PlatformError) {
        self.failures.borrow_mut().push_back(error);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: PlatformCall) -> Result<(), PlatformError> {
        if let Some(error) = self.failures.borrow_mut().pop_front() {
            return Err(error);
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl Platform for MockPlatform {
    fn share(
        &self,
        workspace: WorkspaceId,
        group: GroupId,
        access: AccessLevel,
        can_compute: bool,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::Share {
            workspace,
            group,
            access,
            can_compute,
        })
    }

    fn stop_sharing(&self, workspace: WorkspaceId, group: GroupId) -> Result<(), PlatformError> {
        self.record(PlatformCall::StopSharing { workspace, group })
    }

    fn set_membership(
        &self,
        parent: GroupId,
        child: GroupId,
        role: MembershipRole,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::SetMembership {
            parent,
            child,
            role,
        })
    }

    fn remove_membership(&self, parent: GroupId, child: GroupId) -> Result<(), PlatformError> {
        self.record(PlatformCall::RemoveMembership { parent, child })
    }
}

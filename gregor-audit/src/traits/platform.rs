// SPDX-License-Identifier: MIT OR Apache-2.0

use gregor_store::{AccessLevel, GroupId, MembershipRole, WorkspaceId};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// Request failed but can be retried, for example after a timeout.
    #[error("transient platform failure: {0}")]
    Transient(String),

    #[error("platform rejected request: {0}")]
    Permanent(String),
}

impl PlatformError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PlatformError::Transient(_))
    }
}

/// Remote workspace platform holding the authoritative sharing and membership state.
///
/// Every call sets the remote state to the given target, calling it twice with the same arguments
/// must not fail because the state already holds.
pub trait Platform {
    fn share(
        &self,
        workspace: WorkspaceId,
        group: GroupId,
        access: AccessLevel,
        can_compute: bool,
    ) -> Result<(), PlatformError>;

    fn stop_sharing(&self, workspace: WorkspaceId, group: GroupId) -> Result<(), PlatformError>;

    fn set_membership(
        &self,
        parent: GroupId,
        child: GroupId,
        role: MembershipRole,
    ) -> Result<(), PlatformError>;

    fn remove_membership(&self, parent: GroupId, child: GroupId) -> Result<(), PlatformError>;
}

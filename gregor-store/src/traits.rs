// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::records::{
    CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupId, ManagedGroup, Membership,
    ResearchCenter, ResearchCenterId, SharingGrant, UploadCycle, UploadCycleId, UploadWorkspace,
    Workspace, WorkspaceId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a transaction is already in progress")]
    TransactionInProgress,

    #[error("transaction permit does not belong to the current transaction")]
    StalePermit,

    #[error("error occurred in store backend: {0}")]
    Backend(String),
}

/// Queries over managed groups.
pub trait GroupStore {
    fn group(&self, id: GroupId) -> Result<Option<ManagedGroup>, StoreError>;

    /// Look up a group by its unique name.
    fn group_by_name(&self, name: &str) -> Result<Option<ManagedGroup>, StoreError>;
}

/// Queries over workspaces and the records describing their place in the upload lifecycle.
pub trait WorkspaceStore {
    fn workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, StoreError>;

    fn upload_cycle(&self, id: UploadCycleId) -> Result<Option<UploadCycle>, StoreError>;

    fn research_center(&self, id: ResearchCenterId) -> Result<Option<ResearchCenter>, StoreError>;

    fn upload_workspace(&self, id: WorkspaceId) -> Result<Option<UploadWorkspace>, StoreError>;

    fn combined_workspace(
        &self,
        id: WorkspaceId,
    ) -> Result<Option<CombinedConsortiumDataWorkspace>, StoreError>;

    fn dcc_processed_workspace(
        &self,
        id: WorkspaceId,
    ) -> Result<Option<DccProcessedDataWorkspace>, StoreError>;

    /// All upload workspaces, ordered by workspace id.
    fn upload_workspaces(&self) -> Result<Vec<UploadWorkspace>, StoreError>;

    /// All combined workspaces, ordered by workspace id.
    fn combined_workspaces(&self) -> Result<Vec<CombinedConsortiumDataWorkspace>, StoreError>;

    /// All DCC processed data workspaces, ordered by workspace id.
    fn dcc_processed_workspaces(&self) -> Result<Vec<DccProcessedDataWorkspace>, StoreError>;

    /// The combined workspace aggregating the given upload cycle, if one was created yet.
    fn combined_workspace_for_cycle(
        &self,
        cycle: UploadCycleId,
    ) -> Result<Option<CombinedConsortiumDataWorkspace>, StoreError>;
}

/// Sharing grants of workspaces with groups.
pub trait SharingStore {
    fn sharing(
        &self,
        workspace: WorkspaceId,
        group: GroupId,
    ) -> Result<Option<SharingGrant>, StoreError>;

    /// All grants of a workspace, ordered by group id.
    fn sharing_for_workspace(&self, workspace: WorkspaceId)
    -> Result<Vec<SharingGrant>, StoreError>;

    /// Insert a grant or replace the existing grant of the same (workspace, group) pair.
    fn set_sharing(&self, grant: SharingGrant) -> Result<(), StoreError>;

    /// Remove a grant.
    ///
    /// Returns `true` when the removal occurred and `false` when there was no grant.
    fn remove_sharing(&self, workspace: WorkspaceId, group: GroupId) -> Result<bool, StoreError>;
}

/// Memberships of groups in other groups.
pub trait MembershipStore {
    fn membership(&self, parent: GroupId, child: GroupId)
    -> Result<Option<Membership>, StoreError>;

    /// All direct members of a group, ordered by child group id.
    fn memberships_of(&self, parent: GroupId) -> Result<Vec<Membership>, StoreError>;

    /// Insert a membership or replace the role of the existing one.
    fn set_membership(&self, membership: Membership) -> Result<(), StoreError>;

    /// Remove a membership.
    ///
    /// Returns `true` when the removal occurred and `false` when the child was not a member.
    fn remove_membership(&self, parent: GroupId, child: GroupId) -> Result<bool, StoreError>;
}

/// Traits to implement database transaction provider.
///
/// To guard against sharing transactions unknowingly across unrelated database queries, a concept
/// of a "permit" is used which does not protect from misuse but helps to make "holding" a
/// transaction explicit.
pub trait Transaction {
    type Permit;

    /// Begins a transaction.
    fn begin(&self) -> Result<Self::Permit, StoreError>;

    /// Rolls back the transaction and with that all uncommitted changes.
    fn rollback(&self, permit: Self::Permit) -> Result<(), StoreError>;

    /// Commits the transaction.
    fn commit(&self, permit: Self::Permit) -> Result<(), StoreError>;
}

/// Everything the audit engine reads and writes.
pub trait AuditStore:
    GroupStore + WorkspaceStore + SharingStore + MembershipStore + Transaction
{
}

impl<T> AuditStore for T where
    T: GroupStore + WorkspaceStore + SharingStore + MembershipStore + Transaction
{
}

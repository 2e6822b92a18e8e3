// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::records::{
    CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupId, ManagedGroup, Membership,
    ResearchCenter, ResearchCenterId, SharingGrant, UploadCycle, UploadCycleId, UploadWorkspace,
    Workspace, WorkspaceId,
};
use crate::traits::{
    GroupStore, MembershipStore, SharingStore, StoreError, Transaction, WorkspaceStore,
};

#[derive(Clone, Debug, Default)]
struct MemoryState {
    groups: BTreeMap<GroupId, ManagedGroup>,
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    upload_cycles: BTreeMap<UploadCycleId, UploadCycle>,
    research_centers: BTreeMap<ResearchCenterId, ResearchCenter>,
    upload_workspaces: BTreeMap<WorkspaceId, UploadWorkspace>,
    combined_workspaces: BTreeMap<WorkspaceId, CombinedConsortiumDataWorkspace>,
    dcc_processed_workspaces: BTreeMap<WorkspaceId, DccProcessedDataWorkspace>,
    sharing: BTreeMap<(WorkspaceId, GroupId), SharingGrant>,
    memberships: BTreeMap<(GroupId, GroupId), Membership>,
}

/// Permit for a transaction on the in-memory store.
#[derive(Debug)]
pub struct MemoryPermit(u64);

/// In-memory store.
///
/// This does not persist data permanently, all changes are lost when the process ends. Use this
/// only in development or test contexts.
///
/// Clones share the same underlying state. The store is not `Send`, remediation against one store
/// instance is therefore always serialized.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
    snapshot: Rc<RefCell<Option<(u64, MemoryState)>>>,
    next_permit: Rc<Cell<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_group(&self, group: ManagedGroup) {
        self.state.borrow_mut().groups.insert(group.id, group);
    }

    pub fn insert_workspace(&self, workspace: Workspace) {
        self.state
            .borrow_mut()
            .workspaces
            .insert(workspace.id, workspace);
    }

    pub fn insert_upload_cycle(&self, cycle: UploadCycle) {
        self.state.borrow_mut().upload_cycles.insert(cycle.id, cycle);
    }

    pub fn insert_research_center(&self, research_center: ResearchCenter) {
        self.state
            .borrow_mut()
            .research_centers
            .insert(research_center.id, research_center);
    }

    pub fn insert_upload_workspace(&self, upload_workspace: UploadWorkspace) {
        self.state
            .borrow_mut()
            .upload_workspaces
            .insert(upload_workspace.workspace, upload_workspace);
    }

    pub fn insert_combined_workspace(&self, combined_workspace: CombinedConsortiumDataWorkspace) {
        self.state
            .borrow_mut()
            .combined_workspaces
            .insert(combined_workspace.workspace, combined_workspace);
    }

    pub fn insert_dcc_processed_workspace(&self, workspace: DccProcessedDataWorkspace) {
        self.state
            .borrow_mut()
            .dcc_processed_workspaces
            .insert(workspace.workspace, workspace);
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.borrow().is_some()
    }
}

impl GroupStore for MemoryStore {
    fn group(&self, id: GroupId) -> Result<Option<ManagedGroup>, StoreError> {
        Ok(self.state.borrow().groups.get(&id).cloned())
    }

    fn group_by_name(&self, name: &str) -> Result<Option<ManagedGroup>, StoreError> {
        Ok(self
            .state
            .borrow()
            .groups
            .values()
            .find(|group| group.name == name)
            .cloned())
    }
}

impl WorkspaceStore for MemoryStore {
    fn workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, StoreError> {
        Ok(self.state.borrow().workspaces.get(&id).cloned())
    }

    fn upload_cycle(&self, id: UploadCycleId) -> Result<Option<UploadCycle>, StoreError> {
        Ok(self.state.borrow().upload_cycles.get(&id).cloned())
    }

    fn research_center(&self, id: ResearchCenterId) -> Result<Option<ResearchCenter>, StoreError> {
        Ok(self.state.borrow().research_centers.get(&id).cloned())
    }

    fn upload_workspace(&self, id: WorkspaceId) -> Result<Option<UploadWorkspace>, StoreError> {
        Ok(self.state.borrow().upload_workspaces.get(&id).cloned())
    }

    fn combined_workspace(
        &self,
        id: WorkspaceId,
    ) -> Result<Option<CombinedConsortiumDataWorkspace>, StoreError> {
        Ok(self.state.borrow().combined_workspaces.get(&id).cloned())
    }

    fn dcc_processed_workspace(
        &self,
        id: WorkspaceId,
    ) -> Result<Option<DccProcessedDataWorkspace>, StoreError> {
        Ok(self.state.borrow().dcc_processed_workspaces.get(&id).cloned())
    }

    fn upload_workspaces(&self) -> Result<Vec<UploadWorkspace>, StoreError> {
        Ok(self
            .state
            .borrow()
            .upload_workspaces
            .values()
            .cloned()
            .collect())
    }

    fn combined_workspaces(&self) -> Result<Vec<CombinedConsortiumDataWorkspace>, StoreError> {
        Ok(self
            .state
            .borrow()
            .combined_workspaces
            .values()
            .cloned()
            .collect())
    }

    fn dcc_processed_workspaces(&self) -> Result<Vec<DccProcessedDataWorkspace>, StoreError> {
        Ok(self
            .state
            .borrow()
            .dcc_processed_workspaces
            .values()
            .cloned()
            .collect())
    }

    fn combined_workspace_for_cycle(
        &self,
        cycle: UploadCycleId,
    ) -> Result<Option<CombinedConsortiumDataWorkspace>, StoreError> {
        Ok(self
            .state
            .borrow()
            .combined_workspaces
            .values()
            .find(|combined| combined.upload_cycle == cycle)
            .cloned())
    }
}

impl SharingStore for MemoryStore {
    fn sharing(
        &self,
        workspace: WorkspaceId,
        group: GroupId,
    ) -> Result<Option<SharingGrant>, StoreError> {
        Ok(self.state.borrow().sharing.get(&(workspace, group)).cloned())
    }

    fn sharing_for_workspace(
        &self,
        workspace: WorkspaceId,
    ) -> Result<Vec<SharingGrant>, StoreError> {
        Ok(self
            .state
            .borrow()
            .sharing
            .range((workspace, GroupId(u64::MIN))..=(workspace, GroupId(u64::MAX)))
            .map(|(_, grant)| grant.clone())
            .collect())
    }

    fn set_sharing(&self, grant: SharingGrant) -> Result<(), StoreError> {
        self.state
            .borrow_mut()
            .sharing
            .insert((grant.workspace, grant.group), grant);
        Ok(())
    }

    fn remove_sharing(&self, workspace: WorkspaceId, group: GroupId) -> Result<bool, StoreError> {
        Ok(self
            .state
            .borrow_mut()
            .sharing
            .remove(&(workspace, group))
            .is_some())
    }
}

impl MembershipStore for MemoryStore {
    fn membership(
        &self,
        parent: GroupId,
        child: GroupId,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self.state.borrow().memberships.get(&(parent, child)).cloned())
    }

    fn memberships_of(&self, parent: GroupId) -> Result<Vec<Membership>, StoreError> {
        Ok(self
            .state
            .borrow()
            .memberships
            .range((parent, GroupId(u64::MIN))..=(parent, GroupId(u64::MAX)))
            .map(|(_, membership)| membership.clone())
            .collect())
    }

    fn set_membership(&self, membership: Membership) -> Result<(), StoreError> {
        self.state
            .borrow_mut()
            .memberships
            .insert((membership.parent, membership.child), membership);
        Ok(())
    }

    fn remove_membership(&self, parent: GroupId, child: GroupId) -> Result<bool, StoreError> {
        Ok(self
            .state
            .borrow_mut()
            .memberships
            .remove(&(parent, child))
            .is_some())
    }
}

impl Transaction for MemoryStore {
    type Permit = MemoryPermit;

    fn begin(&self) -> Result<MemoryPermit, StoreError> {
        let mut snapshot = self.snapshot.borrow_mut();
        if snapshot.is_some() {
            return Err(StoreError::TransactionInProgress);
        }

        let id = self.next_permit.get();
        self.next_permit.set(id + 1);
        *snapshot = Some((id, self.state.borrow().clone()));
        Ok(MemoryPermit(id))
    }

    fn rollback(&self, permit: MemoryPermit) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.borrow_mut();
        match snapshot.take() {
            Some((id, state)) if id == permit.0 => {
                *self.state.borrow_mut() = state;
                Ok(())
            }
            other => {
                *snapshot = other;
                Err(StoreError::StalePermit)
            }
        }
    }

    fn commit(&self, permit: MemoryPermit) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.borrow_mut();
        match snapshot.take() {
            Some((id, _)) if id == permit.0 => Ok(()),
            other => {
                *snapshot = other;
                Err(StoreError::StalePermit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::records::{
        AccessLevel, GroupId, ManagedGroup, Membership, MembershipRole, SharingGrant, WorkspaceId,
    };
    use crate::traits::{GroupStore, MembershipStore, SharingStore, StoreError, Transaction};

    use super::MemoryStore;

    fn grant(workspace: u64, group: u64, access: AccessLevel) -> SharingGrant {
        SharingGrant {
            workspace: WorkspaceId(workspace),
            group: GroupId(group),
            access,
            can_compute: false,
        }
    }

    #[test]
    fn groups_by_name() {
        let store = MemoryStore::new();
        store.insert_group(ManagedGroup::new(1, "GREGOR_ALL"));
        store.insert_group(ManagedGroup::new(2, "GREGOR_DCC_WRITERS"));

        let group = store.group_by_name("GREGOR_DCC_WRITERS").unwrap();
        assert_eq!(group.map(|group| group.id), Some(GroupId(2)));
        assert!(store.group_by_name("anvil-admins").unwrap().is_none());
    }

    #[test]
    fn sharing_is_unique_per_workspace_and_group() {
        let store = MemoryStore::new();
        store.set_sharing(grant(1, 10, AccessLevel::Reader)).unwrap();
        store.set_sharing(grant(1, 10, AccessLevel::Owner)).unwrap();
        store.set_sharing(grant(1, 11, AccessLevel::Writer)).unwrap();
        store.set_sharing(grant(2, 10, AccessLevel::Writer)).unwrap();

        let grants = store.sharing_for_workspace(WorkspaceId(1)).unwrap();
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].access, AccessLevel::Owner);
        assert_eq!(grants[1].group, GroupId(11));

        assert!(store.remove_sharing(WorkspaceId(1), GroupId(10)).unwrap());
        assert!(!store.remove_sharing(WorkspaceId(1), GroupId(10)).unwrap());
        assert!(store.sharing(WorkspaceId(1), GroupId(10)).unwrap().is_none());
    }

    #[test]
    fn memberships_of_parent() {
        let store = MemoryStore::new();
        for child in [3, 1, 2] {
            store
                .set_membership(Membership {
                    parent: GroupId(100),
                    child: GroupId(child),
                    role: MembershipRole::Member,
                })
                .unwrap();
        }
        store
            .set_membership(Membership {
                parent: GroupId(101),
                child: GroupId(1),
                role: MembershipRole::Admin,
            })
            .unwrap();

        let children: Vec<GroupId> = store
            .memberships_of(GroupId(100))
            .unwrap()
            .into_iter()
            .map(|membership| membership.child)
            .collect();
        assert_eq!(children, vec![GroupId(1), GroupId(2), GroupId(3)]);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let store = MemoryStore::new();
        store.set_sharing(grant(1, 10, AccessLevel::Reader)).unwrap();

        let permit = store.begin().unwrap();
        assert!(store.in_transaction());
        store.set_sharing(grant(1, 10, AccessLevel::Owner)).unwrap();
        store.remove_sharing(WorkspaceId(1), GroupId(10)).unwrap();
        store.rollback(permit).unwrap();

        assert!(!store.in_transaction());
        let restored = store.sharing(WorkspaceId(1), GroupId(10)).unwrap();
        assert_eq!(restored, Some(grant(1, 10, AccessLevel::Reader)));
    }

    #[test]
    fn commit_keeps_changes() {
        let store = MemoryStore::new();
        let permit = store.begin().unwrap();
        store.set_sharing(grant(1, 10, AccessLevel::Writer)).unwrap();
        store.commit(permit).unwrap();

        assert!(store.sharing(WorkspaceId(1), GroupId(10)).unwrap().is_some());
    }

    #[test]
    fn only_one_transaction_at_a_time() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let permit = store.begin().unwrap();
        assert_matches!(clone.begin(), Err(StoreError::TransactionInProgress));
        store.commit(permit).unwrap();

        let permit = clone.begin().unwrap();
        clone.commit(permit).unwrap();
    }
}

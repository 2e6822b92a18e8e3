// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enumerates the groups which are audited for one workspace.
//!
//! Discovery is deliberately generous: next to the groups the policies have an opinion about it
//! always includes every group which currently holds access, so unexpected access is surfaced
//! instead of silently ignored.
use std::collections::{BTreeMap, BTreeSet};

use gregor_store::{GroupId, GroupStore, ManagedGroup, WorkspaceId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::AuditError;
use crate::role::{Role, RoleMap};

/// A group audited in the context of one workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subject {
    pub workspace: WorkspaceId,
    pub auth_domain: GroupId,
    pub group: ManagedGroup,
    pub role: Role,
}

/// Subjects of a sharing audit: all structural groups, the auth domain and every group the
/// workspace is shared with.
pub fn sharing_subjects<S, V>(
    store: &S,
    roles: &RoleMap<'_>,
    workspace: WorkspaceId,
    observed: &BTreeMap<GroupId, V>,
) -> Result<Vec<Subject>, AuditError>
where
    S: GroupStore,
{
    let mut candidates = roles.structural_groups();
    candidates.insert(roles.auth_domain());
    candidates.extend(observed.keys().copied());
    subjects(store, roles, workspace, candidates)
}

/// Subjects of an auth domain audit: all structural groups and every current member of the auth
/// domain.
pub fn membership_subjects<S, V>(
    store: &S,
    roles: &RoleMap<'_>,
    workspace: WorkspaceId,
    observed: &BTreeMap<GroupId, V>,
) -> Result<Vec<Subject>, AuditError>
where
    S: GroupStore,
{
    let mut candidates = roles.structural_groups();
    candidates.extend(observed.keys().copied());
    subjects(store, roles, workspace, candidates)
}

fn subjects<S: GroupStore>(
    store: &S,
    roles: &RoleMap<'_>,
    workspace: WorkspaceId,
    candidates: BTreeSet<GroupId>,
) -> Result<Vec<Subject>, AuditError> {
    candidates
        .into_iter()
        .map(|id| {
            let group = store
                .group(id)?
                .ok_or_else(|| AuditError::missing("group", id, workspace))?;
            let role = roles.role_of(id);
            trace!(%workspace, group = %group.name, %role, "discovered subject");

            Ok(Subject {
                workspace,
                auth_domain: roles.auth_domain(),
                group,
                role,
            })
        })
        .collect()
}

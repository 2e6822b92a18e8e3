// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applying actions to the local store and the remote platform.
//!
//! Granting actions first write the local record and then converge the platform, revoking actions
//! first revoke on the platform and then delete the local record. Both happen inside one store
//! transaction which is rolled back when the platform call fails, so an action is never partially
//! applied.
//!
//! Actions are idempotent: when the target state already holds locally nothing is changed and the
//! platform is not called.
use gregor_store::{
    AuditStore, Membership, MembershipStore, SharingGrant, SharingStore, StoreError, Transaction,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::grant::{Grant, Sharing};
use crate::outcome::Action;
use crate::traits::{Platform, PlatformError};

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("platform call failed: {0}")]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RemediationError {
    /// Returns true when retrying the remediation later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RemediationError::Platform(err) => err.is_transient(),
            RemediationError::Store(_) => false,
        }
    }
}

/// Effect of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Changed,

    /// Target state already held.
    Unchanged,
}

impl Action {
    /// Converge local and remote state to the target of this action.
    pub fn apply<S, P>(&self, store: &S, platform: &P) -> Result<Applied, RemediationError>
    where
        S: AuditStore,
        P: Platform,
    {
        let applied = match self {
            Action::Share {
                workspace,
                group,
                access,
                can_compute,
            } => {
                let target = Sharing::new(*access, *can_compute);
                let current = store.sharing(*workspace, *group)?;
                if current.is_some_and(|grant| Sharing::from(&grant).satisfies(&target)) {
                    Applied::Unchanged
                } else {
                    in_transaction(store, |store| {
                        store.set_sharing(SharingGrant {
                            workspace: *workspace,
                            group: *group,
                            access: *access,
                            can_compute: *can_compute,
                        })?;
                        platform.share(*workspace, *group, *access, *can_compute)?;
                        Ok(())
                    })?;
                    Applied::Changed
                }
            }
            Action::StopSharing { workspace, group } => {
                if store.sharing(*workspace, *group)?.is_none() {
                    Applied::Unchanged
                } else {
                    in_transaction(store, |store| {
                        platform.stop_sharing(*workspace, *group)?;
                        store.remove_sharing(*workspace, *group)?;
                        Ok(())
                    })?;
                    Applied::Changed
                }
            }
            Action::SetMembership {
                parent,
                child,
                role,
            } => {
                let current = store.membership(*parent, *child)?;
                if current.is_some_and(|membership| membership.role.satisfies(role)) {
                    Applied::Unchanged
                } else {
                    in_transaction(store, |store| {
                        store.set_membership(Membership {
                            parent: *parent,
                            child: *child,
                            role: *role,
                        })?;
                        platform.set_membership(*parent, *child, *role)?;
                        Ok(())
                    })?;
                    Applied::Changed
                }
            }
            Action::RemoveMembership { parent, child } => {
                if store.membership(*parent, *child)?.is_none() {
                    Applied::Unchanged
                } else {
                    in_transaction(store, |store| {
                        platform.remove_membership(*parent, *child)?;
                        store.remove_membership(*parent, *child)?;
                        Ok(())
                    })?;
                    Applied::Changed
                }
            }
        };

        match applied {
            Applied::Changed => info!(action = %self, "applied remediation"),
            Applied::Unchanged => debug!(action = %self, "target state already holds"),
        }

        Ok(applied)
    }
}

/// Run `f` inside a store transaction, rolling it back when `f` fails.
fn in_transaction<S, F>(store: &S, f: F) -> Result<(), RemediationError>
where
    S: Transaction,
    F: FnOnce(&S) -> Result<(), RemediationError>,
{
    let permit = store.begin()?;

    match f(store) {
        Ok(()) => {
            store.commit(permit)?;
            Ok(())
        }
        Err(err) => {
            warn!(%err, "rolling back remediation");
            store.rollback(permit)?;
            Err(err)
        }
    }
}

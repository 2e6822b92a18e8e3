// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records and persistence interfaces for auditing access to consortium workspaces.
//!
//! The audit engine never talks to a database directly. It reads workspaces, groups, upload
//! cycles, sharing grants and memberships through the query traits of this crate and writes
//! sharing grants and memberships back when remediating a finding.
//!
//! ## Read queries
//!
//! [`GroupStore`] and [`WorkspaceStore`] are read-only. They answer questions by relationship,
//! for example "which combined workspace aggregates this upload cycle". [`SharingStore`] and
//! [`MembershipStore`] additionally allow to create, replace and delete the local record of a
//! sharing grant or membership.
//!
//! ## Write transactions
//!
//! A remediation first changes the local record and then converges the remote platform. When the
//! remote call fails the local change has to be undone, the [`Transaction`] trait groups such
//! writes into one atomic unit which is either committed or rolled back as a whole.
//!
//! ## In-memory store
//!
//! [`MemoryStore`] implements all traits and keeps everything in memory. It is meant for tests and
//! for replaying exported state, not for production persistence.
#[cfg(feature = "memory")]
mod memory;
pub mod records;
mod traits;

#[cfg(feature = "memory")]
pub use memory::{MemoryPermit, MemoryStore};
pub use records::{
    AccessLevel, CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupId,
    ManagedGroup, Membership, MembershipRole, ResearchCenter, ResearchCenterId, SharingGrant,
    UploadCycle, UploadCycleError, UploadCycleId, UploadWorkspace, Workspace, WorkspaceId,
};
pub use traits::{
    AuditStore, GroupStore, MembershipStore, SharingStore, StoreError, Transaction,
    WorkspaceStore,
};

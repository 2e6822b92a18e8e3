// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records of workspaces, groups, upload cycles and the access state connecting them.
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Identifier of a managed group on the workspace platform.
    GroupId,
    "group#"
);
record_id!(
    /// Identifier of a workspace on the workspace platform.
    WorkspaceId,
    "workspace#"
);
record_id!(UploadCycleId, "cycle#");
record_id!(ResearchCenterId, "rc#");

/// Access levels a group can be granted on a workspace.
///
/// Levels are ordered such that "higher" access levels include all "lower" ones.
///
/// Reader < Writer < Owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessLevel {
    /// Permission to read workspace data.
    Reader,

    /// Permission to write workspace data.
    Writer,

    /// Permission to write and to change the sharing of the workspace.
    Owner,
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessLevel::Reader => "READER",
            AccessLevel::Writer => "WRITER",
            AccessLevel::Owner => "OWNER",
        };

        write!(f, "{}", s)
    }
}

/// Roles a child group can hold inside a parent group.
///
/// Member < Admin
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MembershipRole {
    Member,

    /// Member who can also manage the membership of the parent group.
    Admin,
}

impl Display for MembershipRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MembershipRole::Member => "MEMBER",
            MembershipRole::Admin => "ADMIN",
        };

        write!(f, "{}", s)
    }
}

/// A named principal on the workspace platform.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManagedGroup {
    pub id: GroupId,

    /// Unique name of the group.
    pub name: String,
}

impl ManagedGroup {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A shared data container.
///
/// Every workspace owns exactly one authorization domain. The platform only lets members of the
/// auth domain see workspace data, no matter which direct sharing grants exist.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Workspace {
    pub id: WorkspaceId,
    pub billing_project: String,
    pub name: String,
    pub auth_domain: GroupId,
}

impl Display for Workspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.billing_project, self.name)
    }
}

/// A research center of the consortium together with the groups representing its people.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResearchCenter {
    pub id: ResearchCenterId,
    pub short_name: String,

    /// Group of accounts allowed to upload data for this research center.
    pub uploader_group: Option<GroupId>,

    /// Group of consortium members belonging to this research center.
    pub member_group: Option<GroupId>,

    /// Group of people working at this research center who are not consortium members.
    pub non_member_group: Option<GroupId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadCycleError {
    #[error("end date {end} of upload cycle {cycle} must be after its start date {start}")]
    InvalidDateRange {
        cycle: u32,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// A versioned upload period, the time axis every upload workspace lives on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UploadCycle {
    pub id: UploadCycleId,
    pub cycle: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Date from which uploaders are allowed to run compute in the workspaces of this cycle.
    pub date_ready_for_compute: Option<NaiveDate>,
}

impl UploadCycle {
    pub fn new(
        id: impl Into<UploadCycleId>,
        cycle: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, UploadCycleError> {
        if start_date >= end_date {
            return Err(UploadCycleError::InvalidDateRange {
                cycle,
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            id: id.into(),
            cycle,
            start_date,
            end_date,
            date_ready_for_compute: None,
        })
    }

    pub fn with_date_ready_for_compute(mut self, date: NaiveDate) -> Self {
        self.date_ready_for_compute = Some(date);
        self
    }
}

impl Display for UploadCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "U{:02}", self.cycle)
    }
}

/// Workspace holding the data one research center uploaded for one consent group in one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UploadWorkspace {
    pub workspace: WorkspaceId,
    pub research_center: ResearchCenterId,
    pub consent_group: String,
    pub upload_cycle: UploadCycleId,

    /// Date the DCC finished quality control of the uploaded data.
    pub date_qc_completed: Option<NaiveDate>,
}

/// Workspace aggregating all upload workspaces of one upload cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CombinedConsortiumDataWorkspace {
    pub workspace: WorkspaceId,
    pub upload_cycle: UploadCycleId,

    /// Date the workspace was completed and became ready to share with the consortium.
    pub date_completed: Option<NaiveDate>,
}

/// Workspace holding data the DCC processed for one consent group in one upload cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DccProcessedDataWorkspace {
    pub workspace: WorkspaceId,
    pub upload_cycle: UploadCycleId,
    pub consent_group: String,
}

/// Direct access of a group to a workspace.
///
/// There is at most one grant per (workspace, group) pair, no grant means no direct access.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SharingGrant {
    pub workspace: WorkspaceId,
    pub group: GroupId,
    pub access: AccessLevel,
    pub can_compute: bool,
}

/// Membership of a child group in a parent group, usually a workspace auth domain.
///
/// There is at most one membership per (parent, child) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Membership {
    pub parent: GroupId,
    pub child: GroupId,
    pub role: MembershipRole,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::{AccessLevel, MembershipRole, UploadCycle, UploadCycleError};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn access_levels_are_ordered() {
        assert!(AccessLevel::Reader < AccessLevel::Writer);
        assert!(AccessLevel::Writer < AccessLevel::Owner);
        assert!(MembershipRole::Member < MembershipRole::Admin);
    }

    #[test]
    fn upload_cycle_rejects_inverted_dates() {
        let result = UploadCycle::new(1, 1, date(2024, 5, 1), date(2024, 5, 1));
        assert_matches!(result, Err(UploadCycleError::InvalidDateRange { cycle: 1, .. }));

        let cycle = UploadCycle::new(1, 3, date(2024, 1, 1), date(2024, 5, 1)).unwrap();
        assert_eq!(cycle.to_string(), "U03");
        assert_eq!(cycle.date_ready_for_compute, None);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relationships of groups to the workspace under audit.
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use gregor_store::{GroupId, GroupStore, ResearchCenter, StoreError};

use crate::config::Config;

/// Relationship of a group to a workspace which decides the access it should have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    DccAdmin,
    DccWriter,
    DccMember,

    /// Group of all consortium members.
    ConsortiumAll,

    /// Uploaders of the research center owning an upload workspace.
    RcUploader,

    RcMember,
    RcNonMember,

    /// The auth domain of the workspace itself.
    AuthDomain,

    PlatformAdmin,
    PlatformDev,

    /// Any other group.
    Other,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::DccAdmin,
        Role::DccWriter,
        Role::DccMember,
        Role::ConsortiumAll,
        Role::RcUploader,
        Role::RcMember,
        Role::RcNonMember,
        Role::AuthDomain,
        Role::PlatformAdmin,
        Role::PlatformDev,
        Role::Other,
    ];

    pub fn is_platform(&self) -> bool {
        matches!(self, Role::PlatformAdmin | Role::PlatformDev)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::DccAdmin => "DCC admins",
            Role::DccWriter => "DCC writers",
            Role::DccMember => "DCC members",
            Role::ConsortiumAll => "consortium members",
            Role::RcUploader => "RC uploaders",
            Role::RcMember => "RC members",
            Role::RcNonMember => "RC non-members",
            Role::AuthDomain => "auth domain",
            Role::PlatformAdmin => "platform admins",
            Role::PlatformDev => "platform developers",
            Role::Other => "other group",
        };

        write!(f, "{}", s)
    }
}

/// Well-known groups resolved from their configured names.
///
/// Groups which do not exist in the store stay unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WellKnownGroups {
    pub dcc_admins: Option<GroupId>,
    pub dcc_writers: Option<GroupId>,
    pub dcc_members: Option<GroupId>,
    pub consortium_all: Option<GroupId>,
    pub platform_admins: Option<GroupId>,
    pub platform_devs: Option<GroupId>,
}

impl WellKnownGroups {
    pub fn resolve<S: GroupStore>(config: &Config, store: &S) -> Result<Self, StoreError> {
        let lookup = |name: &str| -> Result<Option<GroupId>, StoreError> {
            let group = store.group_by_name(name)?.map(|group| group.id);
            if group.is_none() {
                debug!(name, "well-known group does not exist");
            }
            Ok(group)
        };

        Ok(Self {
            dcc_admins: lookup(&config.dcc_admins_group)?,
            dcc_writers: lookup(&config.dcc_writers_group)?,
            dcc_members: lookup(&config.dcc_members_group)?,
            consortium_all: lookup(&config.consortium_all_group)?,
            platform_admins: lookup(&config.platform_admins_group)?,
            platform_devs: lookup(&config.platform_devs_group)?,
        })
    }
}

/// Research center groups relevant to one upload workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResearchCenterGroups {
    pub uploaders: Option<GroupId>,
    pub members: Option<GroupId>,
    pub non_members: Option<GroupId>,
}

impl From<&ResearchCenter> for ResearchCenterGroups {
    fn from(research_center: &ResearchCenter) -> Self {
        Self {
            uploaders: research_center.uploader_group,
            members: research_center.member_group,
            non_members: research_center.non_member_group,
        }
    }
}

/// Assigns a role to every group with respect to one workspace.
#[derive(Clone, Debug)]
pub struct RoleMap<'a> {
    auth_domain: GroupId,
    well_known: &'a WellKnownGroups,
    research_center: ResearchCenterGroups,
}

impl<'a> RoleMap<'a> {
    pub fn new(
        auth_domain: GroupId,
        well_known: &'a WellKnownGroups,
        research_center: Option<ResearchCenterGroups>,
    ) -> Self {
        Self {
            auth_domain,
            well_known,
            research_center: research_center.unwrap_or_default(),
        }
    }

    pub fn auth_domain(&self) -> GroupId {
        self.auth_domain
    }

    /// Role of the given group.
    ///
    /// When a group matches several relationships the first one in this order wins: auth domain,
    /// DCC admins, DCC writers, DCC members, consortium members, RC uploaders, RC members, RC
    /// non-members, platform admins, platform developers.
    pub fn role_of(&self, group: GroupId) -> Role {
        let is = |candidate: Option<GroupId>| candidate == Some(group);

        if group == self.auth_domain {
            Role::AuthDomain
        } else if is(self.well_known.dcc_admins) {
            Role::DccAdmin
        } else if is(self.well_known.dcc_writers) {
            Role::DccWriter
        } else if is(self.well_known.dcc_members) {
            Role::DccMember
        } else if is(self.well_known.consortium_all) {
            Role::ConsortiumAll
        } else if is(self.research_center.uploaders) {
            Role::RcUploader
        } else if is(self.research_center.members) {
            Role::RcMember
        } else if is(self.research_center.non_members) {
            Role::RcNonMember
        } else if is(self.well_known.platform_admins) {
            Role::PlatformAdmin
        } else if is(self.well_known.platform_devs) {
            Role::PlatformDev
        } else {
            Role::Other
        }
    }

    /// Groups which are audited whether or not they currently hold any access.
    ///
    /// The auth domain itself is not included, only sharing audits consider it.
    pub fn structural_groups(&self) -> BTreeSet<GroupId> {
        [
            self.well_known.dcc_admins,
            self.well_known.dcc_writers,
            self.well_known.dcc_members,
            self.well_known.consortium_all,
            self.well_known.platform_admins,
            self.well_known.platform_devs,
            self.research_center.uploaders,
            self.research_center.members,
            self.research_center.non_members,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

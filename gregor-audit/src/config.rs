// SPDX-License-Identifier: MIT OR Apache-2.0

//! Names of the well-known groups the audit policies refer to.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default name of the group administering every workspace on behalf of the data coordinating
/// center.
pub const DEFAULT_DCC_ADMINS_GROUP_NAME: &str = "GREGOR_DCC_ADMINS";

/// Default name of the group of data coordinating center staff allowed to write data.
pub const DEFAULT_DCC_WRITERS_GROUP_NAME: &str = "GREGOR_DCC_WRITERS";

/// Default name of the group of data coordinating center staff with read access.
pub const DEFAULT_DCC_MEMBERS_GROUP_NAME: &str = "GREGOR_DCC_MEMBERS";

/// Default name of the group containing every consortium member.
pub const DEFAULT_CONSORTIUM_ALL_GROUP_NAME: &str = "GREGOR_ALL";

pub const DEFAULT_PLATFORM_ADMINS_GROUP_NAME: &str = "anvil-admins";

pub const DEFAULT_PLATFORM_DEVS_GROUP_NAME: &str = "anvil_devs";

/// Configuration of the audit engine.
///
/// Only group names are configured here, the groups themselves are looked up in the store at the
/// beginning of every run. A configured group which does not exist is simply never discovered.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub dcc_admins_group: String,
    pub dcc_writers_group: String,
    pub dcc_members_group: String,
    pub consortium_all_group: String,

    /// Group of platform administrators, never audited.
    pub platform_admins_group: String,

    /// Group of platform developers, never audited.
    pub platform_devs_group: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dcc_admins_group: DEFAULT_DCC_ADMINS_GROUP_NAME.to_string(),
            dcc_writers_group: DEFAULT_DCC_WRITERS_GROUP_NAME.to_string(),
            dcc_members_group: DEFAULT_DCC_MEMBERS_GROUP_NAME.to_string(),
            consortium_all_group: DEFAULT_CONSORTIUM_ALL_GROUP_NAME.to_string(),
            platform_admins_group: DEFAULT_PLATFORM_ADMINS_GROUP_NAME.to_string(),
            platform_devs_group: DEFAULT_PLATFORM_DEVS_GROUP_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn with_dcc_admins_group(mut self, name: impl Into<String>) -> Self {
        self.dcc_admins_group = name.into();
        self
    }

    pub fn with_dcc_writers_group(mut self, name: impl Into<String>) -> Self {
        self.dcc_writers_group = name.into();
        self
    }

    pub fn with_dcc_members_group(mut self, name: impl Into<String>) -> Self {
        self.dcc_members_group = name.into();
        self
    }

    pub fn with_consortium_all_group(mut self, name: impl Into<String>) -> Self {
        self.consortium_all_group = name.into();
        self
    }

    pub fn with_platform_admins_group(mut self, name: impl Into<String>) -> Self {
        self.platform_admins_group = name.into();
        self
    }

    pub fn with_platform_devs_group(mut self, name: impl Into<String>) -> Self {
        self.platform_devs_group = name.into();
        self
    }
}

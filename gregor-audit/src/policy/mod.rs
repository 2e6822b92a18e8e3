// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative access policies.
//!
//! Every policy is a table mapping a [`Role`] and a lifecycle key to a [`Rule`]. Upload workspace
//! tables are keyed by [`Phase`], combined and DCC processed data workspace tables by [`Gate`].
//!
//! Tables are checked for completeness before any audit runs, so a missing rule surfaces as
//! [`PolicyError`] instead of being silently defaulted to "no access".
pub mod combined;
pub mod dcc_processed;
pub mod upload;

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use gregor_store::MembershipRole;
use thiserror::Error;

use crate::grant::{Grant, Sharing};
use crate::lifecycle::{Gate, Phase};
use crate::role::Role;

pub use combined::{combined_auth_domain_policy, combined_sharing_policy};
pub use dcc_processed::{dcc_processed_auth_domain_policy, dcc_processed_sharing_policy};
pub use upload::{upload_auth_domain_policy, upload_sharing_policy};

pub const PLATFORM_GROUP_EXEMPT: &str =
    "Platform groups are not audited, their access is managed by the platform.";

/// Lifecycle dimension of a policy table.
pub trait PolicyKey: Copy + Debug + Display + Ord + 'static {
    /// Every key, a complete table has a rule for each of them and every role.
    const KEYS: &'static [Self];
}

impl PolicyKey for Phase {
    const KEYS: &'static [Phase] = &Phase::ALL;
}

impl PolicyKey for Gate {
    const KEYS: &'static [Gate] = &Gate::ALL;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{table} policy has no rule for {role} in phase \"{key}\"")]
    MissingRule {
        table: &'static str,
        role: Role,
        key: String,
    },

    #[error("{table} policy defines more than one rule for {role} in phase \"{key}\"")]
    DuplicateRule {
        table: &'static str,
        role: Role,
        key: String,
    },

    #[error("{table} policy expects {role} to hold {expected} in phase \"{key}\", above its ceiling")]
    CeilingBelowExpected {
        table: &'static str,
        role: Role,
        key: String,
        expected: String,
    },
}

/// Expectation for one role in one lifecycle phase.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule<G: Grant> {
    Expect {
        /// Access the role should hold, `None` if it should not hold any.
        expected: Option<G>,

        /// Highest access the role may legitimately end up with, for example because it held it
        /// in an earlier phase. Anything above is an unexpected escalation, with `None` any access
        /// at all is.
        ceiling: Option<G::Level>,

        note: &'static str,
    },

    /// The role is not audited.
    Exempt { note: &'static str },
}

impl<G: Grant> Rule<G> {
    /// The role should hold exactly `expected`, holding more is an escalation.
    pub fn expect(expected: G, note: &'static str) -> Self {
        Self::Expect {
            ceiling: Some(expected.level()),
            expected: Some(expected),
            note,
        }
    }

    /// The role should never hold any access.
    pub fn nothing(note: &'static str) -> Self {
        Self::Expect {
            expected: None,
            ceiling: None,
            note,
        }
    }

    pub fn exempt(note: &'static str) -> Self {
        Self::Exempt { note }
    }

    /// Tolerate access up to `ceiling` as routine drift.
    pub fn up_to(self, ceiling: G::Level) -> Self {
        match self {
            Self::Expect { expected, note, .. } => Self::Expect {
                expected,
                ceiling: Some(ceiling),
                note,
            },
            exempt => exempt,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            Self::Expect { note, .. } | Self::Exempt { note } => note,
        }
    }
}

/// Complete mapping of (role, key) to rule for one workspace kind and audit kind.
#[derive(Clone, Debug)]
pub struct PolicyTable<K, G: Grant> {
    name: &'static str,
    rules: BTreeMap<(Role, K), Rule<G>>,
    duplicates: Vec<(Role, K)>,
}

impl<K, G> PolicyTable<K, G>
where
    K: PolicyKey,
    G: Grant,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Define the rule of a role for some keys.
    pub fn rule(mut self, role: Role, keys: &[K], rule: Rule<G>) -> Self {
        for key in keys {
            if self.rules.insert((role, *key), rule.clone()).is_some() {
                self.duplicates.push((role, *key));
            }
        }
        self
    }

    /// Define the rule of a role for every key.
    pub fn always(self, role: Role, rule: Rule<G>) -> Self {
        self.rule(role, K::KEYS, rule)
    }

    /// Mark the platform groups as exempt from this policy.
    pub fn exempt_platform_groups(self) -> Self {
        self.always(Role::PlatformAdmin, Rule::exempt(PLATFORM_GROUP_EXEMPT))
            .always(Role::PlatformDev, Rule::exempt(PLATFORM_GROUP_EXEMPT))
    }

    pub fn get(&self, role: Role, key: K) -> Result<&Rule<G>, PolicyError> {
        self.rules
            .get(&(role, key))
            .ok_or_else(|| PolicyError::MissingRule {
                table: self.name,
                role,
                key: key.to_string(),
            })
    }

    /// Check every role has exactly one rule for every key and no rule expects more than its own
    /// ceiling.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if let Some((role, key)) = self.duplicates.first() {
            return Err(PolicyError::DuplicateRule {
                table: self.name,
                role: *role,
                key: key.to_string(),
            });
        }

        for role in Role::ALL {
            for key in K::KEYS {
                if let Rule::Expect {
                    expected: Some(expected),
                    ceiling,
                    ..
                } = self.get(role, *key)?
                {
                    if ceiling.is_none_or(|ceiling| expected.level() > ceiling) {
                        return Err(PolicyError::CeilingBelowExpected {
                            table: self.name,
                            role,
                            key: key.to_string(),
                            expected: format!("{:?}", expected),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// All six policy tables, one per workspace kind and audit kind.
#[derive(Clone, Debug)]
pub struct Policies {
    pub upload_sharing: PolicyTable<Phase, Sharing>,
    pub upload_auth_domain: PolicyTable<Phase, MembershipRole>,
    pub combined_sharing: PolicyTable<Gate, Sharing>,
    pub combined_auth_domain: PolicyTable<Gate, MembershipRole>,
    pub dcc_processed_sharing: PolicyTable<Gate, Sharing>,
    pub dcc_processed_auth_domain: PolicyTable<Gate, MembershipRole>,
}

impl Policies {
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.upload_sharing.validate()?;
        self.upload_auth_domain.validate()?;
        self.combined_sharing.validate()?;
        self.combined_auth_domain.validate()?;
        self.dcc_processed_sharing.validate()?;
        self.dcc_processed_auth_domain.validate()?;
        Ok(())
    }
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            upload_sharing: upload_sharing_policy(),
            upload_auth_domain: upload_auth_domain_policy(),
            combined_sharing: combined_sharing_policy(),
            combined_auth_domain: combined_auth_domain_policy(),
            dcc_processed_sharing: dcc_processed_sharing_policy(),
            dcc_processed_auth_domain: dcc_processed_auth_domain_policy(),
        }
    }
}

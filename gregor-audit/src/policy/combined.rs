// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policies of combined consortium data workspaces, keyed by their own completion.
use gregor_store::{AccessLevel, MembershipRole};

use crate::grant::Sharing;
use crate::lifecycle::Gate;
use crate::policy::{PolicyTable, Rule};
use crate::role::Role;

pub const DCC_ADMIN_AS_OWNER: &str = "DCC Admins should always be a workspace owner.";
pub const DCC_WRITERS_BEFORE_COMPLETE: &str =
    "DCC writers should have write and compute access before the workspace is completed.";
pub const DCC_WRITERS_AFTER_COMPLETE: &str =
    "DCC writers should not have direct access after the workspace is completed.";
pub const DCC_MEMBERS_BEFORE_COMPLETE: &str =
    "DCC members should have read access before the workspace is completed.";
pub const DCC_MEMBERS_AFTER_COMPLETE: &str =
    "DCC members should not have direct access after the workspace is completed.";
pub const AUTH_DOMAIN_BEFORE_COMPLETE: &str =
    "The auth domain should not have access before the workspace is completed.";
pub const AUTH_DOMAIN_AFTER_COMPLETE: &str =
    "The auth domain should have read access after the workspace is completed.";
pub const GREGOR_ALL_BEFORE: &str =
    "This group should not have access to this workspace before it is completed.";
pub const GREGOR_ALL_AFTER: &str =
    "This group should have read access to this workspace after it is completed.";
pub const OTHER_GROUP: &str = "This group should not have access to this workspace.";

pub const DCC_ADMIN_AS_ADMIN: &str = "The DCC admins group should always be an admin.";
pub const GREGOR_ALL_AS_MEMBER: &str = "The GREGOR_ALL group should always be a member.";
pub const DCC_MEMBERSHIP_BEFORE_COMPLETE: &str =
    "DCC writer and member groups should be members of the auth domain before the workspace is completed.";
pub const DCC_MEMBERSHIP_AFTER_COMPLETE: &str =
    "DCC writer and member groups should not be direct members of the auth domain after the workspace is completed.";

const NOT_COMBINED: &[Gate] = &[Gate::NotCombined];
const COMBINED: &[Gate] = &[Gate::CombinedReady];

/// Direct sharing of combined workspaces.
pub fn combined_sharing_policy() -> PolicyTable<Gate, Sharing> {
    PolicyTable::new("combined workspace sharing")
        .always(
            Role::DccAdmin,
            Rule::expect(Sharing::owner(), DCC_ADMIN_AS_OWNER),
        )
        .rule(
            Role::DccWriter,
            NOT_COMBINED,
            Rule::expect(Sharing::writer_with_compute(), DCC_WRITERS_BEFORE_COMPLETE),
        )
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_WRITERS_AFTER_COMPLETE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::DccMember,
            NOT_COMBINED,
            Rule::expect(Sharing::reader(), DCC_MEMBERS_BEFORE_COMPLETE),
        )
        .rule(
            Role::DccMember,
            COMBINED,
            Rule::nothing(DCC_MEMBERS_AFTER_COMPLETE).up_to(AccessLevel::Reader),
        )
        // The consortium must not see the data before the DCC completed it.
        .rule(
            Role::AuthDomain,
            NOT_COMBINED,
            Rule::nothing(AUTH_DOMAIN_BEFORE_COMPLETE),
        )
        .rule(
            Role::AuthDomain,
            COMBINED,
            Rule::expect(Sharing::reader(), AUTH_DOMAIN_AFTER_COMPLETE),
        )
        .rule(
            Role::ConsortiumAll,
            NOT_COMBINED,
            Rule::nothing(GREGOR_ALL_BEFORE),
        )
        .rule(
            Role::ConsortiumAll,
            COMBINED,
            Rule::expect(Sharing::reader(), GREGOR_ALL_AFTER),
        )
        .always(Role::RcUploader, Rule::nothing(OTHER_GROUP))
        .always(Role::RcMember, Rule::nothing(OTHER_GROUP))
        .always(Role::RcNonMember, Rule::nothing(OTHER_GROUP))
        .always(Role::Other, Rule::nothing(OTHER_GROUP))
        .exempt_platform_groups()
}

/// Membership in the auth domain of combined workspaces.
pub fn combined_auth_domain_policy() -> PolicyTable<Gate, MembershipRole> {
    PolicyTable::new("combined workspace auth domain")
        .always(
            Role::DccAdmin,
            Rule::expect(MembershipRole::Admin, DCC_ADMIN_AS_ADMIN),
        )
        .always(
            Role::ConsortiumAll,
            Rule::expect(MembershipRole::Member, GREGOR_ALL_AS_MEMBER),
        )
        .rule(
            Role::DccWriter,
            NOT_COMBINED,
            Rule::expect(MembershipRole::Member, DCC_MEMBERSHIP_BEFORE_COMPLETE),
        )
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_MEMBERSHIP_AFTER_COMPLETE).up_to(MembershipRole::Member),
        )
        .rule(
            Role::DccMember,
            NOT_COMBINED,
            Rule::expect(MembershipRole::Member, DCC_MEMBERSHIP_BEFORE_COMPLETE),
        )
        .rule(
            Role::DccMember,
            COMBINED,
            Rule::nothing(DCC_MEMBERSHIP_AFTER_COMPLETE).up_to(MembershipRole::Member),
        )
        .always(Role::RcUploader, Rule::nothing(OTHER_GROUP))
        .always(Role::RcMember, Rule::nothing(OTHER_GROUP))
        .always(Role::RcNonMember, Rule::nothing(OTHER_GROUP))
        .always(Role::AuthDomain, Rule::nothing(OTHER_GROUP))
        .always(Role::Other, Rule::nothing(OTHER_GROUP))
        .exempt_platform_groups()
}

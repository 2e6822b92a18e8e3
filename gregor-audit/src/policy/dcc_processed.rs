// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policies of DCC processed data workspaces, keyed by the completion of the combined workspace of
//! their upload cycle.
use gregor_store::{AccessLevel, MembershipRole};

use crate::grant::Sharing;
use crate::lifecycle::Gate;
use crate::policy::{PolicyTable, Rule};
use crate::role::Role;

pub const DCC_ADMIN_AS_OWNER: &str = "The DCC admins group should always be an owner.";
pub const DCC_WRITERS_BEFORE_COMBINED_COMPLETE: &str =
    "DCC writers should have write and compute access before the combined workspace is ready.";
pub const DCC_WRITERS_AFTER_COMBINED_COMPLETE: &str =
    "DCC writers should not have direct access after the combined workspace is ready.";
pub const DCC_MEMBERS_BEFORE_COMBINED_COMPLETE: &str =
    "DCC members should have read access before the combined workspace is ready.";
pub const DCC_MEMBERS_AFTER_COMBINED_COMPLETE: &str =
    "DCC members should not have direct access after the combined workspace is ready.";
pub const AUTH_DOMAIN_AS_READER: &str = "The auth domain should always be a reader.";
pub const OTHER_GROUP: &str = "This group should not have access to this workspace.";

pub const DCC_ADMIN_AS_ADMIN: &str = "The DCC admins group should always be an admin.";
pub const DCC_MEMBERSHIP_BEFORE_COMBINED_COMPLETE: &str =
    "DCC writer and member groups should be members of the auth domain before the combined workspace is ready.";
pub const DCC_MEMBERSHIP_AFTER_COMBINED_COMPLETE: &str =
    "DCC writer and member groups should not be direct members of the auth domain after the combined workspace is ready.";
pub const GREGOR_ALL_BEFORE_COMBINED_COMPLETE: &str =
    "GREGOR_ALL should not be a member of the auth domain before the combined workspace is ready.";
pub const GREGOR_ALL_AFTER_COMBINED_COMPLETE: &str =
    "GREGOR_ALL should be a member of the auth domain after the combined workspace is ready.";

const NOT_COMBINED: &[Gate] = &[Gate::NotCombined];
const COMBINED: &[Gate] = &[Gate::CombinedReady];

/// Direct sharing of DCC processed data workspaces.
pub fn dcc_processed_sharing_policy() -> PolicyTable<Gate, Sharing> {
    PolicyTable::new("DCC processed data workspace sharing")
        .always(
            Role::DccAdmin,
            Rule::expect(Sharing::owner(), DCC_ADMIN_AS_OWNER),
        )
        .rule(
            Role::DccWriter,
            NOT_COMBINED,
            Rule::expect(
                Sharing::writer_with_compute(),
                DCC_WRITERS_BEFORE_COMBINED_COMPLETE,
            ),
        )
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_WRITERS_AFTER_COMBINED_COMPLETE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::DccMember,
            NOT_COMBINED,
            Rule::expect(Sharing::reader(), DCC_MEMBERS_BEFORE_COMBINED_COMPLETE),
        )
        .rule(
            Role::DccMember,
            COMBINED,
            Rule::nothing(DCC_MEMBERS_AFTER_COMBINED_COMPLETE).up_to(AccessLevel::Reader),
        )
        .always(
            Role::AuthDomain,
            Rule::expect(Sharing::reader(), AUTH_DOMAIN_AS_READER),
        )
        .always(Role::ConsortiumAll, Rule::nothing(OTHER_GROUP))
        .always(Role::RcUploader, Rule::nothing(OTHER_GROUP))
        .always(Role::RcMember, Rule::nothing(OTHER_GROUP))
        .always(Role::RcNonMember, Rule::nothing(OTHER_GROUP))
        .always(Role::Other, Rule::nothing(OTHER_GROUP))
        .exempt_platform_groups()
}

/// Membership in the auth domain of DCC processed data workspaces.
pub fn dcc_processed_auth_domain_policy() -> PolicyTable<Gate, MembershipRole> {
    PolicyTable::new("DCC processed data workspace auth domain")
        .always(
            Role::DccAdmin,
            Rule::expect(MembershipRole::Admin, DCC_ADMIN_AS_ADMIN),
        )
        .rule(
            Role::DccWriter,
            NOT_COMBINED,
            Rule::expect(
                MembershipRole::Member,
                DCC_MEMBERSHIP_BEFORE_COMBINED_COMPLETE,
            ),
        )
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_MEMBERSHIP_AFTER_COMBINED_COMPLETE).up_to(MembershipRole::Member),
        )
        .rule(
            Role::DccMember,
            NOT_COMBINED,
            Rule::expect(
                MembershipRole::Member,
                DCC_MEMBERSHIP_BEFORE_COMBINED_COMPLETE,
            ),
        )
        .rule(
            Role::DccMember,
            COMBINED,
            Rule::nothing(DCC_MEMBERSHIP_AFTER_COMBINED_COMPLETE).up_to(MembershipRole::Member),
        )
        .rule(
            Role::ConsortiumAll,
            NOT_COMBINED,
            Rule::nothing(GREGOR_ALL_BEFORE_COMBINED_COMPLETE).up_to(MembershipRole::Member),
        )
        .rule(
            Role::ConsortiumAll,
            COMBINED,
            Rule::expect(MembershipRole::Member, GREGOR_ALL_AFTER_COMBINED_COMPLETE),
        )
        .always(Role::RcUploader, Rule::nothing(OTHER_GROUP))
        .always(Role::RcMember, Rule::nothing(OTHER_GROUP))
        .always(Role::RcNonMember, Rule::nothing(OTHER_GROUP))
        .always(Role::AuthDomain, Rule::nothing(OTHER_GROUP))
        .always(Role::Other, Rule::nothing(OTHER_GROUP))
        .exempt_platform_groups()
}

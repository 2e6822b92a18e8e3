// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policies of upload workspaces.
//!
//! Research centers write to the workspace while their upload cycle is running. After the cycle
//! ended the DCC keeps write access until quality control is done, afterwards everyone reads the
//! data through the auth domain. Once the combined workspace of the cycle is ready, access moves
//! from the research center and DCC groups to the consortium as a whole.
use gregor_store::{AccessLevel, MembershipRole};

use crate::grant::Sharing;
use crate::lifecycle::Phase;
use crate::policy::{PolicyTable, Rule};
use crate::role::Role;

pub const RC_UPLOADERS_FUTURE_CYCLE: &str =
    "Uploaders should not have access before the upload cycle starts.";
pub const RC_UPLOADERS_CURRENT_CYCLE_BEFORE_COMPUTE: &str =
    "Uploaders should have write access before compute is enabled for this upload cycle.";
pub const RC_UPLOADERS_CURRENT_CYCLE_AFTER_COMPUTE: &str =
    "Uploaders should have write access with compute for this upload cycle.";
pub const RC_UPLOADERS_PAST_CYCLE_BEFORE_QC_COMPLETE: &str =
    "Uploaders should not have direct access before QC is complete.";
pub const RC_UPLOADERS_PAST_CYCLE_AFTER_QC_COMPLETE: &str =
    "Uploader group should not have direct access after QC is complete.";
pub const RC_UPLOADERS_PAST_CYCLE_COMBINED_WORKSPACE_READY: &str =
    "Uploader group should not have direct access when the combined workspace is ready to share or shared.";

pub const DCC_WRITERS_FUTURE_CYCLE: &str =
    "DCC writers should have write and compute access for future cycles.";
pub const DCC_WRITERS_CURRENT_CYCLE: &str =
    "DCC writers should have write and compute access for the current upload cycle.";
pub const DCC_WRITERS_PAST_CYCLE_BEFORE_QC_COMPLETE: &str =
    "DCC writers should have write and compute access before QC is complete.";
pub const DCC_WRITERS_PAST_CYCLE_AFTER_QC_COMPLETE: &str =
    "DCC writers should not have direct access after QC is complete.";
pub const DCC_WRITERS_PAST_CYCLE_COMBINED_WORKSPACE_READY: &str =
    "DCC writers should not have direct access when the combined workspace is ready to share or shared.";

pub const DCC_ADMIN_AS_OWNER: &str = "The DCC admin group should always be an owner.";
pub const DCC_MEMBERS_NO_DIRECT_ACCESS: &str =
    "DCC members should not have direct access, they read through the auth domain.";
pub const AUTH_DOMAIN_AS_READER: &str = "The auth domain should always be a reader.";
pub const OTHER_GROUP_NO_ACCESS: &str = "Other groups should not have direct access.";

pub const RC_BEFORE_COMBINED: &str =
    "RC uploader and member group should be members of the auth domain before the combined workspace is complete.";
pub const RC_AFTER_COMBINED: &str =
    "RC uploader and member group should not be direct members of the auth domain after the combined workspace is complete.";
pub const RC_NON_MEMBERS: &str =
    "RC non-member group should always be a member of the auth domain.";
pub const DCC_ADMINS_AS_ADMIN: &str =
    "DCC admin group should always be an admin of the auth domain.";
pub const DCC_BEFORE_COMBINED: &str =
    "DCC writer and member groups should be members of the auth domain before the combined workspace is complete.";
pub const DCC_AFTER_COMBINED: &str =
    "DCC writer and member groups should not be direct members of the auth domain after the combined workspace is complete.";
pub const GREGOR_ALL_BEFORE_COMBINED: &str =
    "GREGOR_ALL should not be a member of the auth domain before the combined workspace is complete.";
pub const GREGOR_ALL_AFTER_COMBINED: &str =
    "GREGOR_ALL should be a member of the auth domain after the combined workspace is complete.";
pub const OTHER_GROUP_NOT_MEMBER: &str =
    "Other groups should not be members of the auth domain.";

const BEFORE_COMBINED: &[Phase] = &[
    Phase::Future,
    Phase::CurrentBeforeCompute,
    Phase::CurrentAfterCompute,
    Phase::PastBeforeQc,
    Phase::PastAfterQcNotCombined,
];

const COMBINED: &[Phase] = &[Phase::PastAfterQcCombinedReady];

/// Direct sharing of upload workspaces.
pub fn upload_sharing_policy() -> PolicyTable<Phase, Sharing> {
    PolicyTable::new("upload workspace sharing")
        // Uploaders only write while their cycle runs.
        .rule(
            Role::RcUploader,
            &[Phase::Future],
            Rule::nothing(RC_UPLOADERS_FUTURE_CYCLE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::RcUploader,
            &[Phase::CurrentBeforeCompute],
            Rule::expect(Sharing::writer(), RC_UPLOADERS_CURRENT_CYCLE_BEFORE_COMPUTE),
        )
        .rule(
            Role::RcUploader,
            &[Phase::CurrentAfterCompute],
            Rule::expect(
                Sharing::writer_with_compute(),
                RC_UPLOADERS_CURRENT_CYCLE_AFTER_COMPUTE,
            ),
        )
        .rule(
            Role::RcUploader,
            &[Phase::PastBeforeQc],
            Rule::nothing(RC_UPLOADERS_PAST_CYCLE_BEFORE_QC_COMPLETE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::RcUploader,
            &[Phase::PastAfterQcNotCombined],
            Rule::nothing(RC_UPLOADERS_PAST_CYCLE_AFTER_QC_COMPLETE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::RcUploader,
            COMBINED,
            Rule::nothing(RC_UPLOADERS_PAST_CYCLE_COMBINED_WORKSPACE_READY)
                .up_to(AccessLevel::Writer),
        )
        // DCC writers keep write access until QC is done.
        .rule(
            Role::DccWriter,
            &[Phase::Future],
            Rule::expect(Sharing::writer_with_compute(), DCC_WRITERS_FUTURE_CYCLE),
        )
        .rule(
            Role::DccWriter,
            &[Phase::CurrentBeforeCompute, Phase::CurrentAfterCompute],
            Rule::expect(Sharing::writer_with_compute(), DCC_WRITERS_CURRENT_CYCLE),
        )
        .rule(
            Role::DccWriter,
            &[Phase::PastBeforeQc],
            Rule::expect(
                Sharing::writer_with_compute(),
                DCC_WRITERS_PAST_CYCLE_BEFORE_QC_COMPLETE,
            ),
        )
        .rule(
            Role::DccWriter,
            &[Phase::PastAfterQcNotCombined],
            Rule::nothing(DCC_WRITERS_PAST_CYCLE_AFTER_QC_COMPLETE).up_to(AccessLevel::Writer),
        )
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_WRITERS_PAST_CYCLE_COMBINED_WORKSPACE_READY)
                .up_to(AccessLevel::Writer),
        )
        .always(
            Role::DccAdmin,
            Rule::expect(Sharing::owner(), DCC_ADMIN_AS_OWNER),
        )
        .always(
            Role::DccMember,
            Rule::nothing(DCC_MEMBERS_NO_DIRECT_ACCESS).up_to(AccessLevel::Reader),
        )
        .always(
            Role::AuthDomain,
            Rule::expect(Sharing::reader(), AUTH_DOMAIN_AS_READER),
        )
        .always(Role::ConsortiumAll, Rule::nothing(OTHER_GROUP_NO_ACCESS))
        .always(Role::RcMember, Rule::nothing(OTHER_GROUP_NO_ACCESS))
        .always(Role::RcNonMember, Rule::nothing(OTHER_GROUP_NO_ACCESS))
        .always(Role::Other, Rule::nothing(OTHER_GROUP_NO_ACCESS))
        .exempt_platform_groups()
}

/// Membership in the auth domain of upload workspaces.
pub fn upload_auth_domain_policy() -> PolicyTable<Phase, MembershipRole> {
    let member = || Rule::expect(MembershipRole::Member, RC_BEFORE_COMBINED);
    let dcc_member = || Rule::expect(MembershipRole::Member, DCC_BEFORE_COMBINED);

    PolicyTable::new("upload workspace auth domain")
        .rule(Role::RcUploader, BEFORE_COMBINED, member())
        .rule(
            Role::RcUploader,
            COMBINED,
            Rule::nothing(RC_AFTER_COMBINED).up_to(MembershipRole::Member),
        )
        .rule(Role::RcMember, BEFORE_COMBINED, member())
        .rule(
            Role::RcMember,
            COMBINED,
            Rule::nothing(RC_AFTER_COMBINED).up_to(MembershipRole::Member),
        )
        .always(
            Role::RcNonMember,
            Rule::expect(MembershipRole::Member, RC_NON_MEMBERS),
        )
        .always(
            Role::DccAdmin,
            Rule::expect(MembershipRole::Admin, DCC_ADMINS_AS_ADMIN),
        )
        .rule(Role::DccWriter, BEFORE_COMBINED, dcc_member())
        .rule(
            Role::DccWriter,
            COMBINED,
            Rule::nothing(DCC_AFTER_COMBINED).up_to(MembershipRole::Member),
        )
        .rule(Role::DccMember, BEFORE_COMBINED, dcc_member())
        .rule(
            Role::DccMember,
            COMBINED,
            Rule::nothing(DCC_AFTER_COMBINED).up_to(MembershipRole::Member),
        )
        .rule(
            Role::ConsortiumAll,
            BEFORE_COMBINED,
            Rule::nothing(GREGOR_ALL_BEFORE_COMBINED).up_to(MembershipRole::Member),
        )
        .rule(
            Role::ConsortiumAll,
            COMBINED,
            Rule::expect(MembershipRole::Member, GREGOR_ALL_AFTER_COMBINED),
        )
        .always(Role::AuthDomain, Rule::nothing(OTHER_GROUP_NOT_MEMBER))
        .always(Role::Other, Rule::nothing(OTHER_GROUP_NOT_MEMBER))
        .exempt_platform_groups()
}

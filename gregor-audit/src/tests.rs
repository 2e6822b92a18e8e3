// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use assert_matches::assert_matches;
use gregor_store::{
    AccessLevel, GroupId, MembershipRole, ResearchCenterId, SharingStore, UploadWorkspace,
    WorkspaceId,
};

use crate::audit::{AuditKind, Auditor, WorkspaceKind};
use crate::error::AuditError;
use crate::outcome::{Action, OutcomeKind, Severity};
use crate::policy::{
    PLATFORM_GROUP_EXEMPT, Policies, PolicyError, PolicyTable, combined, dcc_processed, upload,
};
use crate::report::{AuditReport, AuditResult, Remediated};
use crate::role::Role;
use crate::test_utils::{
    MockPlatform, PlatformCall, TestConsortium, days_ago, days_ahead, setup_logging, today,
};
use crate::traits::{FixedClock, PlatformError};

fn result_for(report: &AuditReport, group: GroupId) -> &AuditResult {
    report
        .iter()
        .find(|result| result.subject.group.id == group)
        .expect("group was audited")
}

#[test]
fn future_cycle_uploaders_have_no_access() {
    setup_logging();
    let consortium = TestConsortium::new();
    let cycle = consortium.future_cycle();
    let workspace = consortium.upload_workspace(&cycle, None);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.rc_uploaders());
    assert_eq!(result.kind, OutcomeKind::VerifiedNotShared);
    assert_eq!(result.severity, Severity::Verified);
    assert_eq!(result.note, upload::RC_UPLOADERS_FUTURE_CYCLE);
    assert_eq!(result.action, None);

    consortium.share(&workspace, consortium.rc_uploaders(), AccessLevel::Writer, false);
    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.rc_uploaders());
    assert_eq!(result.kind, OutcomeKind::StopSharing);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(
        result.action,
        Some(Action::StopSharing {
            workspace: workspace.id,
            group: consortium.rc_uploaders(),
        })
    );
}

#[test]
fn current_cycle_uploaders_write_without_compute() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(None);
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.share(&workspace, consortium.rc_uploaders(), AccessLevel::Writer, false);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.rc_uploaders());
    assert_eq!(result.kind, OutcomeKind::VerifiedShared);
    assert_eq!(result.severity, Severity::Verified);
    assert_eq!(
        result.note,
        upload::RC_UPLOADERS_CURRENT_CYCLE_BEFORE_COMPUTE
    );
}

#[test]
fn compute_is_granted_once_the_cycle_is_ready() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(Some(days_ago(1)));
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.share(&workspace, consortium.rc_uploaders(), AccessLevel::Writer, false);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.rc_uploaders());
    assert_eq!(result.kind, OutcomeKind::ShareWithCompute);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(
        result.action,
        Some(Action::Share {
            workspace: workspace.id,
            group: consortium.rc_uploaders(),
            access: AccessLevel::Writer,
            can_compute: true,
        })
    );
    assert_eq!(
        result.to_string(),
        format!(
            "Share with compute: {}",
            upload::RC_UPLOADERS_CURRENT_CYCLE_AFTER_COMPUTE
        )
    );
}

#[test]
fn elevated_access_after_qc_is_an_error() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    let workspace = consortium.upload_workspace(&cycle, Some(days_ago(10)));
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Owner, false);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::StopSharing);
    assert_eq!(result.severity, Severity::Error);
    assert!(report.errors().contains(result));
    assert!(!report.ok());

    // Write access is only routine drift after QC.
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Writer, true);
    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(result.note, upload::DCC_WRITERS_PAST_CYCLE_AFTER_QC_COMPLETE);
}

#[test]
fn consortium_joins_auth_domain_once_combined_workspace_is_ready() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    let workspace = consortium.upload_workspace(&cycle, Some(days_ago(20)));
    consortium.combined_workspace(&cycle, Some(days_ago(5)));

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::AddMember);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(result.note, upload::GREGOR_ALL_AFTER_COMBINED);
    assert_eq!(
        result.action,
        Some(Action::SetMembership {
            parent: workspace.auth_domain,
            child: consortium.consortium_all,
            role: MembershipRole::Member,
        })
    );

    // Without a completion date the consortium stays out.
    let open_cycle = consortium.past_cycle();
    let open_workspace = consortium.upload_workspace(&open_cycle, Some(days_ago(20)));
    consortium.combined_workspace(&open_cycle, None);
    let report = consortium
        .auditor()
        .audit_workspace(open_workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::VerifiedNotMember);
    assert_eq!(result.note, upload::GREGOR_ALL_BEFORE_COMBINED);
}

#[test]
fn completion_date_ahead_of_today_counts_as_complete() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    let workspace = consortium.upload_workspace(&cycle, Some(days_ago(20)));
    consortium.combined_workspace(&cycle, Some(days_ahead(1)));

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::AddMember);
    assert_eq!(result.severity, Severity::NeedsAction);
}

#[test]
fn unfinished_qc_holds_back_combined_workspace() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.combined_workspace(&cycle, Some(days_ago(1)));
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Writer, true);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::VerifiedShared);
    assert_eq!(result.severity, Severity::Verified);
    assert_eq!(result.note, upload::DCC_WRITERS_PAST_CYCLE_BEFORE_QC_COMPLETE);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::VerifiedNotMember);
    assert_eq!(result.note, upload::GREGOR_ALL_BEFORE_COMBINED);
}

#[test]
fn dcc_processed_workspace_before_combined_is_complete() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    consortium.combined_workspace(&cycle, None);
    let workspace = consortium.dcc_processed_workspace(&cycle);
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Writer, true);
    consortium.share(&workspace, workspace.auth_domain, AccessLevel::Reader, false);

    // A completed combined workspace of another cycle does not open this one.
    let other_cycle = consortium.past_cycle();
    consortium.combined_workspace(&other_cycle, Some(days_ago(3)));

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    assert!(
        report
            .iter()
            .all(|result| result.workspace_kind == WorkspaceKind::DccProcessedData)
    );
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::VerifiedShared);
    assert_eq!(
        result.note,
        dcc_processed::DCC_WRITERS_BEFORE_COMBINED_COMPLETE
    );
    let result = result_for(&report, workspace.auth_domain);
    assert_eq!(result.kind, OutcomeKind::VerifiedShared);
    assert_eq!(result.note, dcc_processed::AUTH_DOMAIN_AS_READER);
    assert_eq!(
        result_for(&report, consortium.dcc_members).kind,
        OutcomeKind::ShareAsReader
    );

    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Owner, true);
    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::ShareWithCompute);
    assert_eq!(result.severity, Severity::Error);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::VerifiedNotMember);
    assert_eq!(
        result.note,
        dcc_processed::GREGOR_ALL_BEFORE_COMBINED_COMPLETE
    );
    assert_eq!(
        result_for(&report, consortium.dcc_writers).kind,
        OutcomeKind::AddMember
    );
}

#[test]
fn dcc_processed_workspace_after_combined_is_complete() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    consortium.combined_workspace(&cycle, Some(days_ago(3)));
    let workspace = consortium.dcc_processed_workspace(&cycle);
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Writer, true);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::StopSharing);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(
        result.note,
        dcc_processed::DCC_WRITERS_AFTER_COMBINED_COMPLETE
    );
    let result = result_for(&report, workspace.auth_domain);
    assert_eq!(result.kind, OutcomeKind::ShareAsReader);
    assert_eq!(result.note, dcc_processed::AUTH_DOMAIN_AS_READER);
    assert_eq!(
        result_for(&report, consortium.consortium_all).kind,
        OutcomeKind::VerifiedNotShared
    );

    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Owner, true);
    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium.dcc_writers);
    assert_eq!(result.kind, OutcomeKind::StopSharing);
    assert_eq!(result.severity, Severity::Error);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    let result = result_for(&report, consortium.consortium_all);
    assert_eq!(result.kind, OutcomeKind::AddMember);
    assert_eq!(result.severity, Severity::NeedsAction);
    assert_eq!(
        result.note,
        dcc_processed::GREGOR_ALL_AFTER_COMBINED_COMPLETE
    );
    assert_eq!(
        result_for(&report, consortium.dcc_writers).kind,
        OutcomeKind::VerifiedNotMember
    );
}

#[test]
fn combined_workspace_is_shared_with_consortium_when_ready() {
    let consortium = TestConsortium::new();
    let cycle = consortium.past_cycle();
    let workspace = consortium.combined_workspace(&cycle, None);
    consortium.share(&workspace, consortium.dcc_writers, AccessLevel::Writer, true);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    assert_eq!(
        result_for(&report, consortium.dcc_writers).kind,
        OutcomeKind::VerifiedShared
    );
    assert_eq!(
        result_for(&report, consortium.consortium_all).kind,
        OutcomeKind::VerifiedNotShared
    );
    assert!(
        report
            .iter()
            .all(|result| result.workspace_kind == WorkspaceKind::CombinedConsortiumData)
    );
    assert!(
        report
            .iter()
            .all(|result| result.subject.group.id != consortium.rc_uploaders())
    );

    let consortium_after = TestConsortium::new();
    let cycle = consortium_after.past_cycle();
    let workspace = consortium_after.combined_workspace(&cycle, Some(days_ago(1)));
    let report = consortium_after
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = result_for(&report, consortium_after.consortium_all);
    assert_eq!(result.kind, OutcomeKind::ShareAsReader);
    assert_eq!(result.note, combined::GREGOR_ALL_AFTER);
}

#[test]
fn every_discovered_group_is_audited_once() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(None);
    let workspace = consortium.upload_workspace(&cycle, None);
    let stranger = consortium.group("SOMEONE_ELSE");
    consortium.share(&workspace, stranger, AccessLevel::Reader, false);
    consortium.add_member(&workspace, stranger, MembershipRole::Member);

    let auditor = consortium.auditor();

    let sharing = auditor
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    // Nine structural groups, the auth domain and the stranger.
    assert_eq!(sharing.len(), 11);
    let groups: BTreeSet<GroupId> = sharing.iter().map(|r| r.subject.group.id).collect();
    assert_eq!(groups.len(), sharing.len());
    assert!(groups.contains(&workspace.auth_domain));

    let result = result_for(&sharing, stranger);
    assert_eq!(result.subject.role, Role::Other);
    assert_eq!(result.kind, OutcomeKind::StopSharing);
    assert_eq!(result.severity, Severity::Error);

    let auth_domain = auditor
        .audit_workspace(workspace.id, AuditKind::AuthDomain)
        .unwrap();
    assert_eq!(auth_domain.len(), 10);
    let groups: BTreeSet<GroupId> = auth_domain.iter().map(|r| r.subject.group.id).collect();
    assert_eq!(groups.len(), auth_domain.len());
    assert!(!groups.contains(&workspace.auth_domain));
    assert_eq!(result_for(&auth_domain, stranger).kind, OutcomeKind::Remove);
}

#[test]
fn platform_groups_are_exempt() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(None);
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.share(&workspace, consortium.platform_admins, AccessLevel::Owner, true);

    let report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    for group in [consortium.platform_admins, consortium.platform_devs] {
        let result = result_for(&report, group);
        assert_eq!(result.kind, OutcomeKind::Exempt);
        assert_eq!(result.severity, Severity::Verified);
        assert_eq!(result.expected, None);
        assert_eq!(result.note, PLATFORM_GROUP_EXEMPT);
        assert_eq!(result.action, None);
    }
}

/// Consortium with findings in every kind of workspace.
fn drifted_consortium() -> TestConsortium {
    let consortium = TestConsortium::new();

    let current = consortium.current_cycle(Some(days_ago(3)));
    let upload = consortium.upload_workspace(&current, None);
    consortium.share(&upload, consortium.rc_uploaders(), AccessLevel::Writer, false);
    consortium.share(&upload, consortium.dcc_members, AccessLevel::Reader, false);
    consortium.add_member(&upload, consortium.dcc_admins, MembershipRole::Member);

    let past = consortium.past_cycle();
    let old_upload = consortium.upload_workspace(&past, Some(days_ago(40)));
    consortium.share(&old_upload, consortium.dcc_writers, AccessLevel::Owner, true);
    consortium.add_member(&old_upload, consortium.rc_members(), MembershipRole::Member);

    let combined = consortium.combined_workspace(&past, Some(days_ago(20)));
    consortium.share(&combined, consortium.dcc_members, AccessLevel::Reader, false);
    let stranger = consortium.group("SOMEONE_ELSE");
    consortium.share(&combined, stranger, AccessLevel::Writer, false);

    let processed = consortium.dcc_processed_workspace(&past);
    consortium.add_member(&processed, consortium.dcc_writers, MembershipRole::Admin);

    consortium
}

#[test]
fn run_all_merges_every_run() {
    let consortium = drifted_consortium();
    let auditor = consortium.auditor();

    let all = auditor.run_all().unwrap();
    let mut merged = AuditReport::new();
    for workspace_kind in WorkspaceKind::ALL {
        for audit_kind in AuditKind::ALL {
            merged.merge(auditor.run(workspace_kind, audit_kind).unwrap());
        }
    }
    assert_eq!(all, merged);
    assert_eq!(
        all.len(),
        all.verified().len() + all.needs_action().len() + all.errors().len()
    );
    assert!(!all.needs_action().is_empty());
    assert!(!all.errors().is_empty());

    assert_eq!(
        all.summary(),
        format!(
            "* Verified: {}\n* Needs action: {}\n* Errors: {}",
            all.verified().len(),
            all.needs_action().len(),
            all.errors().len()
        )
    );
    assert!(all.to_string().starts_with(&all.summary()));
}

#[test]
fn audits_are_deterministic() {
    let consortium = drifted_consortium();
    let first = consortium.auditor().run_all().unwrap();
    let second = consortium.auditor().run_all().unwrap();
    assert_eq!(first, second);
}

#[test]
fn remediation_converges_to_a_clean_audit() {
    setup_logging();
    let consortium = drifted_consortium();
    let platform = MockPlatform::new();

    let mut report = consortium.auditor().run_all().unwrap();
    let findings = report.needs_action().len() + report.errors().len();
    assert!(findings > 0);

    let remediated = report
        .handle_all(&consortium.store, &platform, true)
        .unwrap();
    assert_eq!(
        remediated,
        Remediated {
            changed: findings,
            unchanged: 0,
        }
    );
    assert_eq!(platform.calls().len(), findings);
    assert!(report.iter().filter(|r| r.action.is_some()).all(AuditResult::handled));

    let rerun = consortium.auditor().run_all().unwrap();
    assert!(rerun.ok(), "{}", rerun);

    // Handling the report again changes nothing.
    let remediated = report
        .handle_all(&consortium.store, &platform, true)
        .unwrap();
    assert_eq!(remediated, Remediated::default());
    assert_eq!(platform.calls().len(), findings);
}

#[test]
fn errors_are_only_remediated_on_request() {
    let consortium = drifted_consortium();
    let platform = MockPlatform::new();

    let mut report = consortium.auditor().run_all().unwrap();
    let remediated = report
        .handle_all(&consortium.store, &platform, false)
        .unwrap();
    assert_eq!(remediated.changed, report.needs_action().len());
    assert!(report.needs_action().iter().all(AuditResult::handled));
    assert!(report.errors().iter().all(|result| !result.handled()));

    let rerun = consortium.auditor().run_all().unwrap();
    assert!(rerun.needs_action().is_empty());
    assert_eq!(rerun.errors().len(), report.errors().len());
}

#[test]
fn failed_remediation_stays_unhandled() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(Some(days_ago(1)));
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.share(&workspace, consortium.rc_uploaders(), AccessLevel::Writer, false);

    let platform = MockPlatform::new();
    platform.fail_next(PlatformError::Transient("rate limited".into()));

    let mut report = consortium
        .auditor()
        .audit_workspace(workspace.id, AuditKind::Sharing)
        .unwrap();
    let result = report.handle_all(&consortium.store, &platform, true);
    assert_matches!(&result, Err(err) if err.is_transient());
    assert!(report.needs_action().iter().all(|result| !result.handled()));
    assert!(platform.calls().is_empty());

    let grant = consortium
        .store
        .sharing(workspace.id, consortium.rc_uploaders())
        .unwrap()
        .unwrap();
    assert!(!grant.can_compute);

    // Retrying picks up where the failed attempt stopped.
    let remediated = report
        .handle_all(&consortium.store, &platform, true)
        .unwrap();
    assert_eq!(remediated.changed, report.needs_action().len());
    assert!(platform.calls().contains(&PlatformCall::Share {
        workspace: workspace.id,
        group: consortium.rc_uploaders(),
        access: AccessLevel::Writer,
        can_compute: true,
    }));
}

#[test]
fn unknown_workspace_is_a_missing_record() {
    let consortium = TestConsortium::new();
    assert_matches!(
        consortium
            .auditor()
            .audit_workspace(WorkspaceId(404), AuditKind::Sharing),
        Err(AuditError::MissingRecord { kind: "audited workspace", .. })
    );
}

#[test]
fn dangling_research_center_aborts_the_run() {
    let consortium = TestConsortium::new();
    let cycle = consortium.current_cycle(None);
    let workspace = consortium.upload_workspace(&cycle, None);
    consortium.store.insert_upload_workspace(UploadWorkspace {
        workspace: workspace.id,
        research_center: ResearchCenterId(99),
        consent_group: "GRU".to_string(),
        upload_cycle: cycle.id,
        date_qc_completed: None,
    });

    assert_matches!(
        consortium.auditor().run(WorkspaceKind::Upload, AuditKind::Sharing),
        Err(AuditError::MissingRecord { kind: "research center", ref id, .. }) if id == "rc#99"
    );
}

#[test]
fn incomplete_policies_are_rejected() {
    let consortium = TestConsortium::new();
    let policies = Policies {
        combined_sharing: PolicyTable::new("empty"),
        ..Policies::default()
    };

    let error = Auditor::with_policies(
        &consortium.store,
        FixedClock(today()),
        consortium.config.clone(),
        policies,
    )
    .err();
    assert_matches!(
        error,
        Some(AuditError::PolicyGap(PolicyError::MissingRule {
            table: "empty",
            ..
        }))
    );
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_to_json() {
    let consortium = drifted_consortium();
    let report = consortium.auditor().run_all().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let needs_action = json["needs_action"].as_array().unwrap();
    assert_eq!(needs_action.len(), report.needs_action().len());
    assert!(needs_action[0]["subject"]["group"]["name"].is_string());
}

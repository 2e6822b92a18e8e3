// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs audits over the workspaces of the store.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use gregor_store::{AuditStore, GroupId, MembershipRole, Workspace, WorkspaceId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::Config;
use crate::discovery::{Subject, membership_subjects, sharing_subjects};
use crate::error::AuditError;
use crate::grant::{Grant, Sharing};
use crate::lifecycle::{Gate, Phase};
use crate::outcome::Severity;
use crate::policy::{Policies, PolicyKey, PolicyTable};
use crate::report::{AuditReport, AuditResult};
use crate::role::{ResearchCenterGroups, RoleMap, WellKnownGroups};
use crate::traits::Clock;

/// Kinds of workspaces with their own policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WorkspaceKind {
    Upload,
    CombinedConsortiumData,
    DccProcessedData,
}

impl WorkspaceKind {
    pub const ALL: [WorkspaceKind; 3] = [
        WorkspaceKind::Upload,
        WorkspaceKind::CombinedConsortiumData,
        WorkspaceKind::DccProcessedData,
    ];
}

impl Display for WorkspaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkspaceKind::Upload => "upload workspace",
            WorkspaceKind::CombinedConsortiumData => "combined consortium data workspace",
            WorkspaceKind::DccProcessedData => "DCC processed data workspace",
        };

        write!(f, "{}", s)
    }
}

/// What is audited about a workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuditKind {
    /// Direct sharing of the workspace with groups.
    Sharing,

    /// Membership of groups in the auth domain of the workspace.
    AuthDomain,
}

impl AuditKind {
    pub const ALL: [AuditKind; 2] = [AuditKind::Sharing, AuditKind::AuthDomain];
}

impl Display for AuditKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditKind::Sharing => "sharing",
            AuditKind::AuthDomain => "auth domain",
        };

        write!(f, "{}", s)
    }
}

/// State fixed for the duration of one run.
struct RunContext {
    today: NaiveDate,
    well_known: WellKnownGroups,
}

/// Audits the access to workspaces against the policies.
///
/// The auditor only reads from the store, remediating findings is done separately through the
/// returned [`AuditReport`].
#[derive(Debug)]
pub struct Auditor<'a, S, C> {
    store: &'a S,
    clock: C,
    config: Config,
    policies: Policies,
}

impl<'a, S, C> Auditor<'a, S, C>
where
    S: AuditStore,
    C: Clock,
{
    /// Create an auditor with the standard policies.
    pub fn new(store: &'a S, clock: C, config: Config) -> Result<Self, AuditError> {
        Self::with_policies(store, clock, config, Policies::default())
    }

    /// Create an auditor with custom policies.
    ///
    /// Fails if any policy table is incomplete.
    pub fn with_policies(
        store: &'a S,
        clock: C,
        config: Config,
        policies: Policies,
    ) -> Result<Self, AuditError> {
        policies.validate()?;

        Ok(Self {
            store,
            clock,
            config,
            policies,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Audit all workspaces of one kind.
    pub fn run(
        &self,
        workspace_kind: WorkspaceKind,
        audit_kind: AuditKind,
    ) -> Result<AuditReport, AuditError> {
        let context = self.context()?;
        let mut report = AuditReport::new();
        self.run_with(&context, workspace_kind, audit_kind, &mut report)?;
        Ok(report)
    }

    /// Audit sharing and auth domains of all workspaces of every kind.
    pub fn run_all(&self) -> Result<AuditReport, AuditError> {
        let context = self.context()?;
        let mut report = AuditReport::new();
        for workspace_kind in WorkspaceKind::ALL {
            for audit_kind in AuditKind::ALL {
                self.run_with(&context, workspace_kind, audit_kind, &mut report)?;
            }
        }
        Ok(report)
    }

    /// Audit a single workspace.
    pub fn audit_workspace(
        &self,
        workspace: WorkspaceId,
        audit_kind: AuditKind,
    ) -> Result<AuditReport, AuditError> {
        let workspace_kind = self.workspace_kind(workspace)?;
        let context = self.context()?;
        let mut report = AuditReport::new();
        self.audit_one(&context, workspace_kind, workspace, audit_kind, &mut report)?;
        Ok(report)
    }

    fn context(&self) -> Result<RunContext, AuditError> {
        Ok(RunContext {
            today: self.clock.today(),
            well_known: WellKnownGroups::resolve(&self.config, self.store)?,
        })
    }

    fn workspace_kind(&self, workspace: WorkspaceId) -> Result<WorkspaceKind, AuditError> {
        if self.store.upload_workspace(workspace)?.is_some() {
            Ok(WorkspaceKind::Upload)
        } else if self.store.combined_workspace(workspace)?.is_some() {
            Ok(WorkspaceKind::CombinedConsortiumData)
        } else if self.store.dcc_processed_workspace(workspace)?.is_some() {
            Ok(WorkspaceKind::DccProcessedData)
        } else {
            Err(AuditError::missing("audited workspace", workspace, "audit request"))
        }
    }

    fn run_with(
        &self,
        context: &RunContext,
        workspace_kind: WorkspaceKind,
        audit_kind: AuditKind,
        report: &mut AuditReport,
    ) -> Result<(), AuditError> {
        let workspaces: Vec<WorkspaceId> = match workspace_kind {
            WorkspaceKind::Upload => self
                .store
                .upload_workspaces()?
                .into_iter()
                .map(|upload| upload.workspace)
                .collect(),
            WorkspaceKind::CombinedConsortiumData => self
                .store
                .combined_workspaces()?
                .into_iter()
                .map(|combined| combined.workspace)
                .collect(),
            WorkspaceKind::DccProcessedData => self
                .store
                .dcc_processed_workspaces()?
                .into_iter()
                .map(|processed| processed.workspace)
                .collect(),
        };

        let mut run = AuditReport::new();
        for workspace in &workspaces {
            self.audit_one(context, workspace_kind, *workspace, audit_kind, &mut run)?;
        }

        info!(
            %workspace_kind,
            %audit_kind,
            workspaces = workspaces.len(),
            verified = run.verified().len(),
            needs_action = run.needs_action().len(),
            errors = run.errors().len(),
            "finished audit"
        );

        report.merge(run);
        Ok(())
    }

    fn audit_one(
        &self,
        context: &RunContext,
        workspace_kind: WorkspaceKind,
        id: WorkspaceId,
        audit_kind: AuditKind,
        report: &mut AuditReport,
    ) -> Result<(), AuditError> {
        let workspace = self
            .store
            .workspace(id)?
            .ok_or_else(|| AuditError::missing("workspace", id, workspace_kind))?;

        match workspace_kind {
            WorkspaceKind::Upload => {
                let upload = self
                    .store
                    .upload_workspace(id)?
                    .ok_or_else(|| AuditError::missing("upload workspace", id, &workspace))?;
                let cycle = self
                    .store
                    .upload_cycle(upload.upload_cycle)?
                    .ok_or_else(|| {
                        AuditError::missing("upload cycle", upload.upload_cycle, &workspace)
                    })?;
                let research_center = self
                    .store
                    .research_center(upload.research_center)?
                    .ok_or_else(|| {
                        AuditError::missing("research center", upload.research_center, &workspace)
                    })?;
                let combined_date_completed = self
                    .store
                    .combined_workspace_for_cycle(cycle.id)?
                    .and_then(|combined| combined.date_completed);

                let phase = Phase::resolve(
                    &cycle,
                    upload.date_qc_completed,
                    combined_date_completed,
                    context.today,
                );
                debug!(%workspace, %cycle, %phase, "resolved upload workspace phase");

                let roles = RoleMap::new(
                    workspace.auth_domain,
                    &context.well_known,
                    Some(ResearchCenterGroups::from(&research_center)),
                );
                let tables = (
                    &self.policies.upload_sharing,
                    &self.policies.upload_auth_domain,
                );
                self.audit_with(
                    &workspace,
                    workspace_kind,
                    audit_kind,
                    &roles,
                    tables,
                    phase,
                    report,
                )
            }
            WorkspaceKind::CombinedConsortiumData => {
                let combined = self
                    .store
                    .combined_workspace(id)?
                    .ok_or_else(|| AuditError::missing("combined workspace", id, &workspace))?;

                let gate = Gate::resolve(combined.date_completed);
                debug!(%workspace, %gate, "resolved combined workspace gate");

                let roles = RoleMap::new(workspace.auth_domain, &context.well_known, None);
                let tables = (
                    &self.policies.combined_sharing,
                    &self.policies.combined_auth_domain,
                );
                self.audit_with(
                    &workspace,
                    workspace_kind,
                    audit_kind,
                    &roles,
                    tables,
                    gate,
                    report,
                )
            }
            WorkspaceKind::DccProcessedData => {
                let processed = self.store.dcc_processed_workspace(id)?.ok_or_else(|| {
                    AuditError::missing("DCC processed data workspace", id, &workspace)
                })?;
                let combined_date_completed = self
                    .store
                    .combined_workspace_for_cycle(processed.upload_cycle)?
                    .and_then(|combined| combined.date_completed);

                let gate = Gate::resolve(combined_date_completed);
                debug!(%workspace, %gate, "resolved DCC processed data workspace gate");

                let roles = RoleMap::new(workspace.auth_domain, &context.well_known, None);
                let tables = (
                    &self.policies.dcc_processed_sharing,
                    &self.policies.dcc_processed_auth_domain,
                );
                self.audit_with(
                    &workspace,
                    workspace_kind,
                    audit_kind,
                    &roles,
                    tables,
                    gate,
                    report,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn audit_with<K: PolicyKey>(
        &self,
        workspace: &Workspace,
        workspace_kind: WorkspaceKind,
        audit_kind: AuditKind,
        roles: &RoleMap<'_>,
        (sharing, auth_domain): (
            &PolicyTable<K, Sharing>,
            &PolicyTable<K, MembershipRole>,
        ),
        key: K,
        report: &mut AuditReport,
    ) -> Result<(), AuditError> {
        match audit_kind {
            AuditKind::Sharing => {
                let observed: BTreeMap<GroupId, Sharing> = self
                    .store
                    .sharing_for_workspace(workspace.id)?
                    .iter()
                    .map(|grant| (grant.group, Sharing::from(grant)))
                    .collect();
                let subjects = sharing_subjects(self.store, roles, workspace.id, &observed)?;
                classify_subjects(
                    subjects,
                    &observed,
                    sharing,
                    key,
                    (workspace_kind, audit_kind),
                    report,
                )
            }
            AuditKind::AuthDomain => {
                let observed: BTreeMap<GroupId, MembershipRole> = self
                    .store
                    .memberships_of(workspace.auth_domain)?
                    .into_iter()
                    .map(|membership| (membership.child, membership.role))
                    .collect();
                let subjects = membership_subjects(self.store, roles, workspace.id, &observed)?;
                classify_subjects(
                    subjects,
                    &observed,
                    auth_domain,
                    key,
                    (workspace_kind, audit_kind),
                    report,
                )
            }
        }
    }
}

/// Classify every subject with the rule of its role, one result per subject.
fn classify_subjects<K: PolicyKey, G: Grant>(
    subjects: Vec<Subject>,
    observed: &BTreeMap<GroupId, G>,
    table: &PolicyTable<K, G>,
    key: K,
    (workspace_kind, audit_kind): (WorkspaceKind, AuditKind),
    report: &mut AuditReport,
) -> Result<(), AuditError> {
    for subject in subjects {
        let rule = table.get(subject.role, key)?;
        let observed = observed.get(&subject.group.id);
        let classification = classify(&subject, observed, rule);

        if classification.severity == Severity::Error {
            warn!(
                workspace = %subject.workspace,
                group = %subject.group.name,
                role = %subject.role,
                outcome = %classification.kind,
                "unexpected access"
            );
        } else {
            debug!(
                workspace = %subject.workspace,
                group = %subject.group.name,
                role = %subject.role,
                outcome = %classification.kind,
                "classified subject"
            );
        }

        report.push(AuditResult::new(
            subject,
            workspace_kind,
            audit_kind,
            G::state(observed),
            classification,
        ));
    }

    Ok(())
}

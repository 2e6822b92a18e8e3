// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::Cell;

use chrono::{Days, NaiveDate};
use gregor_store::{
    AccessLevel, CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupId,
    ManagedGroup, Membership, MembershipRole, MembershipStore, MemoryStore, ResearchCenter,
    ResearchCenterId, SharingGrant, SharingStore, UploadCycle, UploadWorkspace, Workspace,
    WorkspaceId,
};

use crate::audit::Auditor;
use crate::config::Config;
use crate::traits::FixedClock;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Date all fixtures are audited at unless stated otherwise.
pub fn today() -> NaiveDate {
    date(2024, 6, 15)
}

pub fn days_ago(days: u64) -> NaiveDate {
    today()
        .checked_sub_days(Days::new(days))
        .expect("date in range")
}

pub fn days_ahead(days: u64) -> NaiveDate {
    today()
        .checked_add_days(Days::new(days))
        .expect("date in range")
}

/// In-memory consortium with the well-known groups and one research center.
///
/// Groups, workspaces and cycles get fresh ids from counters, auth domains are created together
/// with their workspace.
#[derive(Debug)]
pub struct TestConsortium {
    pub store: MemoryStore,
    pub config: Config,
    pub dcc_admins: GroupId,
    pub dcc_writers: GroupId,
    pub dcc_members: GroupId,
    pub consortium_all: GroupId,
    pub platform_admins: GroupId,
    pub platform_devs: GroupId,
    pub research_center: ResearchCenter,
    next_group: Cell<u64>,
    next_workspace: Cell<u64>,
    next_cycle: Cell<u64>,
}

impl TestConsortium {
    pub fn new() -> Self {
        let config = Config::default();
        let mut consortium = Self {
            store: MemoryStore::new(),
            config: config.clone(),
            dcc_admins: GroupId(0),
            dcc_writers: GroupId(0),
            dcc_members: GroupId(0),
            consortium_all: GroupId(0),
            platform_admins: GroupId(0),
            platform_devs: GroupId(0),
            research_center: ResearchCenter {
                id: ResearchCenterId(1),
                short_name: "RC1".to_string(),
                uploader_group: None,
                member_group: None,
                non_member_group: None,
            },
            next_group: Cell::new(1),
            next_workspace: Cell::new(1),
            next_cycle: Cell::new(1),
        };

        consortium.dcc_admins = consortium.group(&config.dcc_admins_group);
        consortium.dcc_writers = consortium.group(&config.dcc_writers_group);
        consortium.dcc_members = consortium.group(&config.dcc_members_group);
        consortium.consortium_all = consortium.group(&config.consortium_all_group);
        consortium.platform_admins = consortium.group(&config.platform_admins_group);
        consortium.platform_devs = consortium.group(&config.platform_devs_group);

        consortium.research_center.uploader_group = Some(consortium.group("RC1_UPLOADERS"));
        consortium.research_center.member_group = Some(consortium.group("RC1_MEMBERS"));
        consortium.research_center.non_member_group = Some(consortium.group("RC1_NONMEMBERS"));
        consortium
            .store
            .insert_research_center(consortium.research_center.clone());

        consortium
    }

    pub fn rc_uploaders(&self) -> GroupId {
        self.research_center
            .uploader_group
            .expect("fixture has uploader group")
    }

    pub fn rc_members(&self) -> GroupId {
        self.research_center
            .member_group
            .expect("fixture has member group")
    }

    pub fn rc_non_members(&self) -> GroupId {
        self.research_center
            .non_member_group
            .expect("fixture has non-member group")
    }

    /// Auditor for the fixture date.
    pub fn auditor(&self) -> Auditor<'_, MemoryStore, FixedClock> {
        self.auditor_at(today())
    }

    pub fn auditor_at(&self, today: NaiveDate) -> Auditor<'_, MemoryStore, FixedClock> {
        Auditor::new(&self.store, FixedClock(today), self.config.clone())
            .expect("standard policies are complete")
    }

    /// Create a group with the given name.
    pub fn group(&self, name: &str) -> GroupId {
        let id = GroupId(self.next_group.get());
        self.next_group.set(id.0 + 1);
        self.store.insert_group(ManagedGroup::new(id, name));
        id
    }

    /// Create a workspace together with its auth domain.
    fn workspace(&self, name: &str) -> Workspace {
        let id = WorkspaceId(self.next_workspace.get());
        self.next_workspace.set(id.0 + 1);

        let auth_domain = self.group(&format!("AUTH_{}", name));
        let workspace = Workspace {
            id,
            billing_project: "gregor".to_string(),
            name: name.to_string(),
            auth_domain,
        };
        self.store.insert_workspace(workspace.clone());
        workspace
    }

    pub fn upload_cycle(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        date_ready_for_compute: Option<NaiveDate>,
    ) -> UploadCycle {
        let id = self.next_cycle.get();
        self.next_cycle.set(id + 1);

        let mut cycle = UploadCycle::new(id, id as u32, start_date, end_date)
            .expect("valid upload cycle dates");
        cycle.date_ready_for_compute = date_ready_for_compute;
        self.store.insert_upload_cycle(cycle.clone());
        cycle
    }

    /// Cycle starting tomorrow.
    pub fn future_cycle(&self) -> UploadCycle {
        self.upload_cycle(days_ahead(1), days_ahead(90), None)
    }

    /// Running cycle, compute enabled if a date is given.
    pub fn current_cycle(&self, date_ready_for_compute: Option<NaiveDate>) -> UploadCycle {
        self.upload_cycle(days_ago(30), days_ahead(30), date_ready_for_compute)
    }

    /// Cycle which ended a month ago.
    pub fn past_cycle(&self) -> UploadCycle {
        self.upload_cycle(days_ago(120), days_ago(30), Some(days_ago(90)))
    }

    pub fn upload_workspace(
        &self,
        cycle: &UploadCycle,
        date_qc_completed: Option<NaiveDate>,
    ) -> Workspace {
        let workspace = self.workspace(&format!("RC1_{}_GRU", cycle));
        self.store.insert_upload_workspace(UploadWorkspace {
            workspace: workspace.id,
            research_center: self.research_center.id,
            consent_group: "GRU".to_string(),
            upload_cycle: cycle.id,
            date_qc_completed,
        });
        workspace
    }

    pub fn combined_workspace(
        &self,
        cycle: &UploadCycle,
        date_completed: Option<NaiveDate>,
    ) -> Workspace {
        let workspace = self.workspace(&format!("{}_COMBINED", cycle));
        self.store
            .insert_combined_workspace(CombinedConsortiumDataWorkspace {
                workspace: workspace.id,
                upload_cycle: cycle.id,
                date_completed,
            });
        workspace
    }

    pub fn dcc_processed_workspace(&self, cycle: &UploadCycle) -> Workspace {
        let workspace = self.workspace(&format!("{}_DCC_PROCESSED_GRU", cycle));
        self.store
            .insert_dcc_processed_workspace(DccProcessedDataWorkspace {
                workspace: workspace.id,
                upload_cycle: cycle.id,
                consent_group: "GRU".to_string(),
            });
        workspace
    }

    pub fn share(
        &self,
        workspace: &Workspace,
        group: GroupId,
        access: AccessLevel,
        can_compute: bool,
    ) {
        self.store
            .set_sharing(SharingGrant {
                workspace: workspace.id,
                group,
                access,
                can_compute,
            })
            .expect("memory store accepts grants");
    }

    pub fn add_member(&self, workspace: &Workspace, child: GroupId, role: MembershipRole) {
        self.store
            .set_membership(Membership {
                parent: workspace.auth_domain,
                child,
                role,
            })
            .expect("memory store accepts memberships");
    }
}

impl Default for TestConsortium {
    fn default() -> Self {
        Self::new()
    }
}

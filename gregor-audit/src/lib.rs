// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audits and remediates access to the data workspaces of a research consortium.
//!
//! Research centers upload data into per-cycle upload workspaces. Which groups may read, write or
//! compute on a workspace, and which groups are members of its auth domain, changes over the life
//! of an upload cycle: uploaders write while their cycle runs, the DCC keeps write access until
//! quality control is done and once the combined workspace of the cycle is ready the consortium as
//! a whole gets read access.
//!
//! ## Audits
//!
//! An [`Auditor`] resolves the lifecycle [`Phase`] (or [`Gate`] for combined and DCC processed
//! data workspaces) of every workspace for the current date, discovers the groups to audit and
//! assigns each of them a [`Role`]. Every subject is classified against the rule its role has in
//! the [`policy`] tables:
//!
//! - verified: the observed access is what the policy expects
//! - needs action: the access drifted, for example because the phase advanced
//! - error: the group holds more access than it could ever legitimately have
//!
//! Policy tables are checked for completeness when the auditor is created. A missing rule is a
//! programming error and fails with [`AuditError::PolicyGap`] instead of defaulting to "no
//! access".
//!
//! ## Remediation
//!
//! Findings carry an [`Action`] which converges the local record and the remote [`Platform`]. An
//! action is applied inside a store transaction and rolled back when the platform call fails, so a
//! remediation is never applied partially. Actions are idempotent and can be retried.
//!
//! ```ignore
//! let auditor = Auditor::new(&store, SystemClock, Config::default())?;
//! let mut report = auditor.run_all()?;
//! println!("{}", report.summary());
//!
//! report.handle_all(&store, &platform, false)?;
//! ```
mod audit;
mod classify;
mod config;
mod discovery;
mod error;
mod grant;
mod lifecycle;
mod outcome;
pub mod policy;
mod remediation;
mod report;
mod role;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;
pub mod traits;

pub use audit::{AuditKind, Auditor, WorkspaceKind};
pub use classify::{Classification, classify};
pub use config::Config;
pub use discovery::{Subject, membership_subjects, sharing_subjects};
pub use error::AuditError;
pub use grant::{Grant, Sharing};
pub use lifecycle::{Gate, Phase};
pub use outcome::{AccessState, Action, OutcomeKind, Severity};
pub use policy::{Policies, PolicyError, PolicyKey, PolicyTable, Rule};
pub use remediation::{Applied, RemediationError};
pub use report::{AuditReport, AuditResult, Remediated};
pub use role::{ResearchCenterGroups, Role, RoleMap, WellKnownGroups};
pub use traits::{Clock, FixedClock, Platform, PlatformError, SystemClock};

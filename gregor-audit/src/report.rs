// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results of an audit run.
use std::fmt::{Display, Formatter};

use gregor_store::AuditStore;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::warn;

use crate::audit::{AuditKind, WorkspaceKind};
use crate::classify::Classification;
use crate::discovery::Subject;
use crate::outcome::{AccessState, Action, OutcomeKind, Severity};
use crate::remediation::{Applied, RemediationError};
use crate::traits::Platform;

/// Classification of one subject at the time of the audit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AuditResult {
    pub subject: Subject,
    pub workspace_kind: WorkspaceKind,
    pub audit_kind: AuditKind,
    pub observed: AccessState,

    /// Expected state, `None` for exempt subjects.
    pub expected: Option<AccessState>,

    pub kind: OutcomeKind,
    pub severity: Severity,
    pub note: &'static str,
    pub action: Option<Action>,
    handled: bool,
}

impl AuditResult {
    pub(crate) fn new(
        subject: Subject,
        workspace_kind: WorkspaceKind,
        audit_kind: AuditKind,
        observed: AccessState,
        classification: Classification,
    ) -> Self {
        Self {
            subject,
            workspace_kind,
            audit_kind,
            observed,
            expected: classification.expected,
            kind: classification.kind,
            severity: classification.severity,
            note: classification.note,
            action: classification.action,
            handled: false,
        }
    }

    /// Returns true once the remediation of this result was applied.
    pub fn handled(&self) -> bool {
        self.handled
    }

    /// Apply the remediation of this result.
    ///
    /// Results without an action and results which were already handled are left untouched. When
    /// the remediation fails the result stays unhandled and can be retried.
    pub fn handle<S, P>(&mut self, store: &S, platform: &P) -> Result<Applied, RemediationError>
    where
        S: AuditStore,
        P: Platform,
    {
        if self.handled {
            return Ok(Applied::Unchanged);
        }

        let Some(action) = &self.action else {
            return Ok(Applied::Unchanged);
        };

        let applied = action.apply(store, platform).inspect_err(|err| {
            warn!(
                workspace = %self.subject.workspace,
                group = %self.subject.group.name,
                %action,
                %err,
                "remediation failed"
            );
        })?;

        self.handled = true;
        Ok(applied)
    }
}

impl Display for AuditResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.note)
    }
}

/// Number of remediations applied by [`AuditReport::handle_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Remediated {
    /// Actions which changed local and remote state.
    pub changed: usize,

    /// Actions whose target state already held.
    pub unchanged: usize,
}

/// Results of an audit run, sorted into verified results, needs-action results and errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AuditReport {
    verified: Vec<AuditResult>,
    needs_action: Vec<AuditResult>,
    errors: Vec<AuditResult>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: AuditResult) {
        match result.severity {
            Severity::Verified => self.verified.push(result),
            Severity::NeedsAction => self.needs_action.push(result),
            Severity::Error => self.errors.push(result),
        }
    }

    pub fn verified(&self) -> &[AuditResult] {
        &self.verified
    }

    pub fn needs_action(&self) -> &[AuditResult] {
        &self.needs_action
    }

    pub fn errors(&self) -> &[AuditResult] {
        &self.errors
    }

    /// Returns true when nothing needs action and no errors were found.
    pub fn ok(&self) -> bool {
        self.needs_action.is_empty() && self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.verified.len() + self.needs_action.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All results, verified results first.
    pub fn iter(&self) -> impl Iterator<Item = &AuditResult> {
        self.verified
            .iter()
            .chain(self.needs_action.iter())
            .chain(self.errors.iter())
    }

    /// Append the results of another run.
    pub fn merge(&mut self, other: AuditReport) {
        self.verified.extend(other.verified);
        self.needs_action.extend(other.needs_action);
        self.errors.extend(other.errors);
    }

    /// Short plain-text summary of the result counts.
    pub fn summary(&self) -> String {
        format!(
            "* Verified: {}\n* Needs action: {}\n* Errors: {}",
            self.verified.len(),
            self.needs_action.len(),
            self.errors.len()
        )
    }

    /// Apply the remediation of every result which needs action, and of errors too if requested.
    ///
    /// Stops at the first failure. Results remediated so far stay handled, so calling this again
    /// continues where it stopped.
    pub fn handle_all<S, P>(
        &mut self,
        store: &S,
        platform: &P,
        include_errors: bool,
    ) -> Result<Remediated, RemediationError>
    where
        S: AuditStore,
        P: Platform,
    {
        let mut remediated = Remediated::default();

        let errors: &mut [AuditResult] = if include_errors {
            &mut self.errors
        } else {
            &mut []
        };

        for result in self.needs_action.iter_mut().chain(errors.iter_mut()) {
            if result.handled() {
                continue;
            }

            match result.handle(store, platform)? {
                Applied::Changed => remediated.changed += 1,
                Applied::Unchanged => remediated.unchanged += 1,
            }
        }

        Ok(remediated)
    }
}

impl Display for AuditReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for result in self.needs_action.iter().chain(self.errors.iter()) {
            writeln!(
                f,
                "{} / {}: {}",
                result.subject.workspace, result.subject.group.name, result
            )?;
        }
        Ok(())
    }
}

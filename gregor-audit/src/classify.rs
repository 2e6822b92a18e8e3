// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compares the observed state of a subject with the rule of its role.
use crate::discovery::Subject;
use crate::grant::Grant;
use crate::outcome::{AccessState, Action, OutcomeKind, Severity};
use crate::policy::Rule;

/// Result of classifying one subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub kind: OutcomeKind,
    pub severity: Severity,

    /// Expected state, `None` for exempt subjects.
    pub expected: Option<AccessState>,

    pub note: &'static str,

    /// Action converging the subject to the expected state, only set for findings.
    pub action: Option<Action>,
}

/// Classify the observed state of a subject against a rule.
///
/// A mismatch is routine drift unless the subject holds access above the ceiling of the rule, in
/// which case it is an error.
pub fn classify<G: Grant>(
    subject: &Subject,
    observed: Option<&G>,
    rule: &Rule<G>,
) -> Classification {
    let (expected, ceiling, note) = match rule {
        Rule::Exempt { note } => {
            return Classification {
                kind: OutcomeKind::Exempt,
                severity: Severity::Verified,
                expected: None,
                note: *note,
                action: None,
            };
        }
        Rule::Expect {
            expected,
            ceiling,
            note,
        } => (expected.as_ref(), *ceiling, *note),
    };

    let verified = match (observed, expected) {
        (Some(observed), Some(expected)) => observed.satisfies(expected),
        (None, None) => true,
        _ => false,
    };

    if verified {
        return Classification {
            kind: G::verified(expected),
            severity: Severity::Verified,
            expected: Some(G::state(expected)),
            note,
            action: None,
        };
    }

    let kind = match expected {
        Some(expected) => G::converge(observed, expected),
        None => G::revoke(),
    };

    let severity = if escalated(observed, ceiling) {
        Severity::Error
    } else {
        Severity::NeedsAction
    };

    Classification {
        kind,
        severity,
        expected: Some(G::state(expected)),
        note,
        action: Some(G::action(subject, expected)),
    }
}

/// Returns true when the observed access exceeds what the role may ever hold.
fn escalated<G: Grant>(observed: Option<&G>, ceiling: Option<G::Level>) -> bool {
    match (observed, ceiling) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(observed), Some(ceiling)) => observed.level() > ceiling,
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use gregor_store::StoreError;
use thiserror::Error;

use crate::policy::PolicyError;

/// Errors aborting an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Policy tables do not define a rule for an observed case. This is a programming error and
    /// never defaulted.
    #[error(transparent)]
    PolicyGap(#[from] PolicyError),

    #[error("{kind} {id} referenced by {referenced_by} does not exist")]
    MissingRecord {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuditError {
    pub(crate) fn missing(
        kind: &'static str,
        id: impl ToString,
        referenced_by: impl ToString,
    ) -> Self {
        Self::MissingRecord {
            kind,
            id: id.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }
}

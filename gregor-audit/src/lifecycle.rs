// SPDX-License-Identifier: MIT OR Apache-2.0

//! Position of workspaces on the upload lifecycle.
//!
//! Upload workspaces move through six phases derived from the dates of their upload cycle, their
//! quality control and the combined workspace of their cycle. Combined and DCC processed data
//! workspaces only distinguish whether the combined data of their cycle is ready.
//!
//! For a fixed workspace the resolved phase never moves backwards when the audit date advances.
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gregor_store::UploadCycle;

/// Phase of an upload workspace, in the order they are passed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// The upload cycle did not start yet.
    Future,

    /// The upload cycle is running and compute was not enabled yet.
    CurrentBeforeCompute,

    /// The upload cycle is running and uploaders may run compute.
    CurrentAfterCompute,

    /// The upload cycle ended and the DCC did not finish quality control yet.
    PastBeforeQc,

    PastAfterQcNotCombined,

    /// The combined workspace of the cycle is complete.
    PastAfterQcCombinedReady,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Future,
        Phase::CurrentBeforeCompute,
        Phase::CurrentAfterCompute,
        Phase::PastBeforeQc,
        Phase::PastAfterQcNotCombined,
        Phase::PastAfterQcCombinedReady,
    ];

    /// Resolve the phase of an upload workspace at the given date.
    ///
    /// Compute is enabled once `date_ready_for_compute` is reached. Quality control and the
    /// combined workspace count as done as soon as their completion date is set, and the combined
    /// workspace is only considered once quality control is done.
    pub fn resolve(
        cycle: &UploadCycle,
        date_qc_completed: Option<NaiveDate>,
        combined_date_completed: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if today < cycle.start_date {
            return Phase::Future;
        }

        if today <= cycle.end_date {
            return if reached(cycle.date_ready_for_compute, today) {
                Phase::CurrentAfterCompute
            } else {
                Phase::CurrentBeforeCompute
            };
        }

        if date_qc_completed.is_none() {
            Phase::PastBeforeQc
        } else if combined_date_completed.is_some() {
            Phase::PastAfterQcCombinedReady
        } else {
            Phase::PastAfterQcNotCombined
        }
    }

    /// Coarse view on this phase, distinguishing only whether the combined data is ready.
    pub fn gate(&self) -> Gate {
        match self {
            Phase::PastAfterQcCombinedReady => Gate::CombinedReady,
            _ => Gate::NotCombined,
        }
    }

    pub fn is_future(&self) -> bool {
        matches!(self, Phase::Future)
    }

    pub fn is_current(&self) -> bool {
        matches!(
            self,
            Phase::CurrentBeforeCompute | Phase::CurrentAfterCompute
        )
    }

    pub fn is_past(&self) -> bool {
        !self.is_future() && !self.is_current()
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Future => "future",
            Phase::CurrentBeforeCompute => "current, before compute",
            Phase::CurrentAfterCompute => "current, after compute",
            Phase::PastBeforeQc => "past, before QC",
            Phase::PastAfterQcNotCombined => "past, after QC, not combined",
            Phase::PastAfterQcCombinedReady => "past, after QC, combined ready",
        };

        write!(f, "{}", s)
    }
}

/// Readiness of the combined data of an upload cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Gate {
    NotCombined,
    CombinedReady,
}

impl Gate {
    pub const ALL: [Gate; 2] = [Gate::NotCombined, Gate::CombinedReady];

    /// Resolve the gate from the completion date of a combined workspace.
    ///
    /// Cycles without a combined workspace pass `None` and are never ready, a set completion date
    /// marks the combined workspace as complete.
    pub fn resolve(combined_date_completed: Option<NaiveDate>) -> Self {
        if combined_date_completed.is_some() {
            Gate::CombinedReady
        } else {
            Gate::NotCombined
        }
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Gate::NotCombined => "not combined",
            Gate::CombinedReady => "combined ready",
        };

        write!(f, "{}", s)
    }
}

/// Returns true when the date is set and not after `today`.
pub fn reached(date: Option<NaiveDate>, today: NaiveDate) -> bool {
    date.is_some_and(|date| date <= today)
}

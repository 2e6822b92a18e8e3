// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{Local, NaiveDate};

/// Source of the current date.
///
/// The audit reads the clock exactly once per run, all workspaces of a run are audited against the
/// same date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local date of the machine running the audit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at a given date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<T: Clock> Clock for &T {
    fn today(&self) -> NaiveDate {
        (*self).today()
    }
}

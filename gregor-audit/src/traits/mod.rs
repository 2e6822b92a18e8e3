// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces to the world outside of the audit engine.
mod clock;
mod platform;

pub use clock::{Clock, FixedClock, SystemClock};
pub use platform::{Platform, PlatformError};

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures and doubles for testing audits.
mod consortium;
mod platform;

pub use consortium::{TestConsortium, date, days_ago, days_ahead, today};
pub use platform::{MockPlatform, PlatformCall};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

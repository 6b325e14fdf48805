//! Test utilities for Outpost.
//!
//! [`MemoryRouter`] stands in for the host router; [`helpers`] has
//! canned handlers and loaders.

pub mod helpers;
pub mod router;

pub use helpers::CallLog;
pub use router::{MAX_REDIRECTS, MemoryRouter, Navigation};

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

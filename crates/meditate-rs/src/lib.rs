//! Public surface for the meditation generation service.
//!
//! This crate re-exports the building blocks and wires them into a running
//! service from a loaded configuration.

/// Re-export for convenience.
pub use meditate_rs_config as config;
pub use meditate_rs_core as core;
/// Re-export for convenience.
pub use meditate_rs_protocol as protocol;
pub use meditate_rs_server as server;

mod app;

pub use app::{AppError, build_state, open_store};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Binaries call this once at startup; `RUST_LOG` controls the filter.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}

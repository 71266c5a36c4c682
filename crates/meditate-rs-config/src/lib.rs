//! Configuration models, loading, and credential discovery.
//!
//! This crate owns the meditation service config schema, its validation, and
//! the environment overlay applied once at process start. The resulting
//! values are immutable and handed explicitly to every client component.

mod credentials;
mod error;
mod loader;
mod model;

/// Provider credentials resolved at startup.
pub use credentials::{Credentials, Secret};
/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Environment variable names consumed by the loader.
pub use loader::env_keys;
/// Configuration schema models.
pub use model::*;

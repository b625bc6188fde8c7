//! Unified error types for the FraiseQL-RS engine crates.
//!
//! `fraiseql-core` and `fraiseql-wire` both depend on this crate so that a
//! compilation failure, a dialect limitation, and a driver error all surface
//! through the same [`FraiseQLError`] enum.

// Error variants and fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

mod config;
mod engine;

pub use config::ConfigError;
pub use engine::{FraiseQLError, Result};

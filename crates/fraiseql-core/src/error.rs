//! Error types used throughout the compilation and execution engine.
//!
//! This module re-exports [`fraiseql_error`]'s unified error enum so the
//! rest of the crate can write `crate::error::{Error, Result}` without
//! depending on the upstream crate name directly.

pub use fraiseql_error::{FraiseQLError as Error, Result};

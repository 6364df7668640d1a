// packages/routing/src/utils/mod.rs
//! Common utilities
//!
//! - **config**: Settings loading (defaults, files, environment)
//! - **errors**: Crate-wide error type

pub mod config;
pub mod errors;

pub use self::config::RoutingSettings;
pub use self::errors::{Result, RoutingError};

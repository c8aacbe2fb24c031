//! Ensemble core library — domain types, deployment constants, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, mode/kind enums, outcome and metadata records
//! - [`config`] — deployment constants and path helpers
//! - [`error`] — [`CoreError`]

pub mod config;
pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{
    Component, ComponentKind, ComponentName, ComponentOutcome, ComponentRecord, DeployMode,
    DeployOutcome, MergeStats, Metadata,
};

/// Version tag recorded in deployment metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

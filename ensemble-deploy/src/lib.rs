//! # ensemble-deploy
//!
//! Source acquisition, manifest preview, three-way reconciliation and
//! deployment orchestration.
//!
//! Call [`SourceTree::acquire`] to obtain a source tree handle, then
//! [`deploy`](deployer::deploy) to reconcile the requested components into a
//! target project and persist the metadata record.

pub mod checksum;
pub mod deployer;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod reconcile;
pub mod source;

pub use deployer::deploy;
pub use error::DeployError;
pub use manifest::Manifest;
pub use source::SourceTree;

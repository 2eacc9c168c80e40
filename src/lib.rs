//! repo-sync - keep shared files synchronized across repositories
//!
//! Copies a manifest-selected subset of a local directory tree into a path
//! inside a GitHub repository and opens a pull request with the result.
//!
//! The pipeline has three phases (see [`submit`]):
//! 1. Selection - scan the source tree and apply the include manifest
//! 2. Reconciliation - diff the selection against the remote destination
//! 3. Submission - create a branch, apply file operations, open a PR

pub mod auth;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod scan;
pub mod submit;
pub mod types;

pub use error::{Error, Result};
pub use submit::synchronize;

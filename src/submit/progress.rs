//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, tests, services) to receive
//! progress updates during a synchronization run.

use crate::error::Error;
use crate::types::PullRequest;
use async_trait::async_trait;
use std::fmt;

/// Synchronization phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Walking the source tree and applying the manifest
    Scanning,
    /// Reading the destination subtree and computing operations
    Planning,
    /// Creating or resetting the working branch
    CreatingBranch,
    /// Writing and deleting files on the working branch
    ApplyingFiles,
    /// Opening the pull request
    OpeningPr,
    /// Run complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scanning => "Scanning source tree",
            Self::Planning => "Planning changes",
            Self::CreatingBranch => "Creating branch",
            Self::ApplyingFiles => "Applying files",
            Self::OpeningPr => "Opening pull request",
            Self::Complete => "Done",
        };
        f.write_str(s)
    }
}

/// Kind of file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// New file
    Create,
    /// Overwrite existing file
    Update,
    /// Remove file
    Delete,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Outcome of one file operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    /// Operation committed
    Success,
    /// Operation failed with error message
    Failed(String),
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("done"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during synchronization.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called once the working branch exists
    async fn on_branch_ready(&self, branch: &str, reused: bool);

    /// Called after each file operation
    async fn on_file_applied(&self, action: FileAction, path: &str, status: &ApplyStatus);

    /// Called when the PR is opened (or an open one is reused)
    async fn on_pr_ready(&self, pr: &PullRequest, reused: bool);

    /// Called when an error occurs (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_branch_ready(&self, _branch: &str, _reused: bool) {}
    async fn on_file_applied(&self, _action: FileAction, _path: &str, _status: &ApplyStatus) {}
    async fn on_pr_ready(&self, _pr: &PullRequest, _reused: bool) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}

//! Hosting platform services
//!
//! Provides the remote capabilities the synchronization engine needs.

mod factory;
mod github;

pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{PlatformConfig, PullRequest, RemoteFile};
use async_trait::async_trait;

/// Platform service trait for branch, file and PR operations
///
/// Every method is one remote round trip. Implementations never retry.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Name of the repository's default branch
    async fn default_branch(&self) -> Result<String>;

    /// Head commit SHA of a branch, or None if it doesn't exist
    async fn branch_head(&self, branch: &str) -> Result<Option<String>>;

    /// Create a branch pointing at `sha`
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// Force-move an existing branch to `sha`
    async fn reset_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// List blobs under `dir` in the tree of `commit` (empty `dir` = whole tree)
    async fn list_files(&self, commit: &str, dir: &str) -> Result<Vec<RemoteFile>>;

    /// Create or overwrite a file with one commit
    ///
    /// `previous_sha` must be the current blob SHA when overwriting.
    async fn write_file(
        &self,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
        previous_sha: Option<&str>,
    ) -> Result<()>;

    /// Remove a file with one commit
    async fn delete_file(&self, branch: &str, path: &str, sha: &str, message: &str)
    -> Result<()>;

    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Open a pull request
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str)
    -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

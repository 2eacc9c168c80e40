//! Core types for repo-sync

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::scan::blob_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Branch name used when none is given
pub const DEFAULT_BRANCH_NAME: &str = "sync/file-sync";

/// A file selected from the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// POSIX-style path relative to the source directory
    pub path: String,
    /// File bytes
    pub content: Vec<u8>,
    /// Git blob id of `content`
    pub blob_id: String,
}

impl FileEntry {
    /// Create an entry, hashing its content
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        let blob_id = blob_id(&content);
        Self {
            path: path.into(),
            content,
            blob_id,
        }
    }
}

/// A blob on the remote branch, as reported by the hosting API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Full repository path
    pub path: String,
    /// Git blob SHA
    pub sha: String,
}

/// Snapshot of the files under the destination root on the remote branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationState {
    /// Destination root (normalized, no leading/trailing slash; empty = repo root)
    pub root: String,
    /// Destination-relative path -> blob SHA
    pub files: BTreeMap<String, String>,
}

impl DestinationState {
    /// Build a snapshot from remote files, keeping only those below `root`
    pub fn from_remote(root: &str, remote: impl IntoIterator<Item = RemoteFile>) -> Self {
        let root = normalize_repo_path(root);
        let files = remote
            .into_iter()
            .filter_map(|f| {
                let rel = if root.is_empty() {
                    Some(f.path.as_str())
                } else {
                    f.path
                        .strip_prefix(root.as_str())
                        .and_then(|rest| rest.strip_prefix('/'))
                };
                rel.filter(|r| !r.is_empty())
                    .map(|r| (r.to_string(), f.sha.clone()))
            })
            .collect();
        Self { root, files }
    }

    /// Full repository path for a destination-relative path
    pub fn repo_path(&self, relative: &str) -> String {
        join_repo_path(&self.root, relative)
    }
}

/// A file write (create or update) to apply on the working branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    /// Full repository path
    pub path: String,
    /// New content
    pub content: Vec<u8>,
    /// Blob id of `content`
    pub blob_id: String,
    /// Blob SHA currently on the remote (None for creations)
    pub previous_sha: Option<String>,
}

/// A file removal to apply on the working branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRemoval {
    /// Full repository path
    pub path: String,
    /// Blob SHA currently on the remote
    pub sha: String,
}

/// Operations needed to converge the destination subtree
///
/// Every path appears in at most one of the three lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Paths absent from the destination
    pub to_create: Vec<FileWrite>,
    /// Paths present with different content
    pub to_update: Vec<FileWrite>,
    /// Paths present with no surviving source (clean mode only)
    pub to_delete: Vec<FileRemoval>,
}

impl ChangeSet {
    /// No operations scheduled
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of operations
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    /// Paths of every scheduled operation
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.to_create
            .iter()
            .chain(&self.to_update)
            .map(|w| w.path.as_str())
            .chain(self.to_delete.iter().map(|r| r.path.as_str()))
    }
}

/// How the working branch is named
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchStrategy {
    /// Reuse this name, force-resetting it to the default branch head
    Fixed(String),
    /// Append a random suffix to this base name
    Random(String),
}

impl Default for BranchStrategy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_BRANCH_NAME.to_string())
    }
}

impl BranchStrategy {
    /// Pick a strategy from the CLI inputs
    ///
    /// `random` wins over an explicit name: the explicit name becomes the
    /// base the random suffix is appended to.
    pub fn from_options(explicit: Option<&str>, random: bool) -> Self {
        let base = explicit.unwrap_or(DEFAULT_BRANCH_NAME).to_string();
        if random {
            Self::Random(base)
        } else {
            Self::Fixed(base)
        }
    }

    /// Base name before any suffix
    pub fn base(&self) -> &str {
        match self {
            Self::Fixed(name) | Self::Random(name) => name,
        }
    }

    /// Whether an existing branch of this name should be force-updated
    pub const fn reuses_existing(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Concrete branch name for one run
    pub fn resolve(&self) -> String {
        match self {
            Self::Fixed(name) => name.clone(),
            Self::Random(base) => {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                format!("{base}-{}", &suffix[..8])
            }
        }
    }
}

/// Immutable configuration for one synchronization run
#[derive(Clone)]
pub struct SyncRequest {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Access token (None = discover from `gh` CLI or environment)
    pub token: Option<String>,
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
    /// Local source directory
    pub source_dir: PathBuf,
    /// Destination path inside the repository
    pub destination: String,
    /// Inclusion/exclusion rules
    pub manifest: Manifest,
    /// Delete destination files with no surviving source
    pub clean: bool,
    /// Mark commits and PR so CI skips them
    pub skip_ci: bool,
    /// Working branch naming
    pub branch: BranchStrategy,
    /// Compute and report only, no remote mutation
    pub dry_run: bool,
}

impl SyncRequest {
    /// Create a request with default options (no manifest, fixed branch)
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        destination: &str,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            token: None,
            host: None,
            source_dir: source_dir.into(),
            destination: normalize_repo_path(destination),
            manifest: Manifest::default(),
            clean: false,
            skip_ci: false,
            branch: BranchStrategy::default(),
            dry_run: false,
        }
    }

    /// Reject requests that can't be run, before any I/O
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::Config("repository owner is required".to_string()));
        }
        if self.repository.trim().is_empty() {
            return Err(Error::Config("repository name is required".to_string()));
        }
        if normalize_repo_path(&self.destination)
            .split('/')
            .any(|seg| seg == "..")
        {
            return Err(Error::Config(format!(
                "destination {:?} must stay inside the repository",
                self.destination
            )));
        }
        let base = self.branch.base();
        if base.trim().is_empty() || base.starts_with('/') || base.ends_with('/') {
            return Err(Error::Config(format!("invalid branch name: {base:?}")));
        }
        Ok(())
    }

    /// Platform coordinates for this request
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            owner: self.owner.clone(),
            repo: self.repository.clone(),
            host: self.host.clone(),
        }
    }
}

impl fmt::Debug for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRequest")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("source_dir", &self.source_dir)
            .field("destination", &self.destination)
            .field("manifest", &self.manifest)
            .field("clean", &self.clean)
            .field("skip_ci", &self.skip_ci)
            .field("branch", &self.branch)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// Normalize a repository path: forward slashes, no `.` segments, no outer slashes
pub fn normalize_repo_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a normalized root and a relative path
pub fn join_repo_path(root: &str, relative: &str) -> String {
    if root.is_empty() {
        relative.to_string()
    } else {
        format!("{root}/{relative}")
    }
}

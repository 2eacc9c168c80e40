//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use repo_sync::error::{Error, Result};
use repo_sync::platform::PlatformService;
use repo_sync::scan::blob_id;
use repo_sync::types::{PlatformConfig, PullRequest, RemoteFile};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default branch of the mock repository
pub const DEFAULT_BRANCH: &str = "main";

/// Call record for `write_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub branch: String,
    pub path: String,
    pub message: String,
    pub previous_sha: Option<String>,
}

/// Call record for `delete_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub branch: String,
    pub path: String,
    pub message: String,
}

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
struct Branch {
    head: String,
    files: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug)]
struct Repo {
    branches: BTreeMap<String, Branch>,
    open_prs: Vec<PullRequest>,
    next_commit: u64,
}

impl Repo {
    fn bump(&mut self, branch: &str) {
        self.next_commit += 1;
        let head = format!("commit-{}", self.next_commit);
        if let Some(b) = self.branches.get_mut(branch) {
            b.head = head;
        }
    }

    fn branch_at(&self, sha: &str) -> Option<Branch> {
        self.branches.values().find(|b| b.head == sha).cloned()
    }
}

/// In-memory repository implementing `PlatformService`
///
/// Features:
/// - Per-branch file maps with git blob ids
/// - Content API semantics: overwrites and deletes must name the current blob
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    repo: Mutex<Repo>,
    next_pr_number: AtomicU64,
    // Call tracking
    create_branch_calls: Mutex<Vec<String>>,
    reset_branch_calls: Mutex<Vec<String>>,
    list_files_calls: Mutex<Vec<(String, String)>>,
    write_calls: Mutex<Vec<WriteCall>>,
    delete_calls: Mutex<Vec<DeleteCall>>,
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_list_files: Mutex<Option<String>>,
    error_on_create_branch: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    failing_paths: Mutex<HashSet<String>>,
}

impl MockPlatformService {
    /// Create a mock whose default branch is empty
    pub fn new() -> Self {
        Self::with_config(super::fixtures::github_config())
    }

    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(
            DEFAULT_BRANCH.to_string(),
            Branch {
                head: "commit-0".to_string(),
                files: BTreeMap::new(),
            },
        );
        Self {
            config,
            repo: Mutex::new(Repo {
                branches,
                open_prs: Vec::new(),
                next_commit: 0,
            }),
            next_pr_number: AtomicU64::new(1),
            create_branch_calls: Mutex::new(Vec::new()),
            reset_branch_calls: Mutex::new(Vec::new()),
            list_files_calls: Mutex::new(Vec::new()),
            write_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_list_files: Mutex::new(None),
            error_on_create_branch: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            failing_paths: Mutex::new(HashSet::new()),
        }
    }

    // === Repository setup ===

    /// Put a file on the default branch
    pub fn seed_file(&self, path: &str, content: &str) {
        let mut repo = self.repo.lock().unwrap();
        repo.branches
            .get_mut(DEFAULT_BRANCH)
            .unwrap()
            .files
            .insert(path.to_string(), content.as_bytes().to_vec());
        repo.bump(DEFAULT_BRANCH);
    }

    /// Create a branch at the default branch head without recording a call
    pub fn seed_branch(&self, name: &str) {
        let mut repo = self.repo.lock().unwrap();
        let main = repo.branches[DEFAULT_BRANCH].clone();
        repo.branches.insert(name.to_string(), main);
    }

    /// Register an open PR
    pub fn seed_open_pr(&self, pr: PullRequest) {
        self.repo.lock().unwrap().open_prs.push(pr);
    }

    /// Merge `branch` into the default branch, closing its PR and deleting it
    pub fn merge(&self, branch: &str) {
        let mut repo = self.repo.lock().unwrap();
        let merged = repo.branches.remove(branch).expect("branch to merge exists");
        repo.branches.get_mut(DEFAULT_BRANCH).unwrap().files = merged.files;
        repo.bump(DEFAULT_BRANCH);
        repo.open_prs.retain(|pr| pr.head_ref != branch);
    }

    // === Repository inspection ===

    /// Content of a file on a branch
    pub fn file(&self, branch: &str, path: &str) -> Option<String> {
        let repo = self.repo.lock().unwrap();
        repo.branches
            .get(branch)?
            .files
            .get(path)
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    /// All file paths on a branch, sorted
    pub fn paths(&self, branch: &str) -> Vec<String> {
        let repo = self.repo.lock().unwrap();
        repo.branches
            .get(branch)
            .map(|b| b.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a branch exists
    pub fn has_branch(&self, branch: &str) -> bool {
        self.repo.lock().unwrap().branches.contains_key(branch)
    }

    /// Names of every branch other than the default one
    pub fn work_branches(&self) -> Vec<String> {
        let repo = self.repo.lock().unwrap();
        repo.branches
            .keys()
            .filter(|b| *b != DEFAULT_BRANCH)
            .cloned()
            .collect()
    }

    /// Currently open PRs
    pub fn open_prs(&self) -> Vec<PullRequest> {
        self.repo.lock().unwrap().open_prs.clone()
    }

    // === Error injection methods ===

    /// Make `list_files` return an error
    pub fn fail_list_files(&self, msg: &str) {
        *self.error_on_list_files.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_branch` return an error
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make writes and deletes of `path` fail
    pub fn fail_path(&self, path: &str) {
        self.failing_paths.lock().unwrap().insert(path.to_string());
    }

    // === Call verification methods ===

    pub fn get_create_branch_calls(&self) -> Vec<String> {
        self.create_branch_calls.lock().unwrap().clone()
    }

    pub fn get_reset_branch_calls(&self) -> Vec<String> {
        self.reset_branch_calls.lock().unwrap().clone()
    }

    pub fn get_list_files_calls(&self) -> Vec<(String, String)> {
        self.list_files_calls.lock().unwrap().clone()
    }

    pub fn get_write_calls(&self) -> Vec<WriteCall> {
        self.write_calls.lock().unwrap().clone()
    }

    pub fn get_delete_calls(&self) -> Vec<DeleteCall> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Number of calls that change remote state
    pub fn mutation_count(&self) -> usize {
        self.get_create_branch_calls().len()
            + self.get_reset_branch_calls().len()
            + self.get_write_calls().len()
            + self.get_delete_calls().len()
            + self.get_create_pr_calls().len()
    }

    /// Assert that no remote state was changed
    pub fn assert_no_mutation(&self) {
        assert_eq!(
            self.mutation_count(),
            0,
            "expected no mutation, got branches {:?} writes {:?} deletes {:?} prs {:?}",
            self.get_create_branch_calls(),
            self.get_write_calls(),
            self.get_delete_calls(),
            self.get_create_pr_calls()
        );
    }

    fn check_path(&self, path: &str) -> Result<()> {
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(Error::RemoteAccess(format!("injected failure for {path}")));
        }
        Ok(())
    }
}

/// A file that makes `path` unwritable: a blob at one of its ancestors, or
/// a blob below it (`path` is a directory)
fn tree_conflict(files: &BTreeMap<String, Vec<u8>>, path: &str) -> Option<String> {
    let ancestor = path
        .match_indices('/')
        .map(|(idx, _)| &path[..idx])
        .find(|dir| files.contains_key(*dir));
    if let Some(dir) = ancestor {
        return Some(dir.to_string());
    }
    let prefix = format!("{path}/");
    files.keys().find(|p| p.starts_with(&prefix)).cloned()
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn default_branch(&self) -> Result<String> {
        Ok(DEFAULT_BRANCH.to_string())
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        let repo = self.repo.lock().unwrap();
        Ok(repo.branches.get(branch).map(|b| b.head.clone()))
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        self.create_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_create_branch.lock().unwrap().as_ref() {
            return Err(Error::RemoteAccess(msg.clone()));
        }

        let mut repo = self.repo.lock().unwrap();
        if repo.branches.contains_key(branch) {
            return Err(Error::RemoteAccess("Reference already exists".to_string()));
        }
        let source = repo
            .branch_at(sha)
            .ok_or_else(|| Error::RemoteAccess(format!("unknown commit {sha}")))?;
        repo.branches.insert(branch.to_string(), source);
        Ok(())
    }

    async fn reset_branch(&self, branch: &str, sha: &str) -> Result<()> {
        self.reset_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        let mut repo = self.repo.lock().unwrap();
        if !repo.branches.contains_key(branch) {
            return Err(Error::RemoteAccess("Reference does not exist".to_string()));
        }
        let source = repo
            .branch_at(sha)
            .ok_or_else(|| Error::RemoteAccess(format!("unknown commit {sha}")))?;
        repo.branches.insert(branch.to_string(), source);
        Ok(())
    }

    async fn list_files(&self, commit: &str, dir: &str) -> Result<Vec<RemoteFile>> {
        self.list_files_calls
            .lock()
            .unwrap()
            .push((commit.to_string(), dir.to_string()));

        if let Some(msg) = self.error_on_list_files.lock().unwrap().as_ref() {
            return Err(Error::RemoteAccess(msg.clone()));
        }

        let repo = self.repo.lock().unwrap();
        let b = repo
            .branch_at(commit)
            .ok_or_else(|| Error::RemoteAccess(format!("unknown commit {commit}")))?;
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        Ok(b.files
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|(path, content)| RemoteFile {
                path: path.clone(),
                sha: blob_id(content),
            })
            .collect())
    }

    async fn write_file(
        &self,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
        previous_sha: Option<&str>,
    ) -> Result<()> {
        self.write_calls.lock().unwrap().push(WriteCall {
            branch: branch.to_string(),
            path: path.to_string(),
            message: message.to_string(),
            previous_sha: previous_sha.map(ToString::to_string),
        });
        self.check_path(path)?;

        let mut repo = self.repo.lock().unwrap();
        let b = repo
            .branches
            .get_mut(branch)
            .ok_or_else(|| Error::RemoteAccess(format!("no branch {branch}")))?;
        if let Some(blocker) = tree_conflict(&b.files, path) {
            return Err(Error::RemoteAccess(format!(
                "cannot write {path}: {blocker} is in the way"
            )));
        }
        let current = b.files.get(path).map(|c| blob_id(c));
        if current.as_deref() != previous_sha {
            return Err(Error::RemoteAccess(format!(
                "sha mismatch for {path}: have {current:?}, got {previous_sha:?}"
            )));
        }
        b.files.insert(path.to_string(), content.to_vec());
        repo.bump(branch);
        Ok(())
    }

    async fn delete_file(
        &self,
        branch: &str,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<()> {
        self.delete_calls.lock().unwrap().push(DeleteCall {
            branch: branch.to_string(),
            path: path.to_string(),
            message: message.to_string(),
        });
        self.check_path(path)?;

        let mut repo = self.repo.lock().unwrap();
        let b = repo
            .branches
            .get_mut(branch)
            .ok_or_else(|| Error::RemoteAccess(format!("no branch {branch}")))?;
        match b.files.get(path) {
            Some(content) if blob_id(content) == sha => {
                b.files.remove(path);
            }
            _ => return Err(Error::RemoteAccess(format!("sha mismatch for {path}"))),
        }
        repo.bump(branch);
        Ok(())
    }

    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());

        let repo = self.repo.lock().unwrap();
        Ok(repo
            .open_prs
            .iter()
            .find(|pr| pr.head_ref == head_branch)
            .cloned())
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::RemoteAccess(msg.clone()));
        }

        let mut repo = self.repo.lock().unwrap();
        if repo.open_prs.iter().any(|pr| pr.head_ref == head) {
            return Err(Error::RemoteAccess(format!(
                "A pull request already exists for test:{head}"
            )));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        };
        repo.open_prs.push(pr.clone());
        Ok(pr)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

//! Phase 2: Reconciliation
//!
//! Compares the selected files with the destination subtree on the default
//! branch and decides what to create, update and delete.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::submit::SelectionAnalysis;
use crate::types::{
    ChangeSet, DestinationState, FileEntry, FileRemoval, FileWrite, SyncRequest,
};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::debug;

/// Title used for commits and pull requests
pub const SYNC_TITLE: &str = "sync: file sync performed by repo-sync";

/// Marker GitHub Actions and most CI systems honor in commit messages
pub const SKIP_CI_MARKER: &str = "[skip ci]";

/// Everything needed to submit one run
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Operations to apply
    pub change_set: ChangeSet,
    /// Destination snapshot the operations were computed against
    pub destination: DestinationState,
    /// Default branch (PR base)
    pub base_branch: String,
    /// Head of the default branch the working branch starts from
    pub base_sha: String,
    /// Working branch name
    pub branch: String,
    /// Force-update the branch if it already exists
    pub reuse_branch: bool,
    /// Add CI-skip markers
    pub skip_ci: bool,
}

impl SyncPlan {
    /// Commit message for a single file operation
    pub fn commit_message(&self, action: &str, path: &str) -> String {
        with_skip_ci(format!("{SYNC_TITLE} ({action} {path})"), self.skip_ci)
    }

    /// Pull request title
    pub fn pr_title(&self) -> String {
        with_skip_ci(SYNC_TITLE.to_string(), self.skip_ci)
    }

    /// Pull request description listing every operation
    pub fn pr_body(&self) -> String {
        let cs = &self.change_set;
        let mut body = String::from(
            "This pull request was generated automatically by repo-sync.\n",
        );

        let _ = write!(
            body,
            "\nDestination: `{}`\n",
            if self.destination.root.is_empty() {
                "/"
            } else {
                self.destination.root.as_str()
            }
        );

        let sections: [(&str, Vec<&str>); 3] = [
            ("Added", cs.to_create.iter().map(|w| w.path.as_str()).collect()),
            ("Updated", cs.to_update.iter().map(|w| w.path.as_str()).collect()),
            ("Removed", cs.to_delete.iter().map(|r| r.path.as_str()).collect()),
        ];
        for (heading, paths) in sections {
            if paths.is_empty() {
                continue;
            }
            let _ = writeln!(body, "\n### {heading} ({})\n", paths.len());
            for path in paths {
                let _ = writeln!(body, "- `{path}`");
            }
        }

        if self.skip_ci {
            let _ = write!(body, "\n{SKIP_CI_MARKER}\n");
        }
        body
    }
}

fn with_skip_ci(text: String, skip_ci: bool) -> String {
    if skip_ci {
        format!("{text} {SKIP_CI_MARKER}")
    } else {
        text
    }
}

/// Compute the operations that converge `destination` to `selected`
///
/// - absent from the destination: create
/// - present with a different blob id: update
/// - present and identical: nothing
/// - present in the destination but not selected: delete, only when `clean`
///
/// An empty selection with `clean` wipes the whole destination subtree.
pub fn reconcile(selected: &[FileEntry], destination: &DestinationState, clean: bool) -> ChangeSet {
    let mut change_set = ChangeSet::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(selected.len());

    for entry in selected {
        if !seen.insert(entry.path.as_str()) {
            continue;
        }

        match destination.files.get(&entry.path) {
            None => {
                debug!(path = %entry.path, "create");
                change_set.to_create.push(FileWrite {
                    path: destination.repo_path(&entry.path),
                    content: entry.content.clone(),
                    blob_id: entry.blob_id.clone(),
                    previous_sha: None,
                });
            }
            Some(sha) if *sha != entry.blob_id => {
                debug!(path = %entry.path, "update");
                change_set.to_update.push(FileWrite {
                    path: destination.repo_path(&entry.path),
                    content: entry.content.clone(),
                    blob_id: entry.blob_id.clone(),
                    previous_sha: Some(sha.clone()),
                });
            }
            Some(_) => debug!(path = %entry.path, "unchanged"),
        }
    }

    if clean {
        for (path, sha) in &destination.files {
            if !seen.contains(path.as_str()) {
                debug!(path = %path, "delete");
                change_set.to_delete.push(FileRemoval {
                    path: destination.repo_path(path),
                    sha: sha.clone(),
                });
            }
        }
    }

    change_set
}

/// Create a sync plan
///
/// Reads the destination subtree from the default branch, reconciles it
/// with the selection and names the working branch. Nothing is mutated.
///
/// A working branch equal to the default branch is a configuration error.
pub async fn create_sync_plan(
    request: &SyncRequest,
    analysis: &SelectionAnalysis,
    platform: &dyn PlatformService,
) -> Result<SyncPlan> {
    let base_branch = platform.default_branch().await?;
    let base_sha = platform.branch_head(&base_branch).await?.ok_or_else(|| {
        Error::RemoteAccess(format!("default branch {base_branch} has no head commit"))
    })?;

    let branch = request.branch.resolve();
    if branch == base_branch {
        return Err(Error::Config(format!(
            "working branch {branch} is the default branch of {}/{}",
            platform.config().owner,
            platform.config().repo
        )));
    }

    // Read the tree at the commit the working branch will start from
    let root = crate::types::normalize_repo_path(&request.destination);
    let remote = platform.list_files(&base_sha, &root).await?;
    let destination = DestinationState::from_remote(&root, remote);
    debug!(
        "Destination {root:?} on {base_branch} ({base_sha}) holds {} files",
        destination.files.len()
    );

    let change_set = reconcile(&analysis.selected, &destination, request.clean);

    Ok(SyncPlan {
        change_set,
        destination,
        base_branch,
        base_sha,
        branch,
        reuse_branch: request.branch.reuses_existing(),
        skip_ci: request.skip_ci,
    })
}

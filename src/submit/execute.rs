//! Phase 3: Submission
//!
//! Creates the working branch, applies the change set file by file and opens
//! the pull request.
//!
//! File operations are independent commits. A failure part-way through
//! leaves the branch with whatever was applied; nothing is rolled back.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::submit::{ApplyStatus, FileAction, Phase, ProgressCallback, SyncPlan};
use crate::types::PullRequest;
use std::fmt;
use tracing::{info, warn};

/// Submission state machine
///
/// `Idle → BranchCreated → FilesApplied → PullRequestOpened → Done`, with
/// `Failed` reachable from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing done on the remote yet
    Idle,
    /// Working branch exists at the default branch head
    BranchCreated,
    /// Every file operation succeeded
    FilesApplied,
    /// PR opened (or an open one found for the branch)
    PullRequestOpened,
    /// Run finished
    Done,
    /// Run aborted
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of submission execution
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// Final state reached
    pub state: SubmissionState,
    /// Working branch, if one was created or reset
    pub branch: Option<String>,
    /// Pull request, if one was opened or reused
    pub pull_request: Option<PullRequest>,
    /// Repository paths written or deleted
    pub applied: Vec<String>,
    /// Whether the run was a dry run
    pub dry_run: bool,
}

impl SubmissionResult {
    fn new(dry_run: bool) -> Self {
        Self {
            state: SubmissionState::Idle,
            branch: None,
            pull_request: None,
            applied: Vec::new(),
            dry_run,
        }
    }

    /// URL of the pull request, if any
    pub fn pr_url(&self) -> Option<&str> {
        self.pull_request.as_ref().map(|pr| pr.html_url.as_str())
    }

    fn advance(&mut self, next: SubmissionState) {
        info!(from = %self.state, to = %next, "submission state");
        self.state = next;
    }
}

/// Execute a sync plan
///
/// Errors before the branch exists carry no remote side effects. Errors
/// after that are reported as [`Error::Submission`] naming the branch.
pub async fn execute_sync(
    plan: &SyncPlan,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    dry_run: bool,
) -> Result<SubmissionResult> {
    let mut result = SubmissionResult::new(dry_run);

    if dry_run {
        progress.on_message("Dry run - no changes will be made").await;
        report_dry_run(plan, progress).await;
        return Ok(result);
    }

    if plan.change_set.is_empty() {
        progress.on_message("Nothing to do - already in sync").await;
        result.advance(SubmissionState::Done);
        progress.on_phase(Phase::Complete).await;
        return Ok(result);
    }

    // Phase: branch
    progress.on_phase(Phase::CreatingBranch).await;
    let reused = match prepare_branch(plan, platform).await {
        Ok(reused) => reused,
        Err(e) => {
            result.advance(SubmissionState::Failed);
            progress.on_error(&e).await;
            return Err(e);
        }
    };
    result.branch = Some(plan.branch.clone());
    result.advance(SubmissionState::BranchCreated);
    progress.on_branch_ready(&plan.branch, reused).await;

    // Phase: files
    progress.on_phase(Phase::ApplyingFiles).await;
    let failures = apply_files(plan, platform, progress, &mut result).await;
    if !failures.is_empty() {
        result.advance(SubmissionState::Failed);
        let total = plan.change_set.len();
        warn!(
            branch = %plan.branch,
            failed = failures.len(),
            total,
            "file operations failed"
        );
        return Err(Error::Submission {
            branch: plan.branch.clone(),
            message: format!(
                "{} of {total} file operations failed: {}",
                failures.len(),
                failures.join("; ")
            ),
        });
    }
    result.advance(SubmissionState::FilesApplied);

    // Phase: pull request
    progress.on_phase(Phase::OpeningPr).await;
    match open_pull_request(plan, platform).await {
        Ok((pr, reused_pr)) => {
            progress.on_pr_ready(&pr, reused_pr).await;
            result.pull_request = Some(pr);
            result.advance(SubmissionState::PullRequestOpened);
        }
        Err(e) => {
            result.advance(SubmissionState::Failed);
            let err = Error::Submission {
                branch: plan.branch.clone(),
                message: format!("could not open pull request: {e}"),
            };
            progress.on_error(&err).await;
            return Err(err);
        }
    }

    result.advance(SubmissionState::Done);
    progress.on_phase(Phase::Complete).await;

    Ok(result)
}

/// Create the working branch, or force-reset a reusable one
///
/// Returns whether an existing branch was reused.
async fn prepare_branch(plan: &SyncPlan, platform: &dyn PlatformService) -> Result<bool> {
    if plan.reuse_branch && platform.branch_head(&plan.branch).await?.is_some() {
        platform.reset_branch(&plan.branch, &plan.base_sha).await?;
        return Ok(true);
    }
    platform.create_branch(&plan.branch, &plan.base_sha).await?;
    Ok(false)
}

/// Apply every operation once, returning failure messages
///
/// Deletes go first so a path can change between file and directory within
/// one run.
async fn apply_files(
    plan: &SyncPlan,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    result: &mut SubmissionResult,
) -> Vec<String> {
    let cs = &plan.change_set;
    let mut failures = Vec::new();

    for removal in &cs.to_delete {
        let action = FileAction::Delete;
        let message = plan.commit_message(&action.to_string(), &removal.path);
        let outcome = platform
            .delete_file(&plan.branch, &removal.path, &removal.sha, &message)
            .await;
        record(plan, action, &removal.path, outcome, progress, result, &mut failures).await;
    }

    let writes = cs
        .to_create
        .iter()
        .map(|w| (FileAction::Create, w))
        .chain(cs.to_update.iter().map(|w| (FileAction::Update, w)));

    for (action, write) in writes {
        let message = plan.commit_message(&action.to_string(), &write.path);
        let outcome = platform
            .write_file(
                &plan.branch,
                &write.path,
                &write.content,
                &message,
                write.previous_sha.as_deref(),
            )
            .await;
        record(plan, action, &write.path, outcome, progress, result, &mut failures).await;
    }

    failures
}

async fn record(
    plan: &SyncPlan,
    action: FileAction,
    path: &str,
    outcome: Result<()>,
    progress: &dyn ProgressCallback,
    result: &mut SubmissionResult,
    failures: &mut Vec<String>,
) {
    match outcome {
        Ok(()) => {
            progress
                .on_file_applied(action, path, &ApplyStatus::Success)
                .await;
            result.applied.push(path.to_string());
        }
        Err(e) => {
            let msg = format!("{action} {path}: {e}");
            progress
                .on_file_applied(action, path, &ApplyStatus::Failed(e.to_string()))
                .await;
            progress
                .on_error(&Error::Submission {
                    branch: plan.branch.clone(),
                    message: msg.clone(),
                })
                .await;
            failures.push(msg);
        }
    }
}

/// Open the PR, reusing an open one when the branch was reused
async fn open_pull_request(
    plan: &SyncPlan,
    platform: &dyn PlatformService,
) -> Result<(PullRequest, bool)> {
    if plan.reuse_branch {
        if let Some(pr) = platform.find_existing_pr(&plan.branch).await? {
            return Ok((pr, true));
        }
    }
    let pr = platform
        .create_pr(
            &plan.branch,
            &plan.base_branch,
            &plan.pr_title(),
            &plan.pr_body(),
        )
        .await?;
    Ok((pr, false))
}

/// Report what would be done in a dry run
async fn report_dry_run(plan: &SyncPlan, progress: &dyn ProgressCallback) {
    let cs = &plan.change_set;

    if cs.is_empty() {
        progress.on_message("Nothing to do - already in sync").await;
        return;
    }

    progress
        .on_message(&format!(
            "Would create branch {} from {}",
            plan.branch, plan.base_branch
        ))
        .await;

    let groups = [
        ("Would create:", cs.to_create.iter().map(|w| &w.path).collect::<Vec<_>>()),
        ("Would update:", cs.to_update.iter().map(|w| &w.path).collect()),
        ("Would delete:", cs.to_delete.iter().map(|r| &r.path).collect()),
    ];
    for (heading, paths) in groups {
        if paths.is_empty() {
            continue;
        }
        progress.on_message(heading).await;
        for path in paths {
            progress.on_message(&format!("  - {path}")).await;
        }
    }

    progress
        .on_message(&format!(
            "Would open PR: {} → {} ({})",
            plan.branch,
            plan.base_branch,
            plan.pr_title()
        ))
        .await;
}

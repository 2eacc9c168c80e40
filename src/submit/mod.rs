//! Three-phase synchronization engine
//!
//! Handles the workflow of syncing a source tree into a repository:
//! 1. Analysis - scan the source tree and apply the manifest
//! 2. Planning - reconcile the selection with the destination subtree
//! 3. Execution - create the branch, apply files, open the PR

mod analysis;
mod execute;
mod plan;
mod progress;

pub use analysis::{analyze_selection, SelectionAnalysis};
pub use execute::{execute_sync, SubmissionResult, SubmissionState};
pub use plan::{create_sync_plan, reconcile, SyncPlan, SKIP_CI_MARKER, SYNC_TITLE};
pub use progress::{ApplyStatus, FileAction, NoopProgress, Phase, ProgressCallback};

use crate::error::Result;
use crate::platform::{create_platform_service, PlatformService};
use crate::types::SyncRequest;
use tracing::info;

/// Run one synchronization against `platform`
///
/// Configuration is validated and the source tree scanned before any remote
/// call is made.
pub async fn synchronize(
    request: &SyncRequest,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> Result<SubmissionResult> {
    request.validate()?;
    let analysis = select(request, progress).await?;
    submit_selection(request, &analysis, platform, progress).await
}

/// Run one synchronization against GitHub
///
/// Resolves the credential (explicit token, `gh` CLI, environment) after the
/// source tree has been scanned.
pub async fn synchronize_on_github(
    request: &SyncRequest,
    progress: &dyn ProgressCallback,
) -> Result<SubmissionResult> {
    request.validate()?;
    let analysis = select(request, progress).await?;
    let platform =
        create_platform_service(&request.platform_config(), request.token.as_deref()).await?;
    submit_selection(request, &analysis, platform.as_ref(), progress).await
}

async fn select(request: &SyncRequest, progress: &dyn ProgressCallback) -> Result<SelectionAnalysis> {
    progress.on_phase(Phase::Scanning).await;
    let analysis = analyze_selection(&request.source_dir, &request.manifest)?;
    info!(
        selected = analysis.selected.len(),
        scanned = analysis.scanned(),
        "source tree scanned"
    );
    Ok(analysis)
}

async fn submit_selection(
    request: &SyncRequest,
    analysis: &SelectionAnalysis,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> Result<SubmissionResult> {
    progress.on_phase(Phase::Planning).await;
    let plan = create_sync_plan(request, analysis, platform).await?;
    info!(
        create = plan.change_set.to_create.len(),
        update = plan.change_set.to_update.len(),
        delete = plan.change_set.to_delete.len(),
        "change set computed"
    );
    execute_sync(&plan, platform, progress, request.dry_run).await
}

//! Sync command - copy files into the repository and open a PR

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, check};
use anstream::{eprintln, println};
use repo_sync::error::{Error, Result};
use repo_sync::manifest::Manifest;
use repo_sync::submit::synchronize_on_github;
use repo_sync::types::{BranchStrategy, SyncRequest};
use std::path::PathBuf;

/// Parsed command-line arguments
pub struct SyncArgs {
    pub owner: String,
    pub repository: String,
    pub token: Option<String>,
    pub host: Option<String>,
    pub from_dir: PathBuf,
    pub to_dir: String,
    pub include_manifest: Option<PathBuf>,
    pub clean_to_dir: bool,
    pub skip_ci: bool,
    pub random_branch_name: bool,
    pub branch_name: Option<String>,
    pub dry_run: bool,
}

/// Build the request; manifest errors surface here, before any other I/O
fn build_request(args: SyncArgs) -> Result<SyncRequest> {
    let manifest = match &args.include_manifest {
        Some(path) => Manifest::from_file(path)?,
        None => Manifest::default(),
    };

    let mut request = SyncRequest::new(args.owner, args.repository, args.from_dir, &args.to_dir);
    request.token = args.token;
    request.host = args.host.filter(|h| !h.is_empty() && h != "github.com");
    request.manifest = manifest;
    request.clean = args.clean_to_dir;
    request.skip_ci = args.skip_ci;
    request.branch =
        BranchStrategy::from_options(args.branch_name.as_deref(), args.random_branch_name);
    request.dry_run = args.dry_run;
    request.validate()?;
    Ok(request)
}

/// Run the sync command
///
/// Prints the PR URL on stdout on success.
pub async fn run_sync(args: SyncArgs) -> Result<()> {
    let request = build_request(args)?;
    let progress = CliProgress::new();

    let result = match synchronize_on_github(&request, &progress).await {
        Ok(result) => result,
        Err(e) => {
            progress.finish();
            if let Error::Submission { branch, .. } = &e {
                eprintln!(
                    "{} branch {} was left on the remote for inspection",
                    "note:".warn(),
                    branch.accent().on_stderr()
                );
            }
            return Err(e);
        }
    };
    progress.finish();

    if result.dry_run {
        println!();
        println!("{}", "Dry run complete".muted());
        return Ok(());
    }

    // Already in sync: the progress callback has reported it
    let Some(url) = result.pr_url() else {
        return Ok(());
    };

    println!();
    println!(
        "{} Synchronized {} file{}",
        check(),
        result.applied.len().accent(),
        if result.applied.len() == 1 { "" } else { "s" }
    );
    // Plain URL on its own line so scripts can pick it up
    std::println!("{url}");

    Ok(())
}

//! repo-sync - synchronize shared files into a repository via pull request
//!
//! CLI binary wrapping the `repo_sync` library.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "repo-sync")]
#[command(about = "Copy a manifest-selected set of files into a GitHub repository and open a PR")]
#[command(version)]
struct Cli {
    /// Repository owner (user or organization)
    #[arg(long)]
    owner: String,

    /// Repository name
    #[arg(long)]
    repository: String,

    /// GitHub token (defaults to `gh auth token`, then GITHUB_TOKEN / GH_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Local directory to copy files from
    #[arg(long)]
    from_dir: PathBuf,

    /// Destination path inside the repository
    #[arg(long)]
    to_dir: String,

    /// Manifest of glob patterns selecting files (one per line)
    #[arg(long)]
    include_manifest: Option<PathBuf>,

    /// Delete destination files that no longer have a source
    #[arg(long)]
    clean_to_dir: bool,

    /// Mark commits and the PR so CI skips them
    #[arg(long)]
    skip_ci: bool,

    /// Append a random suffix to the branch name
    #[arg(long)]
    random_branch_name: bool,

    /// Working branch name (default: sync/file-sync)
    #[arg(long)]
    branch_name: Option<String>,

    /// Dry run - show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// GitHub Enterprise hostname
    #[arg(long, env = "GH_HOST")]
    host: Option<String>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "repo_sync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = cli::SyncArgs {
        owner: cli.owner,
        repository: cli.repository,
        token: cli.token,
        host: cli.host,
        from_dir: cli.from_dir,
        to_dir: cli.to_dir,
        include_manifest: cli.include_manifest,
        clean_to_dir: cli.clean_to_dir,
        skip_ci: cli.skip_ci,
        random_branch_name: cli.random_branch_name,
        branch_name: cli.branch_name,
        dry_run: cli.dry_run,
    };
    cli::run_sync(args).await?;

    Ok(())
}

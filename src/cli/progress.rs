//! CLI progress callback with styled output and a spinner

use crate::cli::style::{Stream, Stylize, check, cross, hyperlink_url, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use repo_sync::error::Error;
use repo_sync::submit::{ApplyStatus, FileAction, Phase, ProgressCallback};
use repo_sync::types::PullRequest;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress callback
///
/// Local and read-only phases run under a spinner; mutating phases print a
/// line per operation.
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Clear any running spinner
    pub fn finish(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn spin(&self, message: String) {
        if let Ok(mut guard) = self.spinner.lock() {
            match guard.as_ref() {
                Some(pb) => pb.set_message(message),
                None => {
                    let pb = ProgressBar::new_spinner();
                    pb.set_style(spinner_style());
                    pb.set_message(message);
                    pb.enable_steady_tick(Duration::from_millis(80));
                    *guard = Some(pb);
                }
            }
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Scanning | Phase::Planning => self.spin(format!("{phase}...")),
            Phase::Complete => self.finish(),
            _ => {
                self.finish();
                println!("{}...", phase.to_string().emphasis());
            }
        }
    }

    async fn on_branch_ready(&self, branch: &str, reused: bool) {
        let verb = if reused { "Reset" } else { "Created" };
        println!("  {} {verb} branch {}", check(), branch.accent());
    }

    async fn on_file_applied(&self, action: FileAction, path: &str, status: &ApplyStatus) {
        match status {
            ApplyStatus::Success => {
                println!("  {} {action} {}", check(), path.accent());
            }
            ApplyStatus::Failed(_) => {
                eprintln!("  {} {action} {}", cross(), path.accent().on_stderr());
            }
        }
    }

    async fn on_pr_ready(&self, pr: &PullRequest, reused: bool) {
        let pr_num = format!("#{}", pr.number);
        let verb = if reused { "Updated existing" } else { "Opened" };
        println!("  {} {verb} PR {}", check(), pr_num.accent());
        println!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url));
    }

    async fn on_error(&self, err: &Error) {
        self.finish();
        eprintln!("    {}: {}", "error".error(), err);
    }

    async fn on_message(&self, message: &str) {
        self.finish();
        println!("{message}");
    }
}

//! Test data factories for repo-sync types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use repo_sync::types::{PlatformConfig, PullRequest, SyncRequest};
use std::path::Path;
use tempfile::TempDir;

/// Write `files` (relative path, content) into a fresh temporary directory
pub fn make_source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_files(dir.path(), files);
    dir
}

/// Write `files` below `root`, creating parent directories
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(full, content).expect("write file");
    }
}

/// Platform config for the mock repository
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// Request syncing `source` into `destination` of the mock repository
pub fn make_request(source: &Path, destination: &str) -> SyncRequest {
    let mut request = SyncRequest::new("test", "repo", source, destination);
    request.token = Some("test-token".to_string());
    request
}

/// Create an open PR for `head` targeting main
pub fn make_pr(number: u64, head: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/repo/pull/{number}"),
        base_ref: "main".to_string(),
        head_ref: head.to_string(),
        title: format!("PR for {head}"),
    }
}

//! Phase 1: Selection
//!
//! Scans the source tree and keeps the files the manifest selects.

use crate::error::Result;
use crate::manifest::Manifest;
use crate::scan::{load_entries, scan_paths};
use crate::types::FileEntry;
use std::path::Path;
use tracing::debug;

/// Result of scanning and filtering the source tree
#[derive(Debug, Clone)]
pub struct SelectionAnalysis {
    /// Selected files, sorted by path
    pub selected: Vec<FileEntry>,
    /// Paths the manifest rejected, sorted
    pub excluded: Vec<String>,
}

impl SelectionAnalysis {
    /// Number of files found under the source directory
    pub fn scanned(&self) -> usize {
        self.selected.len() + self.excluded.len()
    }
}

/// Scan `source_dir` and apply `manifest`
///
/// Only selected files are read from disk.
pub fn analyze_selection(source_dir: &Path, manifest: &Manifest) -> Result<SelectionAnalysis> {
    let (selected, excluded): (Vec<String>, Vec<String>) = scan_paths(source_dir)?
        .into_iter()
        .partition(|path| manifest.matches(path));

    debug!(
        "Selected {} of {} files",
        selected.len(),
        selected.len() + excluded.len()
    );

    Ok(SelectionAnalysis {
        selected: load_entries(source_dir, &selected)?,
        excluded,
    })
}

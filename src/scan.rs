//! Source tree scanning
//!
//! Walks the source directory and yields every regular file below it as a
//! POSIX-style relative path, sorted lexicographically. Version-control
//! metadata directories are skipped; nothing else is implicitly excluded.

use crate::error::{io_err, Result};
use crate::types::FileEntry;
use sha1::{Digest, Sha1};
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Git blob id of `content` (`sha1("blob <len>\0" + content)`)
///
/// This is the hash the hosting API reports for tree entries, so local and
/// remote content can be compared without downloading remote blobs.
pub fn blob_id(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| VCS_DIRS.contains(&name))
}

/// List relative paths of all files below `source_dir`, sorted
pub fn scan_paths(source_dir: &Path) -> Result<Vec<String>> {
    let meta = std::fs::metadata(source_dir).map_err(|e| io_err(source_dir, e))?;
    if !meta.is_dir() {
        return Err(io_err(
            source_dir,
            io::Error::new(io::ErrorKind::InvalidInput, "source is not a directory"),
        ));
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_vcs_dir(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map_or_else(|| source_dir.to_path_buf(), Path::to_path_buf);
            io_err(path, io::Error::from(e))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| io_err(entry.path(), io::Error::other(e)))?;
        let posix = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        paths.push(posix);
    }

    paths.sort();
    debug!("Scanned {} files under {}", paths.len(), source_dir.display());
    Ok(paths)
}

/// Read the given relative paths into entries
pub fn load_entries(source_dir: &Path, paths: &[String]) -> Result<Vec<FileEntry>> {
    paths
        .iter()
        .map(|rel| {
            let full = source_dir.join(rel);
            let content = std::fs::read(&full).map_err(|e| io_err(&full, e))?;
            Ok(FileEntry::new(rel.clone(), content))
        })
        .collect()
}

/// Scan `source_dir` and read every file
pub fn scan(source_dir: &Path) -> Result<Vec<FileEntry>> {
    let paths = scan_paths(source_dir)?;
    load_entries(source_dir, &paths)
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// Why a directory listing failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadErrorKind {
    #[error("not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Other(String),
}

/// A directory could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read {}: {}", .path.display(), .kind)]
pub struct ReadError {
    pub path: PathBuf,
    pub kind: ReadErrorKind,
}

impl ReadError {
    /// Classify an I/O error raised while listing `path`.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ReadErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ReadErrorKind::PermissionDenied,
            _ => ReadErrorKind::Other(err.to_string()),
        };
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Lists the immediate children of a directory.
pub trait DirectoryReader {
    fn list_children(&self, path: &Path) -> Result<Vec<ChildInfo>, ReadError>;

    /// Stable identity of a directory, used to detect symlink cycles.
    fn identity(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Sort criteria for directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Alphabetical (case-insensitive), default.
    Name,
    /// By file size (largest first).
    Size,
    /// By modification time (newest first).
    Modified,
}

impl SortBy {
    /// Parse sort_by from config string.
    pub fn parse(s: &str) -> Self {
        match s {
            "size" => SortBy::Size,
            "modified" => SortBy::Modified,
            _ => SortBy::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::Size => "Size",
            SortBy::Modified => "Modified",
        }
    }

    /// Cycle to the next sort option.
    pub fn next(&self) -> Self {
        match self {
            SortBy::Name => SortBy::Size,
            SortBy::Size => SortBy::Modified,
            SortBy::Modified => SortBy::Name,
        }
    }
}

/// Reads directories from the real filesystem.
///
/// Symlinks are followed for kind and size, so a link to a directory is
/// listed as a directory. Broken links fall back to the link's own metadata.
/// Children the process cannot stat at all are skipped.
#[derive(Debug, Clone)]
pub struct FsReader {
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub dirs_first: bool,
}

impl Default for FsReader {
    fn default() -> Self {
        Self {
            show_hidden: false,
            sort_by: SortBy::Name,
            dirs_first: true,
        }
    }
}

impl DirectoryReader for FsReader {
    fn list_children(&self, path: &Path) -> Result<Vec<ChildInfo>, ReadError> {
        let entries = fs::read_dir(path).map_err(|e| ReadError::from_io(path, &e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::debug!("skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }

            let child_path = entry.path();
            let metadata = match fs::metadata(&child_path).or_else(|_| fs::symlink_metadata(&child_path)) {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("skipping {}: {}", child_path.display(), e);
                    continue;
                }
            };

            children.push(ChildInfo {
                name,
                path: child_path,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }

        sort_children(&mut children, self.sort_by, self.dirs_first);
        Ok(children)
    }
}

/// Sort a listing in place.
pub fn sort_children(children: &mut [ChildInfo], sort_by: SortBy, dirs_first: bool) {
    children.sort_by(|a, b| {
        let mut cmp = std::cmp::Ordering::Equal;

        if dirs_first {
            cmp = b.is_dir.cmp(&a.is_dir);
        }

        cmp.then_with(|| match sort_by {
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::Size => b.size.cmp(&a.size),
            SortBy::Modified => b.modified.cmp(&a.modified),
        })
        .then_with(|| a.name.cmp(&b.name))
    });
}

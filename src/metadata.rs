//! Display-ready metadata for the selected row.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::fs::{Entry, EntryKind};

/// Metadata for an entry could not be read. `message` is the full text
/// shown in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StatError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

impl FileKind {
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::File => "File",
            FileKind::Directory => "Directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub name: String,
    pub kind: FileKind,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Local>>,
    pub full_path: PathBuf,
    /// `rwxr-xr-x` style string; unix only.
    pub permissions: Option<String>,
}

impl MetadataRecord {
    /// Label/value pairs in panel order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Name", self.name.clone()),
            ("Type", self.kind.label().to_string()),
            ("Size", format_size(self.size_bytes)),
            ("Modified", format_time(self.modified_at.as_ref())),
        ];
        if let Some(perms) = &self.permissions {
            fields.push(("Permissions", perms.clone()));
        }
        fields.push(("Path", self.full_path.display().to_string()));
        fields
    }
}

/// What the metadata panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataView {
    NoSelection,
    Record(MetadataRecord),
    Unavailable(StatError),
}

/// Stat `entry` and build its record.
///
/// Fails if the entry vanished since the tree was flattened, or if it is an
/// error row.
pub fn project(entry: &Entry) -> Result<MetadataRecord, StatError> {
    if let EntryKind::Unreadable { dir, message } = &entry.kind {
        return Err(StatError {
            path: dir.clone(),
            message: message.clone(),
        });
    }

    let metadata = fs::metadata(&entry.path)
        .or_else(|_| fs::symlink_metadata(&entry.path))
        .map_err(|e| StatError {
            path: entry.path.clone(),
            message: format!("cannot stat {}: {}", entry.path.display(), e),
        })?;

    Ok(MetadataRecord {
        name: entry.name.clone(),
        kind: if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        },
        size_bytes: metadata.len(),
        modified_at: metadata.modified().ok().map(DateTime::<Local>::from),
        full_path: entry.path.clone(),
        permissions: permissions_of(&metadata),
    })
}

/// Project the current selection, which may be empty.
pub fn project_selection(entry: Option<&Entry>) -> MetadataView {
    match entry {
        None => MetadataView::NoSelection,
        Some(entry) => match project(entry) {
            Ok(record) => MetadataView::Record(record),
            Err(err) => {
                log::debug!("{}", err);
                MetadataView::Unavailable(err)
            }
        },
    }
}

/// Format bytes into human-readable size string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_time(time: Option<&DateTime<Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(unix)]
fn permissions_of(metadata: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format_permissions(metadata.permissions().mode()))
}

#[cfg(not(unix))]
fn permissions_of(_metadata: &fs::Metadata) -> Option<String> {
    None
}

/// Format Unix permissions as rwxrwxrwx string.
pub fn format_permissions(mode: u32) -> String {
    let flags = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    flags
        .iter()
        .map(|&(bit, ch)| if mode & bit != 0 { ch } else { '-' })
        .collect()
}

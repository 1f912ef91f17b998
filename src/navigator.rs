use std::path::{Path, PathBuf};

use crate::fs::{flatten, DirectoryReader, Entry, EntryKind, ExpansionSet, ReadError};

/// How a directory behaves when it is activated.
///
/// Fixed for the lifetime of a navigator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavMode {
    /// Directories open and close in place inside the tree.
    #[default]
    ExpandInPlace,
    /// Activating a directory makes it the new root.
    ReplaceRoot,
}

impl NavMode {
    /// Parse a mode name from config or the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expand" | "expand-in-place" | "expand_in_place" => Some(NavMode::ExpandInPlace),
            "replace-root" | "replace_root" | "flat" => Some(NavMode::ReplaceRoot),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavMode::ExpandInPlace => "tree",
            NavMode::ReplaceRoot => "flat",
        }
    }
}

/// Follow-up the caller must perform after a navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    None,
    /// The expansion set changed; call [`Navigator::rebuild`].
    Rebuild,
    /// Call [`Navigator::change_root`] with this path.
    ChangeRoot(PathBuf),
    /// Show this file in the preview panel.
    OpenFile(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Empty,
    Populated,
}

/// Cursor, expansion state and visible rows for one browsing session.
///
/// Starts out empty; nothing is listed until the first [`rebuild`].
/// Whenever rows exist, `cursor < entries.len()` holds.
///
/// [`rebuild`]: Navigator::rebuild
#[derive(Debug)]
pub struct Navigator<R> {
    reader: R,
    mode: NavMode,
    root: PathBuf,
    expansion: ExpansionSet,
    entries: Vec<Entry>,
    cursor: usize,
}

impl<R: DirectoryReader> Navigator<R> {
    pub fn new(reader: R, root: impl Into<PathBuf>, mode: NavMode) -> Self {
        Self {
            reader,
            mode,
            root: root.into(),
            expansion: ExpansionSet::new(),
            entries: Vec::new(),
            cursor: 0,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Mutable access to the reader, e.g. to change its listing options.
    /// Call [`Navigator::refresh`] afterwards.
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expansion.is_expanded(path)
    }

    pub fn state(&self) -> NavState {
        if self.entries.is_empty() {
            NavState::Empty
        } else {
            NavState::Populated
        }
    }

    /// The row under the cursor, if any.
    pub fn selected(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Re-list the tree and clamp the cursor to the new row count.
    ///
    /// If the root cannot be listed the rows are cleared and the error is
    /// returned for display.
    pub fn rebuild(&mut self) -> Result<(), ReadError> {
        match flatten(&self.reader, &self.root, &self.expansion) {
            Ok(entries) => {
                log::debug!(
                    "rebuilt {}: {} rows, {} expanded",
                    self.root.display(),
                    entries.len(),
                    self.expansion.len()
                );
                self.entries = entries;
                self.clamp_cursor();
                Ok(())
            }
            Err(err) => {
                log::warn!("rebuild failed: {}", err);
                self.entries.clear();
                self.cursor = 0;
                Err(err)
            }
        }
    }

    /// Rebuild, keeping the cursor on the same path when it is still visible.
    pub fn refresh(&mut self) -> Result<(), ReadError> {
        let previous = self.selected().map(|e| e.path.clone());
        self.rebuild()?;
        if let Some(path) = previous {
            self.select_path(&path);
        }
        Ok(())
    }

    /// Browse a different root. The expansion set is kept.
    pub fn change_root(&mut self, new_root: impl Into<PathBuf>) -> Result<(), ReadError> {
        self.root = new_root.into();
        self.cursor = 0;
        log::info!("root changed to {}", self.root.display());
        self.rebuild()
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
    }

    pub fn page_down(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_add(rows);
        self.clamp_cursor();
    }

    pub fn page_up(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows);
    }

    /// Activate the row under the cursor.
    ///
    /// A directory is toggled (or becomes the new root, depending on the
    /// mode) and a file is handed to the preview. Unreadable rows do nothing.
    pub fn toggle_selected(&mut self) -> NavAction {
        let Some(entry) = self.entries.get(self.cursor) else {
            return NavAction::None;
        };
        match entry.kind {
            EntryKind::Directory => match self.mode {
                NavMode::ExpandInPlace => {
                    let path = entry.path.clone();
                    self.toggle_path(&path);
                    NavAction::Rebuild
                }
                NavMode::ReplaceRoot => NavAction::ChangeRoot(entry.path.clone()),
            },
            EntryKind::File => NavAction::OpenFile(entry.path.clone()),
            EntryKind::Unreadable { .. } => NavAction::None,
        }
    }

    /// Flip the expansion state of any directory, visible or not.
    /// Returns `true` if it is now expanded.
    pub fn toggle_path(&mut self, path: &Path) -> bool {
        self.expansion.toggle(path)
    }

    /// Collapse the selected directory, or step out of it.
    ///
    /// In expand-in-place mode an expanded directory collapses; anything
    /// else moves the cursor to its parent row. In replace-root mode this
    /// asks to browse the root's parent.
    pub fn collapse_or_parent(&mut self) -> NavAction {
        if self.mode == NavMode::ReplaceRoot {
            return match self.root.parent() {
                Some(parent) => NavAction::ChangeRoot(parent.to_path_buf()),
                None => NavAction::None,
            };
        }

        let Some(entry) = self.entries.get(self.cursor) else {
            return NavAction::None;
        };

        if entry.is_dir() && self.is_expanded(&entry.path) {
            let path = entry.path.clone();
            self.expansion.collapse(&path);
            return NavAction::Rebuild;
        }

        let parent = match entry.unreadable_dir() {
            Some(dir) => Some(dir.to_path_buf()),
            None => entry.path.parent().map(Path::to_path_buf),
        };
        if let Some(parent) = parent {
            if let Some(idx) = self
                .entries
                .iter()
                .position(|e| e.is_dir() && e.path == parent)
            {
                self.cursor = idx;
            }
        }
        NavAction::None
    }

    /// Put the cursor on the row for `path`. Returns `false` if not visible.
    pub fn select_path(&mut self, path: &Path) -> bool {
        match self
            .entries
            .iter()
            .position(|e| e.path == path)
        {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    fn clamp_cursor(&mut self) {
        if self.entries.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len() - 1;
        }
    }
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::fs::reader::{ChildInfo, DirectoryReader, ReadError};

/// What a visible row stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Placeholder row for an expanded directory that could not be listed,
    /// or that would loop back onto one of its ancestors.
    Unreadable { dir: PathBuf, message: String },
}

/// A single visible row of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    /// Nesting level; children of the root are at depth 0.
    pub depth: usize,
    pub is_expanded: bool,
}

impl Entry {
    fn from_child(child: &ChildInfo, depth: usize, is_expanded: bool) -> Self {
        Self {
            path: child.path.clone(),
            name: child.name.clone(),
            kind: if child.is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            depth,
            is_expanded,
        }
    }

    /// Error row placed beneath `dir`. Its path is `dir/<name>`; nothing
    /// else under `dir` is listed, so the path stays unique.
    fn unreadable(dir: &Path, depth: usize, name: String, message: String) -> Self {
        Self {
            path: dir.join(&name),
            name,
            kind: EntryKind::Unreadable {
                dir: dir.to_path_buf(),
                message,
            },
            depth,
            is_expanded: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self.kind, EntryKind::Unreadable { .. })
    }

    /// The directory an error row stands in for.
    pub fn unreadable_dir(&self) -> Option<&Path> {
        match &self.kind {
            EntryKind::Unreadable { dir, .. } => Some(dir),
            _ => None,
        }
    }
}

/// Directories the user has chosen to open, keyed by absolute path.
///
/// Entries are never pruned: a path that disappears from disk simply
/// stops matching anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    expanded: HashSet<PathBuf>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// Flip the state of `path`. Returns `true` if it is now expanded.
    pub fn toggle(&mut self, path: &Path) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_path_buf());
            true
        }
    }

    #[allow(dead_code)]
    pub fn expand(&mut self, path: &Path) {
        self.expanded.insert(path.to_path_buf());
    }

    pub fn collapse(&mut self, path: &Path) {
        self.expanded.remove(path);
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// Flatten the visible part of the tree under `root` into display order.
///
/// Pre-order: each expanded directory is followed immediately by its own
/// children. Only a failure to list `root` itself is an error; an expanded
/// subdirectory that cannot be listed becomes a single unreadable row and
/// its siblings are still emitted.
pub fn flatten<R>(reader: &R, root: &Path, expansion: &ExpansionSet) -> Result<Vec<Entry>, ReadError>
where
    R: DirectoryReader + ?Sized,
{
    let children = reader.list_children(root)?;
    let mut items = Vec::with_capacity(children.len());
    let mut ancestry = HashSet::new();
    ancestry.insert(reader.identity(root));
    flatten_children(reader, children, 0, expansion, &mut ancestry, &mut items);
    Ok(items)
}

fn flatten_children<R>(
    reader: &R,
    children: Vec<ChildInfo>,
    depth: usize,
    expansion: &ExpansionSet,
    ancestry: &mut HashSet<PathBuf>,
    items: &mut Vec<Entry>,
) where
    R: DirectoryReader + ?Sized,
{
    for child in children {
        let expanded = child.is_dir && expansion.is_expanded(&child.path);
        items.push(Entry::from_child(&child, depth, expanded));
        if !expanded {
            continue;
        }

        // A directory already on the current descent would recurse forever.
        let identity = reader.identity(&child.path);
        if ancestry.contains(&identity) {
            log::warn!("not descending into {}: symlink cycle", child.path.display());
            items.push(Entry::unreadable(
                &child.path,
                depth + 1,
                "<symlink cycle>".to_string(),
                format!("{} links back to one of its parents", child.path.display()),
            ));
            continue;
        }

        match reader.list_children(&child.path) {
            Ok(grandchildren) => {
                ancestry.insert(identity.clone());
                flatten_children(reader, grandchildren, depth + 1, expansion, ancestry, items);
                ancestry.remove(&identity);
            }
            Err(err) => {
                log::warn!("{}", err);
                items.push(Entry::unreadable(
                    &child.path,
                    depth + 1,
                    format!("<{}>", err.kind),
                    err.to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::reader::fake::MemoryReader;
    use crate::fs::reader::{FsReader, ReadErrorKind};
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn scenario_reader() -> MemoryReader {
        MemoryReader::new()
            .dir("/a", &[("b", true), ("d.txt", false)])
            .dir("/a/b", &[("c.txt", false)])
    }

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        fs::create_dir(dir.path().join("alpha").join("nested")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        File::create(dir.path().join("alpha").join("nested").join("deep.md")).unwrap();
        dir
    }

    fn summary(items: &[Entry]) -> Vec<(String, usize, bool)> {
        items
            .iter()
            .map(|e| (e.name.clone(), e.depth, e.is_dir()))
            .collect()
    }

    /// Count rows reachable by descending only into expanded directories.
    fn reachable<R: DirectoryReader>(reader: &R, dir: &Path, expansion: &ExpansionSet) -> usize {
        let children = reader.list_children(dir).unwrap();
        children
            .iter()
            .map(|c| {
                if c.is_dir && expansion.is_expanded(&c.path) {
                    1 + reachable(reader, &c.path, expansion)
                } else {
                    1
                }
            })
            .sum()
    }

    #[test]
    fn collapsed_root_lists_immediate_children() {
        let items = flatten(&scenario_reader(), Path::new("/a"), &ExpansionSet::new()).unwrap();
        assert_eq!(
            summary(&items),
            vec![("b".into(), 0, true), ("d.txt".into(), 0, false)]
        );
        assert!(!items[0].is_expanded);
        assert_eq!(items[1].path, PathBuf::from("/a/d.txt"));
    }

    #[test]
    fn expanded_children_follow_their_parent() {
        let mut expansion = ExpansionSet::new();
        expansion.expand(Path::new("/a/b"));
        let items = flatten(&scenario_reader(), Path::new("/a"), &expansion).unwrap();
        assert_eq!(
            summary(&items),
            vec![
                ("b".into(), 0, true),
                ("c.txt".into(), 1, false),
                ("d.txt".into(), 0, false),
            ]
        );
        assert!(items[0].is_expanded);
        assert_eq!(items[1].path, PathBuf::from("/a/b/c.txt"));
    }

    #[test]
    fn expansion_below_collapsed_parent_is_hidden() {
        let dir = setup_test_dir();
        let mut expansion = ExpansionSet::new();
        expansion.expand(&dir.path().join("alpha").join("nested"));
        let items = flatten(&FsReader::default(), dir.path(), &expansion).unwrap();
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|e| e.depth == 0));
    }

    #[test]
    fn row_count_matches_reachable_entries() {
        let dir = setup_test_dir();
        let reader = FsReader::default();
        let alpha_buf = dir.path().join("alpha");
        let nested_buf = alpha_buf.join("nested");
        let beta_buf = dir.path().join("beta");
        let (alpha, nested, beta) = (alpha_buf.as_path(), nested_buf.as_path(), beta_buf.as_path());

        let sets: Vec<Vec<&Path>> = vec![
            vec![],
            vec![alpha],
            vec![nested],
            vec![alpha, nested],
            vec![alpha, nested, beta],
            vec![beta, nested],
        ];
        for paths in sets {
            let mut expansion = ExpansionSet::new();
            for p in &paths {
                expansion.expand(p);
            }
            let items = flatten(&reader, dir.path(), &expansion).unwrap();
            assert_eq!(
                items.len(),
                reachable(&reader, dir.path(), &expansion),
                "expanded: {:?}",
                paths
            );
        }
    }

    #[test]
    fn fully_expanded_tree_is_preorder() {
        let dir = setup_test_dir();
        let mut expansion = ExpansionSet::new();
        expansion.expand(&dir.path().join("alpha"));
        expansion.expand(&dir.path().join("alpha").join("nested"));
        let items = flatten(&FsReader::default(), dir.path(), &expansion).unwrap();
        let names: Vec<&str> = items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["alpha", "nested", "deep.md", "inner.txt", "beta", "file_a.txt", "file_b.rs"]
        );
        let depths: Vec<usize> = items.iter().map(|e| e.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 0, 0, 0]);
    }

    #[test]
    fn flatten_is_idempotent() {
        let dir = setup_test_dir();
        let mut expansion = ExpansionSet::new();
        expansion.expand(&dir.path().join("alpha"));
        let reader = FsReader::default();
        let first = flatten(&reader, dir.path(), &expansion).unwrap();
        let second = flatten(&reader, dir.path(), &expansion).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let reader = MemoryReader::new().fail("/a", ReadErrorKind::PermissionDenied);
        let err = flatten(&reader, Path::new("/a"), &ExpansionSet::new()).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::PermissionDenied);
        assert_eq!(err.path, PathBuf::from("/a"));
    }

    #[test]
    fn unreadable_subtree_becomes_inline_row() {
        let reader = MemoryReader::new()
            .dir("/r", &[("locked", true), ("open", true), ("z.txt", false)])
            .fail("/r/locked", ReadErrorKind::PermissionDenied)
            .dir("/r/open", &[("x", false)]);
        let mut expansion = ExpansionSet::new();
        expansion.expand(Path::new("/r/locked"));
        expansion.expand(Path::new("/r/open"));

        let items = flatten(&reader, Path::new("/r"), &expansion).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].name, "locked");
        assert!(items[1].is_unreadable());
        assert!(!items[1].is_dir());
        assert_eq!(items[1].depth, 1);
        assert_eq!(items[1].name, "<permission denied>");
        assert_eq!(
            items[1].kind,
            EntryKind::Unreadable {
                dir: PathBuf::from("/r/locked"),
                message: "cannot read /r/locked: permission denied".into(),
            }
        );
        assert_eq!(items[1].path, PathBuf::from("/r/locked/<permission denied>"));
        assert_eq!(items[2].name, "open");
        assert_eq!(items[3].name, "x");
        assert_eq!(items[4].name, "z.txt");
    }

    #[test]
    fn expanded_file_path_is_not_descended() {
        let reader = scenario_reader();
        let mut expansion = ExpansionSet::new();
        expansion.expand(Path::new("/a/d.txt"));
        let items = flatten(&reader, Path::new("/a"), &expansion).unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[1].is_expanded);
    }

    #[test]
    fn aliased_cycle_is_cut() {
        let reader = MemoryReader::new()
            .dir("/r", &[("sub", true)])
            .dir("/r/sub", &[("back", true)])
            .alias("/r/sub/back", "/r");
        let mut expansion = ExpansionSet::new();
        expansion.expand(Path::new("/r/sub"));
        expansion.expand(Path::new("/r/sub/back"));

        let items = flatten(&reader, Path::new("/r"), &expansion).unwrap();
        let names: Vec<&str> = items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sub", "back", "<symlink cycle>"]);
        assert_eq!(items[2].depth, 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_back_to_root_does_not_recurse() {
        let dir = setup_test_dir();
        let link = dir.path().join("alpha").join("loop");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();
        let mut expansion = ExpansionSet::new();
        expansion.expand(&dir.path().join("alpha"));
        expansion.expand(&link);

        let items = flatten(&FsReader::default(), dir.path(), &expansion).unwrap();
        let loop_idx = items.iter().position(|e| e.name == "loop").unwrap();
        assert!(items[loop_idx].is_expanded);
        assert!(items[loop_idx + 1].is_unreadable());
        assert_eq!(items[loop_idx + 1].unreadable_dir(), Some(link.as_path()));
        assert_eq!(items.len(), 8);
        assert_paths_unique(&items);
    }

    fn assert_paths_unique(items: &[Entry]) {
        let unique: HashSet<&Path> = items.iter().map(|e| e.path.as_path()).collect();
        assert_eq!(unique.len(), items.len(), "duplicate paths in {:?}", items);
    }

    #[test]
    fn row_paths_are_unique_with_error_and_cycle_rows() {
        let reader = MemoryReader::new()
            .dir("/r", &[("locked", true), ("sub", true), ("z.txt", false)])
            .fail("/r/locked", ReadErrorKind::PermissionDenied)
            .dir("/r/sub", &[("back", true), ("y.txt", false)])
            .alias("/r/sub/back", "/r");
        let mut expansion = ExpansionSet::new();
        expansion.expand(Path::new("/r/locked"));
        expansion.expand(Path::new("/r/sub"));
        expansion.expand(Path::new("/r/sub/back"));

        let items = flatten(&reader, Path::new("/r"), &expansion).unwrap();
        let names: Vec<&str> = items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "locked",
                "<permission denied>",
                "sub",
                "back",
                "<symlink cycle>",
                "y.txt",
                "z.txt"
            ]
        );
        assert_paths_unique(&items);
        assert_eq!(items[1].unreadable_dir(), Some(Path::new("/r/locked")));
        assert_eq!(items[4].unreadable_dir(), Some(Path::new("/r/sub/back")));
    }

    #[test]
    fn expansion_set_toggle() {
        let mut set = ExpansionSet::new();
        assert!(set.is_empty());
        assert!(set.toggle(Path::new("/x")));
        assert!(set.is_expanded(Path::new("/x")));
        assert!(!set.toggle(Path::new("/x")));
        assert!(!set.is_expanded(Path::new("/x")));
        assert_eq!(set.len(), 0);
    }
}

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::fs::{FsReader, ReadError};
use crate::metadata::{project_selection, MetadataView};
use crate::navigator::{NavAction, NavMode, Navigator};
use crate::preview::{Highlighter, PreviewOptions, PreviewState};
use crate::theme::{resolve_theme, ThemeColors};

/// Which panel receives movement keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Preview,
}

/// A transient message for the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Main application state.
pub struct App {
    pub navigator: Navigator<FsReader>,
    pub metadata: MetadataView,
    pub preview: PreviewState,
    /// `None` when the preview panel is disabled.
    pub highlighter: Option<Highlighter>,
    pub preview_options: PreviewOptions,
    pub theme: ThemeColors,
    pub indent_width: usize,
    pub use_icons: bool,
    pub focus: Focus,
    /// First visible tree row.
    pub tree_scroll: usize,
    /// Inner heights from the last render, used for paging.
    pub tree_height: usize,
    pub preview_height: usize,
    /// Set while the root itself cannot be listed.
    pub root_error: Option<ReadError>,
    pub status_message: Option<StatusMessage>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    /// Create a new App rooted at the given path and list it.
    pub fn new(path: &Path, config: &AppConfig) -> Self {
        let navigator = Navigator::new(config.reader(), path, config.mode());
        let highlighter = config
            .preview_enabled()
            .then(|| Highlighter::new(config.syntax_theme_name()));

        let mut app = Self {
            navigator,
            metadata: MetadataView::NoSelection,
            preview: PreviewState::default(),
            highlighter,
            preview_options: config.preview_options(),
            theme: resolve_theme(config.theme_scheme()),
            indent_width: config.indent_width(),
            use_icons: config.use_icons(),
            focus: Focus::Tree,
            tree_scroll: 0,
            tree_height: 0,
            preview_height: 0,
            root_error: None,
            status_message: None,
            show_help: false,
            should_quit: false,
        };
        let result = app.navigator.rebuild();
        app.after_rebuild(result);
        app
    }

    pub fn preview_enabled(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Record the outcome of a rebuild and re-project the selection.
    fn after_rebuild(&mut self, result: Result<(), ReadError>) {
        match result {
            Ok(()) => self.root_error = None,
            Err(err) => {
                self.set_error_message(err.to_string());
                self.root_error = Some(err);
            }
        }
        self.refresh_metadata();
    }

    fn refresh_metadata(&mut self) {
        self.metadata = project_selection(self.navigator.selected());
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn select_next(&mut self) {
        self.navigator.move_down();
        self.refresh_metadata();
    }

    pub fn select_previous(&mut self) {
        self.navigator.move_up();
        self.refresh_metadata();
    }

    pub fn select_first(&mut self) {
        self.navigator.select_first();
        self.refresh_metadata();
    }

    pub fn select_last(&mut self) {
        self.navigator.select_last();
        self.refresh_metadata();
    }

    pub fn page_down(&mut self) {
        self.navigator.page_down(self.tree_height.max(1));
        self.refresh_metadata();
    }

    pub fn page_up(&mut self) {
        self.navigator.page_up(self.tree_height.max(1));
        self.refresh_metadata();
    }

    /// Expand/collapse the selected directory or preview the selected file.
    pub fn activate_selected(&mut self) {
        let action = self.navigator.toggle_selected();
        self.perform(action);
    }

    /// Collapse the selected directory or step out to its parent.
    pub fn collapse_or_parent(&mut self) {
        let action = self.navigator.collapse_or_parent();
        self.perform(action);
    }

    fn perform(&mut self, action: NavAction) {
        match action {
            NavAction::None => self.refresh_metadata(),
            NavAction::Rebuild => {
                let result = self.navigator.rebuild();
                self.after_rebuild(result);
            }
            NavAction::ChangeRoot(new_root) => self.change_root(new_root),
            NavAction::OpenFile(path) => self.open_preview(&path),
        }
    }

    /// Browse `new_root`. Climbing out of a directory leaves the cursor on it.
    pub fn change_root(&mut self, new_root: PathBuf) {
        let previous = self.navigator.root().to_path_buf();
        let result = self.navigator.change_root(new_root);
        if result.is_ok() {
            self.navigator.select_path(&previous);
        }
        self.tree_scroll = 0;
        self.after_rebuild(result);
    }

    /// Re-read the tree from disk.
    pub fn refresh(&mut self) {
        let result = self.navigator.refresh();
        if result.is_ok() {
            self.set_status_message("Refreshed");
        }
        self.after_rebuild(result);
    }

    pub fn toggle_hidden(&mut self) {
        let reader = self.navigator.reader_mut();
        reader.show_hidden = !reader.show_hidden;
        let shown = reader.show_hidden;
        let result = self.navigator.refresh();
        self.after_rebuild(result);
        if self.root_error.is_none() {
            self.set_status_message(if shown {
                "Showing hidden files"
            } else {
                "Hiding hidden files"
            });
        }
    }

    pub fn cycle_sort(&mut self) {
        let reader = self.navigator.reader_mut();
        reader.sort_by = reader.sort_by.next();
        let label = reader.sort_by.label();
        let result = self.navigator.refresh();
        self.after_rebuild(result);
        if self.root_error.is_none() {
            self.set_status_message(format!("Sort: {}", label));
        }
    }

    /// Load `path` into the preview panel. Failures are shown there and in
    /// the status bar; the tree is unaffected.
    pub fn open_preview(&mut self, path: &Path) {
        let Some(highlighter) = &self.highlighter else {
            self.set_status_message("Preview is disabled");
            return;
        };
        match self.preview.open(path, highlighter, &self.preview_options) {
            Ok(()) => {
                if let Some(notice) = self.preview.notice.clone() {
                    self.set_status_message(format!("Preview: {}", notice));
                }
            }
            Err(err) => {
                log::warn!("{}", err);
                self.preview.show_error(&err);
                self.set_error_message(err.to_string());
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree if self.preview_enabled() => Focus::Preview,
            _ => Focus::Tree,
        };
    }

    pub fn scroll_preview_down(&mut self, rows: usize) {
        self.preview.scroll_down(rows, self.preview_height);
    }

    pub fn scroll_preview_up(&mut self, rows: usize) {
        self.preview.scroll_up(rows);
    }

    pub fn scroll_preview_top(&mut self) {
        self.preview.scroll_offset = 0;
    }

    pub fn scroll_preview_bottom(&mut self) {
        self.preview.scroll_down(self.preview.total_lines, self.preview_height);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Update the scroll offset to ensure the selected row is visible.
    pub fn update_tree_scroll(&mut self, visible_height: usize) {
        self.tree_height = visible_height;
        if visible_height == 0 {
            return;
        }
        let selected = self.navigator.cursor();
        if selected < self.tree_scroll {
            self.tree_scroll = selected;
        } else if selected >= self.tree_scroll + visible_height {
            self.tree_scroll = selected - visible_height + 1;
        }
    }

    pub fn mode(&self) -> NavMode {
        self.navigator.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::metadata::FileKind;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn setup_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::write(dir.path().join("alpha").join("inner.txt"), "inside\n").unwrap();
        fs::write(dir.path().join("file_a.txt"), "hello\nworld\n").unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        dir
    }

    fn setup_app() -> (TempDir, App) {
        let dir = setup_dir();
        let app = App::new(dir.path(), &AppConfig::default());
        (dir, app)
    }

    fn names(app: &App) -> Vec<String> {
        app.navigator
            .entries()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn new_app_lists_root() {
        let (_dir, app) = setup_app();
        assert_eq!(names(&app), vec!["alpha", "beta", "file_a.txt", "file_b.rs"]);
        assert!(app.root_error.is_none());
        match &app.metadata {
            MetadataView::Record(r) => {
                assert_eq!(r.name, "alpha");
                assert_eq!(r.kind, FileKind::Directory);
            }
            other => panic!("unexpected metadata: {:?}", other),
        }
    }

    #[test]
    fn selection_updates_metadata() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        match &app.metadata {
            MetadataView::Record(r) => assert_eq!(r.name, "file_b.rs"),
            other => panic!("unexpected metadata: {:?}", other),
        }
        app.select_first();
        app.select_next();
        app.select_previous();
        assert_eq!(app.navigator.cursor(), 0);
    }

    #[test]
    fn activate_expands_then_previews() {
        let (dir, mut app) = setup_app();
        app.activate_selected();
        assert_eq!(
            names(&app),
            vec!["alpha", "inner.txt", "beta", "file_a.txt", "file_b.rs"]
        );
        app.select_next();
        app.activate_selected();
        assert_eq!(
            app.preview.path.as_deref(),
            Some(dir.path().join("alpha").join("inner.txt").as_path())
        );
        assert_eq!(app.preview.total_lines, 1);
    }

    #[test]
    fn collapse_returns_to_parent_row() {
        let (_dir, mut app) = setup_app();
        app.activate_selected();
        app.select_next();
        app.collapse_or_parent();
        assert_eq!(app.navigator.cursor(), 0);
        app.collapse_or_parent();
        assert_eq!(names(&app).len(), 4);
    }

    #[test]
    fn replace_root_mode_drills_and_climbs() {
        let dir = setup_dir();
        let config = AppConfig {
            tree: TreeConfig {
                mode: Some("replace-root".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut app = App::new(dir.path(), &config);
        app.activate_selected();
        assert_eq!(app.navigator.root(), dir.path().join("alpha").as_path());
        assert_eq!(names(&app), vec!["inner.txt"]);

        app.collapse_or_parent();
        assert_eq!(app.navigator.root(), dir.path());
        assert_eq!(app.navigator.selected().unwrap().name, "alpha");
    }

    #[test]
    fn toggle_hidden_changes_count() {
        let (_dir, mut app) = setup_app();
        let without_hidden = app.navigator.entries().len();
        app.toggle_hidden();
        assert!(app.navigator.entries().len() > without_hidden);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn cycle_sort_reports_label() {
        let (_dir, mut app) = setup_app();
        app.cycle_sort();
        assert_eq!(app.status_message.as_ref().unwrap().text, "Sort: Size");
    }

    #[test]
    fn vanished_root_shows_error_banner() {
        let (dir, mut app) = setup_app();
        let root = dir.path().to_path_buf();
        drop(dir);
        app.refresh();
        assert!(app.root_error.is_some());
        assert!(app.navigator.entries().is_empty());
        assert_eq!(app.metadata, MetadataView::NoSelection);
        let msg = app.status_message.as_ref().unwrap();
        assert!(msg.is_error);
        assert!(msg.text.contains(&root.display().to_string()));
    }

    #[test]
    fn preview_failure_is_reported_not_fatal() {
        let (dir, mut app) = setup_app();
        app.open_preview(&dir.path().join("missing.txt"));
        assert!(app.status_message.as_ref().unwrap().is_error);
        assert_eq!(app.preview.total_lines, 1);
        assert_eq!(names(&app).len(), 4);
    }

    #[test]
    fn disabled_preview_keeps_focus_on_tree() {
        let dir = setup_dir();
        let config: AppConfig = toml::from_str("[preview]\nenabled = false\n").unwrap();
        let mut app = App::new(dir.path(), &config);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Tree);
        app.open_preview(&dir.path().join("file_a.txt"));
        assert!(app.preview.path.is_none());
    }

    #[test]
    fn focus_toggles_between_panels() {
        let (_dir, mut app) = setup_app();
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Preview);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Tree);
    }

    #[test]
    fn preview_scrolls_within_bounds() {
        let dir = setup_dir();
        let content: String = (0..40).map(|i| format!("row {i}\n")).collect();
        fs::write(dir.path().join("long.txt"), content).unwrap();
        let mut app = App::new(dir.path(), &AppConfig::default());
        app.preview_height = 10;
        app.open_preview(&dir.path().join("long.txt"));

        app.scroll_preview_bottom();
        assert_eq!(app.preview.scroll_offset, 30);
        app.scroll_preview_up(5);
        assert_eq!(app.preview.scroll_offset, 25);
        app.scroll_preview_top();
        assert_eq!(app.preview.scroll_offset, 0);
    }

    #[test]
    fn tree_scroll_follows_cursor() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        app.update_tree_scroll(2);
        assert_eq!(app.tree_scroll, 2);
        app.select_first();
        app.update_tree_scroll(2);
        assert_eq!(app.tree_scroll, 0);
    }

    #[test]
    fn quit_sets_flag() {
        let (_dir, mut app) = setup_app();
        assert!(!app.should_quit);
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn clear_expired_status_removes_old() {
        let (_dir, mut app) = setup_app();
        app.set_status_message("fresh");
        app.clear_expired_status();
        assert!(app.status_message.is_some());
        app.status_message = Some(StatusMessage {
            text: "old".into(),
            is_error: false,
            created: Instant::now() - std::time::Duration::from_secs(5),
        });
        app.clear_expired_status();
        assert!(app.status_message.is_none());
    }
}

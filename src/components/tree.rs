use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::{Entry, EntryKind};
use crate::theme::ThemeColors;

/// Renders the flattened tree, one row per entry, indented by depth.
pub struct TreeWidget<'a> {
    entries: &'a [Entry],
    cursor: usize,
    scroll: usize,
    theme: &'a ThemeColors,
    indent_width: usize,
    use_icons: bool,
    empty_message: Option<&'a str>,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(entries: &'a [Entry], cursor: usize, theme: &'a ThemeColors) -> Self {
        Self {
            entries,
            cursor,
            scroll: 0,
            theme,
            indent_width: 2,
            use_icons: false,
            empty_message: None,
            block: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    /// Shown in place of rows when there are none.
    pub fn empty_message(mut self, msg: &'a str) -> Self {
        self.empty_message = Some(msg);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn indicator(&self, entry: &Entry) -> &'static str {
        if self.use_icons {
            match entry.kind {
                EntryKind::Directory if entry.is_expanded => "\u{f07c} ",
                EntryKind::Directory => "\u{f07b} ",
                EntryKind::File => file_icon_by_ext(&entry.name),
                EntryKind::Unreadable { .. } => "\u{f071} ",
            }
        } else {
            match entry.kind {
                EntryKind::Directory if entry.is_expanded => "v ",
                EntryKind::Directory => "> ",
                EntryKind::File => "  ",
                EntryKind::Unreadable { .. } => "! ",
            }
        }
    }

    fn style_for(&self, entry: &Entry, is_selected: bool) -> Style {
        if is_selected {
            return Style::default()
                .bg(self.theme.tree_selected_bg)
                .fg(self.theme.tree_selected_fg)
                .add_modifier(Modifier::BOLD);
        }
        match entry.kind {
            EntryKind::Directory => Style::default()
                .fg(self.theme.tree_dir_fg)
                .add_modifier(Modifier::BOLD),
            EntryKind::File => Style::default().fg(self.theme.tree_file_fg),
            EntryKind::Unreadable { .. } => Style::default()
                .fg(self.theme.error_fg)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

/// Nerd Font icon for a file, by extension.
fn file_icon_by_ext(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "rs" => "\u{e7a8} ",
        "py" => "\u{e73c} ",
        "js" | "jsx" | "ts" | "tsx" => "\u{e74e} ",
        "go" => "\u{e626} ",
        "c" | "h" | "cpp" | "hpp" | "cc" => "\u{e61e} ",
        "json" | "toml" | "yaml" | "yml" | "ini" => "\u{e615} ",
        "md" | "markdown" | "txt" => "\u{f48a} ",
        "sh" | "bash" | "zsh" | "fish" => "\u{f489} ",
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => "\u{f1c5} ",
        "zip" | "tar" | "gz" | "xz" | "7z" => "\u{f410} ",
        "lock" => "\u{f023} ",
        _ => "\u{f15b} ",
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner_area.height as usize;
        if visible_height == 0 || inner_area.width == 0 {
            return;
        }

        if self.entries.is_empty() {
            let msg = self.empty_message.unwrap_or("(empty)");
            let line = Line::from(Span::styled(msg, Style::default().fg(self.theme.dim_fg)));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        let visible = self
            .entries
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible_height);

        for (row, (idx, entry)) in visible.enumerate() {
            let y = inner_area.y + row as u16;
            let indent = " ".repeat(entry.depth * self.indent_width);
            let style = self.style_for(entry, idx == self.cursor);
            let content = format!("{}{}{}", indent, self.indicator(entry), entry.name);

            // Pad so the selection highlight spans the whole row.
            let padded = format!("{:<width$}", content, width = inner_area.width as usize);
            let line = Line::from(Span::styled(padded, style));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}

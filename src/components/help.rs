use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A group of key bindings shown under one heading.
struct KeyCategory {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Tree",
        entries: &[
            ("j / ↓", "Move down"),
            ("k / ↑", "Move up"),
            ("g / Home", "First row"),
            ("G / End", "Last row"),
            ("PgUp / PgDn", "Move by a page"),
            ("Enter / l / →", "Open directory or preview file"),
            ("h / ←", "Collapse, or go to parent"),
        ],
    },
    KeyCategory {
        name: "View",
        entries: &[
            (".", "Toggle hidden files"),
            ("s", "Cycle sort order"),
            ("r / F5", "Refresh from disk"),
            ("Tab", "Switch focus tree / preview"),
        ],
    },
    KeyCategory {
        name: "Preview",
        entries: &[
            ("j / k", "Scroll one line"),
            ("PgUp / PgDn", "Scroll one page"),
            ("g / G", "Top / bottom"),
        ],
    },
    KeyCategory {
        name: "General",
        entries: &[("?", "Toggle this help"), ("q / Ctrl+C", "Quit")],
    },
];

/// Centered key reference popup.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors) -> Self {
        Self { theme }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let heading = Style::default()
            .fg(self.theme.info_fg)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default()
            .fg(self.theme.warning_fg)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.tree_file_fg);

        for category in CATEGORIES {
            lines.push(Line::from(Span::styled(category.name, heading)));
            for (key, description) in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<16}", key), key_style),
                    Span::styled(description.to_string(), desc_style),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content = self.build_content_lines();
        let width = (area.width as f32 * 0.7).clamp(20.0, 60.0) as u16;
        let height = (content.len() as u16 + 2).min(area.height);
        let width = width.min(area.width);

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width, height);

        Clear.render(popup, buf);
        let block = Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.status_bg));
        let inner = block.inner(popup);
        block.render(popup, buf);

        for (i, line) in content.iter().take(inner.height as usize).enumerate() {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    #[test]
    fn all_categories_have_entries() {
        for cat in CATEGORIES {
            assert!(!cat.entries.is_empty(), "category '{}' has no entries", cat.name);
        }
    }

    #[test]
    fn renders_centered_popup() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 80, 30);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&tc).render(area, &mut buf);

        let screen: String = (0..30)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .map(|pos| buf.cell(pos).unwrap().symbol().to_string())
            .collect();
        assert!(screen.contains("Keys"));
        assert!(screen.contains("Toggle hidden files"));
        assert!(screen.contains("Press ? or Esc to close"));
        // Left margin stays untouched.
        assert_eq!(buf.cell((0, 15)).unwrap().symbol(), " ");
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&tc).render(area, &mut buf);
    }
}

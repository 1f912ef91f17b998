use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::preview::PreviewState;
use crate::theme::ThemeColors;

/// Preview widget that renders file content in the preview panel.
pub struct PreviewWidget<'a> {
    preview_state: &'a PreviewState,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(preview_state: &'a PreviewState, theme: &'a ThemeColors) -> Self {
        Self {
            preview_state,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }
}

impl<'a> Widget for PreviewWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let state = self.preview_state;
        if state.content_lines.is_empty() {
            let line = Line::from(Span::styled(
                "No file selected",
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        // The notice, if any, takes the bottom row.
        let mut content_height = inner.height as usize;
        if let Some(notice) = &state.notice {
            if inner.height > 1 {
                content_height -= 1;
                let line = Line::from(Span::styled(
                    format!("-- {} --", notice),
                    Style::default()
                        .fg(self.theme.warning_fg)
                        .add_modifier(Modifier::ITALIC),
                ));
                buf.set_line(inner.x, inner.y + content_height as u16, &line, inner.width);
            }
        }

        let start = state.scroll_offset.min(state.content_lines.len());
        let end = (start + content_height).min(state.content_lines.len());
        for (i, line) in state.content_lines[start..end].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

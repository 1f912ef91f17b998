use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " j/k:move  enter:open  h:back  .:hidden  s:sort  r:refresh  q:quit ";

/// One-line bar: root path, position and mode, or a transient message.
pub struct StatusBarWidget<'a> {
    root: &'a str,
    position: &'a str,
    mode: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(root: &'a str, position: &'a str, mode: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            root,
            position,
            mode,
            theme,
            status_message: None,
            is_error: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

/// Keep the last `max` characters, marking the cut with "...".
fn truncate_left(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().skip(len - max).collect();
    }
    let tail: String = s.chars().skip(len - (max - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };
            let display: String = format!("{:<width$}", msg, width = width)
                .chars()
                .take(width)
                .collect();
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // [root] ... [position | mode] [hints]
        let info = format!(" {} | {} ", self.position, self.mode);
        let hints = if width > info.len() + KEY_HINTS.len() + 10 {
            KEY_HINTS
        } else {
            ""
        };
        let root_budget = width
            .saturating_sub(info.chars().count())
            .saturating_sub(hints.len());
        let root_display = truncate_left(self.root, root_budget);
        let pad = root_budget.saturating_sub(root_display.chars().count());

        let spans = vec![
            Span::styled(root_display, Style::default().fg(self.theme.status_fg)),
            Span::raw(" ".repeat(pad)),
            Span::styled(
                info,
                Style::default()
                    .fg(self.theme.info_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                hints,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ),
        ];

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

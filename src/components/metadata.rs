use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::metadata::MetadataView;
use crate::theme::ThemeColors;

/// Label/value panel for the selected entry.
pub struct MetadataWidget<'a> {
    view: &'a MetadataView,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> MetadataWidget<'a> {
    pub fn new(view: &'a MetadataView, theme: &'a ThemeColors) -> Self {
        Self {
            view,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }
}

impl<'a> Widget for MetadataWidget<'a> {
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

        let lines: Vec<Line> = match self.view {
            MetadataView::NoSelection => vec![Line::from(Span::styled(
                "Nothing selected",
                Style::default().fg(self.theme.dim_fg),
            ))],
            MetadataView::Unavailable(err) => vec![Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(self.theme.error_fg),
            ))],
            MetadataView::Record(record) => {
                let fields = record.fields();
                let label_width = fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
                let label_style = Style::default()
                    .fg(self.theme.meta_label_fg)
                    .add_modifier(Modifier::BOLD);
                let value_style = Style::default().fg(self.theme.meta_value_fg);
                fields
                    .into_iter()
                    .map(|(label, value)| {
                        Line::from(vec![
                            Span::styled(
                                format!("{:<width$}  ", label, width = label_width),
                                label_style,
                            ),
                            Span::styled(value, value_style),
                        ])
                    })
                    .collect()
            }
        };

        for (i, line) in lines.iter().take(inner.height as usize).enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FileKind, MetadataRecord, StatError};
    use crate::theme;
    use std::path::PathBuf;

    fn row(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn renders_record_fields() {
        let view = MetadataView::Record(MetadataRecord {
            name: "notes.txt".into(),
            kind: FileKind::File,
            size_bytes: 2048,
            modified_at: None,
            full_path: PathBuf::from("/home/u/notes.txt"),
            permissions: Some("rw-r--r--".into()),
        });
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        MetadataWidget::new(&view, &tc).render(area, &mut buf);

        assert!(row(&buf, 0, 40).starts_with("Name         notes.txt"));
        assert!(row(&buf, 1, 40).contains("File"));
        assert!(row(&buf, 2, 40).contains("2.00 KB"));
        assert!(row(&buf, 3, 40).contains("Unknown"));
        assert!(row(&buf, 4, 40).contains("rw-r--r--"));
        assert!(row(&buf, 5, 40).contains("/home/u/notes.txt"));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, tc.meta_label_fg);
    }

    #[test]
    fn renders_placeholder_without_selection() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        MetadataWidget::new(&MetadataView::NoSelection, &tc).render(area, &mut buf);
        assert!(row(&buf, 0, 30).contains("Nothing selected"));
    }

    #[test]
    fn renders_stat_error() {
        let view = MetadataView::Unavailable(StatError {
            path: PathBuf::from("/gone"),
            message: "cannot stat /gone: not found".into(),
        });
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        MetadataWidget::new(&view, &tc).render(area, &mut buf);
        assert!(row(&buf, 0, 40).contains("cannot stat /gone: not found"));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, tc.error_fg);
    }
}

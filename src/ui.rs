use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, Focus};
use crate::components::help::HelpOverlay;
use crate::components::metadata::MetadataWidget;
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::navigator::NavState;

/// Height of the metadata panel, borders included.
const METADATA_HEIGHT: u16 = 8;
/// Share of the width given to the preview panel.
const PREVIEW_PERCENT: u16 = 65;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let (left, preview_area) = if app.preview_enabled() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - PREVIEW_PERCENT),
                Constraint::Percentage(PREVIEW_PERCENT),
            ])
            .split(rows[0]);
        (cols[0], Some(cols[1]))
    } else {
        (rows[0], None)
    };

    let left_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(METADATA_HEIGHT)])
        .split(left);

    render_tree(app, frame, left_rows[0]);

    let metadata_block = panel_block(app, " Info ", false);
    frame.render_widget(
        MetadataWidget::new(&app.metadata, &app.theme).block(metadata_block),
        left_rows[1],
    );

    if let Some(preview_area) = preview_area {
        app.preview_height = preview_area.height.saturating_sub(2) as usize;
        let title = match app.preview.path.as_ref().and_then(|p| p.file_name()) {
            Some(name) => format!(" {} ", name.to_string_lossy()),
            None => " Preview ".to_string(),
        };
        let block = panel_block(app, &title, app.focus == Focus::Preview);
        frame.render_widget(
            PreviewWidget::new(&app.preview, &app.theme).block(block),
            preview_area,
        );
    }

    render_status_bar(app, frame, rows[1]);

    if app.show_help {
        frame.render_widget(HelpOverlay::new(&app.theme), area);
    }
}

fn panel_block<'a>(app: &App, title: &str, focused: bool) -> Block<'a> {
    let color = if focused {
        app.theme.border_focused_fg
    } else {
        app.theme.border_fg
    };
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn render_tree(app: &mut App, frame: &mut Frame, area: Rect) {
    // Keep the selected row visible; borders take two rows.
    app.update_tree_scroll(area.height.saturating_sub(2) as usize);

    let root = app.navigator.root();
    let title = format!(
        " {} ",
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string())
    );
    let block = panel_block(app, &title, app.focus == Focus::Tree);
    let empty_message = app.root_error.as_ref().map(|e| e.to_string());

    let mut widget = TreeWidget::new(app.navigator.entries(), app.navigator.cursor(), &app.theme)
        .scroll(app.tree_scroll)
        .indent_width(app.indent_width)
        .use_icons(app.use_icons)
        .block(block);
    if let Some(msg) = empty_message.as_deref() {
        widget = widget.empty_message(msg);
    }
    frame.render_widget(widget, area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let root = app.navigator.root().display().to_string();
    let position = match app.navigator.state() {
        NavState::Empty => "0/0".to_string(),
        NavState::Populated => format!(
            "{}/{}",
            app.navigator.cursor() + 1,
            app.navigator.entries().len()
        ),
    };
    let mode = format!(
        "{} | {}",
        app.mode().label(),
        app.navigator.reader().sort_by.label().to_lowercase()
    );

    // The root error stays up after the transient message expires.
    let banner = app.root_error.as_ref().map(|e| e.to_string());

    let mut widget = StatusBarWidget::new(&root, &position, &mode, &app.theme);
    if let Some(msg) = &app.status_message {
        widget = widget.status_message(&msg.text, msg.is_error);
    } else if let Some(banner) = banner.as_deref() {
        widget = widget.status_message(banner, true);
    }
    frame.render_widget(widget, area);
}

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('r') | KeyCode::F(5) => app.refresh(),
        KeyCode::Char('.') => app.toggle_hidden(),
        KeyCode::Char('s') => app.cycle_sort(),
        _ => match app.focus {
            Focus::Tree => handle_tree_key(app, key),
            Focus::Preview => handle_preview_key(app, key),
        },
    }
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.activate_selected(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.collapse_or_parent(),
        _ => {}
    }
}

fn handle_preview_key(app: &mut App, key: KeyEvent) {
    let page = app.preview_height.max(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_preview_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_preview_up(1),
        KeyCode::PageDown => app.scroll_preview_down(page),
        KeyCode::PageUp => app.scroll_preview_up(page),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_preview_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_preview_bottom(),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => app.focus = Focus::Tree,
        _ => {}
    }
}

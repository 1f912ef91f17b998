use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;

/// Default max file size read in full (1 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 1_048_576;
/// Default number of lines shown from a file above the size limit.
pub const DEFAULT_MAX_LINES: usize = 500;
/// Default syntect theme.
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

const TAB_WIDTH: usize = 4;

/// A file could not be loaded for preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot preview {}: {}", .path.display(), .message)]
pub struct PreviewError {
    pub path: PathBuf,
    pub message: String,
}

impl PreviewError {
    fn new(path: &Path, err: impl std::fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Limits applied when loading a file.
#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    pub max_bytes: u64,
    pub max_lines: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Syntax definitions and the color theme, loaded once at startup.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Load a theme from the built-in theme set by name, with fallback.
    pub fn new(theme_name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                log::warn!("unknown syntax theme {:?}, using {}", theme_name, DEFAULT_SYNTAX_THEME);
                themes.remove(DEFAULT_SYNTAX_THEME).unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme,
        }
    }

    fn syntax_for(&self, path: &Path, first_line: &str) -> &SyntaxReference {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .or_else(|| self.syntax_set.find_syntax_by_first_line(first_line))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Highlight `text` into numbered lines.
    fn highlight(&self, path: &Path, text: &str, total_lines: usize) -> Vec<Line<'static>> {
        let first_line = text.lines().next().unwrap_or("");
        let mut highlighter = HighlightLines::new(self.syntax_for(path, first_line), &self.theme);
        let number_width = total_lines.max(1).to_string().len();

        text.lines()
            .enumerate()
            .map(|(i, raw)| {
                let line_str = expand_tabs(raw);
                let mut spans = vec![Span::styled(
                    format!("{:>width$} │ ", i + 1, width = number_width),
                    Style::default().fg(Color::DarkGray),
                )];
                match highlighter.highlight_line(&line_str, &self.syntax_set) {
                    Ok(ranges) => {
                        for (style, piece) in ranges {
                            let fg = style.foreground;
                            spans.push(Span::styled(
                                piece.to_string(),
                                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                            ));
                        }
                    }
                    Err(_) => spans.push(Span::raw(line_str.clone())),
                }
                Line::from(spans)
            })
            .collect()
    }
}

/// Content of the preview panel.
#[derive(Debug, Default)]
pub struct PreviewState {
    /// File currently shown, if any.
    pub path: Option<PathBuf>,
    pub content_lines: Vec<Line<'static>>,
    pub total_lines: usize,
    pub scroll_offset: usize,
    /// Set when only part of the file is shown, or it is not text.
    pub notice: Option<String>,
}

impl PreviewState {
    /// Load `path` into the panel, replacing what was there.
    ///
    /// Binary files get a notice instead of content. Files above
    /// `max_bytes` are cut off after `max_lines` lines.
    pub fn open(
        &mut self,
        path: &Path,
        highlighter: &Highlighter,
        options: &PreviewOptions,
    ) -> Result<(), PreviewError> {
        self.clear();
        let metadata = fs::metadata(path).map_err(|e| PreviewError::new(path, e))?;
        if metadata.is_dir() {
            return Err(PreviewError::new(path, "is a directory"));
        }

        let file = fs::File::open(path).map_err(|e| PreviewError::new(path, e))?;
        let mut reader = BufReader::new(file);

        if is_binary(&mut reader).map_err(|e| PreviewError::new(path, e))? {
            self.path = Some(path.to_path_buf());
            self.notice = Some("binary file".to_string());
            self.content_lines = vec![Line::from(Span::styled(
                "[binary file, not shown]",
                Style::default().fg(Color::DarkGray),
            ))];
            self.total_lines = 1;
            return Ok(());
        }

        let text = if metadata.len() > options.max_bytes {
            // Both caps apply; a single long line stops at max_bytes.
            let mut limited = reader.take(options.max_bytes);
            let mut kept = String::new();
            let mut buf = Vec::new();
            let mut lines = 0;
            while lines < options.max_lines {
                buf.clear();
                let n = limited
                    .read_until(b'\n', &mut buf)
                    .map_err(|e| PreviewError::new(path, e))?;
                if n == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&buf);
                kept.push_str(line.trim_end_matches(['\n', '\r']));
                kept.push('\n');
                lines += 1;
            }
            self.notice = Some(if lines == options.max_lines {
                format!("showing first {} lines", options.max_lines)
            } else {
                format!("showing first {} bytes", options.max_bytes)
            });
            kept
        } else {
            let mut bytes = Vec::with_capacity(metadata.len() as usize);
            reader
                .read_to_end(&mut bytes)
                .map_err(|e| PreviewError::new(path, e))?;
            String::from_utf8_lossy(&bytes).into_owned()
        };

        let total = text.lines().count();
        self.content_lines = highlighter.highlight(path, &text, total);
        if self.content_lines.is_empty() {
            self.content_lines.push(Line::from(Span::styled(
                "(empty file)",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        self.total_lines = self.content_lines.len();
        self.path = Some(path.to_path_buf());
        log::debug!("previewing {} ({} lines)", path.display(), self.total_lines);
        Ok(())
    }

    /// Show a load failure in place of content.
    pub fn show_error(&mut self, err: &PreviewError) {
        self.clear();
        self.path = Some(err.path.clone());
        self.content_lines = vec![Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        ))];
        self.total_lines = 1;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn scroll_down(&mut self, rows: usize, visible_height: usize) {
        let max_offset = self.total_lines.saturating_sub(visible_height.max(1));
        self.scroll_offset = (self.scroll_offset + rows).min(max_offset);
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }
}

/// Scan the start of the stream for NUL bytes without consuming it.
fn is_binary<R: BufRead>(reader: &mut R) -> std::io::Result<bool> {
    let buf = reader.fill_buf()?;
    let n = buf.len().min(8192);
    Ok(buf[..n].contains(&0))
}

fn expand_tabs(line: &str) -> String {
    if line.contains('\t') {
        line.replace('\t', &" ".repeat(TAB_WIDTH))
    } else {
        line.to_string()
    }
}

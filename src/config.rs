//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--mode`, `--no-preview`, `--theme`, etc.)
//! 2. Explicit `--config` file
//! 3. `$TREENAV_CONFIG` environment variable (path to config file)
//! 4. Project-local `.treenav.toml` in the current working directory
//! 5. Global `~/.config/treenav/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::{FsReader, SortBy};
use crate::navigator::NavMode;
use crate::preview::{PreviewOptions, DEFAULT_MAX_BYTES, DEFAULT_MAX_LINES, DEFAULT_SYNTAX_THEME};

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Show hidden files by default.
    pub show_hidden: Option<bool>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Interaction mode: "expand" or "replace-root".
    pub mode: Option<String>,
    /// Sort order: "name", "size", "modified".
    pub sort_by: Option<String>,
    /// Directories always listed first.
    pub dirs_first: Option<bool>,
    /// Columns of indentation per nesting level.
    pub indent_width: Option<usize>,
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

/// Preview panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Whether the preview panel is enabled.
    pub enabled: Option<bool>,
    /// Files larger than this are only partially shown.
    pub max_bytes: Option<u64>,
    /// Lines shown from files above `max_bytes`.
    pub max_lines: Option<usize>,
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

/// Log output settings. Nothing is logged unless `file` is set.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub preview: PreviewConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

/// Default indentation per nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that one is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TREENAV_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".treenav.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("treenav").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file.
///
/// A missing file yields `Ok(None)`; an unreadable or malformed one yields
/// a warning message for the caller to report.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("failed to read config file {}: {}", path.display(), e)),
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
            },
            tree: TreeConfig {
                mode: other.tree.mode.clone().or(self.tree.mode),
                sort_by: other.tree.sort_by.clone().or(self.tree.sort_by),
                dirs_first: other.tree.dirs_first.or(self.tree.dirs_first),
                indent_width: other.tree.indent_width.or(self.tree.indent_width),
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            preview: PreviewConfig {
                enabled: other.preview.enabled.or(self.preview.enabled),
                max_bytes: other.preview.max_bytes.or(self.preview.max_bytes),
                max_lines: other.preview.max_lines.or(self.preview.max_lines),
                syntax_theme: other
                    .preview
                    .syntax_theme
                    .clone()
                    .or(self.preview.syntax_theme),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    /// Returns the config plus any warnings about unreadable files; these are
    /// collected rather than printed because logging is configured from the
    /// result.
    pub fn load(
        cli_config_path: Option<&Path>,
        cli_overrides: Option<&AppConfig>,
    ) -> (AppConfig, Vec<String>) {
        let mut config = AppConfig::default();
        let mut warnings = Vec::new();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        let mut files: Vec<PathBuf> = candidate_paths().into_iter().rev().collect();
        if let Some(cli_path) = cli_config_path {
            files.push(cli_path.to_path_buf());
        }

        for path in &files {
            match load_file(path) {
                Ok(Some(file_cfg)) => config = config.merge(&file_cfg),
                Ok(None) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        (config, warnings)
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    /// Interaction mode; unknown names fall back to expand-in-place.
    pub fn mode(&self) -> NavMode {
        self.tree
            .mode
            .as_deref()
            .and_then(NavMode::parse)
            .unwrap_or_default()
    }

    pub fn sort_by(&self) -> SortBy {
        SortBy::parse(self.tree.sort_by.as_deref().unwrap_or("name"))
    }

    pub fn dirs_first(&self) -> bool {
        self.tree.dirs_first.unwrap_or(true)
    }

    pub fn indent_width(&self) -> usize {
        self.tree.indent_width.unwrap_or(DEFAULT_INDENT_WIDTH)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(false)
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview.enabled.unwrap_or(true)
    }

    pub fn preview_options(&self) -> PreviewOptions {
        PreviewOptions {
            max_bytes: self.preview.max_bytes.unwrap_or(DEFAULT_MAX_BYTES),
            max_lines: self.preview.max_lines.unwrap_or(DEFAULT_MAX_LINES),
        }
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.preview
            .syntax_theme
            .as_deref()
            .unwrap_or(DEFAULT_SYNTAX_THEME)
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log.file.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("info")
    }

    /// Filesystem reader configured from the tree and general sections.
    pub fn reader(&self) -> FsReader {
        FsReader {
            show_hidden: self.show_hidden(),
            sort_by: self.sort_by(),
            dirs_first: self.dirs_first(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

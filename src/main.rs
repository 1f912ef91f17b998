mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod metadata;
mod navigator;
mod preview;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LogConfig, PreviewConfig, ThemeConfig, TreeConfig};
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Browse a directory tree in the terminal.
#[derive(Parser, Debug)]
#[command(name = "treenav", version, about)]
struct Cli {
    /// Root directory to browse (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Config file to load on top of the default locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How directories open: expand in place, or become the new root
    #[arg(long, value_parser = ["expand", "replace-root"])]
    mode: Option<String>,

    /// Show dotfiles
    #[arg(long)]
    show_hidden: bool,

    /// Disable the preview panel
    #[arg(long)]
    no_preview: bool,

    /// Color scheme
    #[arg(long, value_parser = ["dark", "light"])]
    theme: Option<String>,

    /// Append log records to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags that were given, as a partial config that wins over files.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.show_hidden.then_some(true),
            },
            tree: TreeConfig {
                mode: self.mode.clone(),
                ..Default::default()
            },
            preview: PreviewConfig {
                enabled: self.no_preview.then_some(false),
                ..Default::default()
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
            },
            log: LogConfig {
                file: self.log_file.clone(),
                level: self.log_level.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    let path = cli.path.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    if !path.is_dir() {
        return Err(error::AppError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    let (config, warnings) = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    logging::init(config.log_file(), config.log_level())?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut app = App::new(&path, &config);
    if let Some(first) = warnings.first() {
        app.set_error_message(first.clone());
    }
    let mut events = EventHandler::new(Duration::from_millis(250));

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    log::info!("exiting");
    Ok(())
}

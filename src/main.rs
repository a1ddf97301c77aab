use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{fs, io, path::Path, sync::Mutex, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;

use app::prompt::TerminalBell;
use app::storage::Storage;
use config::Config;

// Start the app.
pub fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let log_path = config.log_path();
    init_tracing(&log_path, config.verbose)?;

    // Initialize connection to the database
    let db_path = config.db_path();
    ensure_parent_dir(&db_path)?;
    let storage = Storage::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    storage
        .create_table_if_not_exists()
        .context("failed to initialize the task table")?;
    info!(db = %db_path.display(), view = ?config.view, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with 250 ms tick
    let tick_rate = Duration::from_millis(250);
    let app = app::ui::App::new(&storage, config.view, Box::new(TerminalBell));
    let res = app::ui::run_app(&mut terminal, app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        println!("{err:?}");
    }

    Ok(())
}

// Logs go to a file; RUST_LOG overrides the -v count
fn init_tracing(log_path: &Path, verbose: u8) -> anyhow::Result<()> {
    ensure_parent_dir(log_path)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> error::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

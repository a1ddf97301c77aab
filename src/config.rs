//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

use crate::app::models::ListFilter;

const DB_FILE_NAME: &str = "mstodo_simple_v1.db";
const LOG_FILE_NAME: &str = "myday.log";

/// A small to-do list for the terminal, backed by a local SQLite file.
#[derive(Debug, Parser)]
#[command(name = "myday", version, about)]
pub struct Config {
    /// Database file (defaults to the user data directory)
    #[arg(long, env = "MYDAY_DB")]
    pub db: Option<PathBuf>,

    /// Log file; the terminal itself is owned by the UI
    #[arg(long, env = "MYDAY_LOG")]
    pub log_file: Option<PathBuf>,

    /// View shown at start
    #[arg(long, value_enum, default_value_t = ListFilter::MyDay)]
    pub view: ListFilter,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(|| data_dir().join(DB_FILE_NAME))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join(LOG_FILE_NAME))
    }
}

// Platform data directory, or the working directory when none can be determined
fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "myday")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

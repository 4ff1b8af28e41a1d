//! File logging for the terminal UI.
//!
//! The TUI owns stdout, so log records go to
//! `$HOME/.local/share/saavy_metronome/logs/app.log` instead.

use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("saavy_metronome")
        .join("logs"))
}

/// Install the global file logger; returns the log file path.
///
/// Fails if the directory can't be created or a logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<PathBuf, Error> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    let path = dir.join("app.log");
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    WriteLogger::init(level, Config::default(), log_file)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    Ok(path)
}

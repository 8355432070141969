mod app;
mod model;
mod sync;
mod theme;
mod ui;
mod widgets;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Logs go to `ROWSYNC_LOG_FILE` only; the terminal belongs to the UI.
fn init_logger() -> Result<()> {
    match std::env::var("ROWSYNC_LOG_FILE") {
        Ok(path) => install_file_logger(&path),
        Err(_) => Ok(()),
    }
}

fn install_file_logger(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {path}"))?;
    Builder::new()
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Warn)
        .filter_module("rowsync", LevelFilter::Debug)
        .parse_default_env()
        .try_init()
        .with_context(|| format!("installing logger for {path}"))?;
    log::info!("logging to {path}");
    Ok(())
}

fn main() -> Result<()> {
    init_logger()?;
    ui::run()
}

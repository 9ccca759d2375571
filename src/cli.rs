use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "hotfolder")]
#[command(version)]
#[command(about = "Watches a source subfolder and mirrors changed files into a destination directory")]
#[command(
    long_about = "Hotfolder monitors one XX-XX subfolder of a configured base directory and copies every created or modified file into the destination directory, overwriting files of the same name. Press ESC while watching to switch folders or quit."
)]
pub struct Cli {
    /// Subfolder to watch immediately instead of prompting
    #[arg(value_name = "FOLDER", help = "Subfolder to start watching (e.g. 01-04)")]
    pub folder: Option<String>,

    /// Path to the settings file
    #[arg(
        short,
        long,
        default_value = "parameters.json",
        help = "Settings file naming the source and destination directories"
    )]
    pub config: PathBuf,

    /// Where the append-only event log is written
    #[arg(long, default_value = "hotfolder.log", help = "Log file path")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Initialize tracing with a console layer and an append-mode
    /// plain-text file layer.
    pub fn setup_logging(&self) -> Result<()> {
        let console_level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("failed to open log file {}", self.log_file.display()))?;

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(console_level);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .with_filter(LevelFilter::INFO);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .init();

        Ok(())
    }
}

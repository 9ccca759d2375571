use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::Parser;

use hotfolder::{cli::Cli, config::Settings, monitor::Monitor};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.setup_logging() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    println!("hotfolder v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "starting: base source {}, destination {}",
        settings.base_source_dir.display(),
        settings.destination_dir.display()
    );

    let mut monitor = Monitor::new(settings);

    let running = monitor.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })?;

    monitor.run(cli.folder.clone())?;

    Ok(())
}

fn load_settings(cli: &Cli) -> hotfolder::error::Result<Settings> {
    let settings = Settings::load(&cli.config)?;
    settings.validate()?;
    Ok(settings)
}

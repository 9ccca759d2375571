//! Watch control loop: owns the single active watcher, the current
//! subfolder selection, and the keyboard-driven menu.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::config::Settings;
use crate::copier::Copier;
use crate::folder;
use crate::watcher::FolderWatcher;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ChangeFolder,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ChangeFolder),
            "2" => Some(Self::Quit),
            _ => None,
        }
    }
}

enum WatchExit {
    Menu,
    Quit,
}

/// Drives the prompt -> watch -> menu state machine. The monitor is the
/// only component that starts or stops watchers and the only writer of
/// the current subfolder, so exactly one watcher is ever active.
pub struct Monitor {
    settings: Settings,
    copier: Copier,
    watcher: Option<FolderWatcher>,
    current_folder: Option<String>,
    running: Arc<AtomicBool>,
}

impl Monitor {
    pub fn new(settings: Settings) -> Self {
        let copier = Copier::new(&settings.destination_dir)
            .with_settle_delay(settings.watcher.settle_duration());

        Self {
            settings,
            copier,
            watcher: None,
            current_folder: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Shared quit flag, checked between event-handling rounds. The
    /// SIGINT handler installed in main flips it from signal context.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.current_folder.as_deref()
    }

    /// Run until the user quits. `initial_folder` (from the CLI) skips
    /// the first prompt when it names a valid existing subfolder;
    /// otherwise the error is shown and the prompt takes over.
    pub fn run(&mut self, initial_folder: Option<String>) -> Result<()> {
        if let Some(name) = initial_folder {
            if let Err(err) = self.select_folder(&name) {
                eprintln!("Error: {err}");
            }
        }

        while self.running.load(Ordering::SeqCst) {
            if self.watcher.is_none() {
                if !self.prompt_and_start() {
                    break;
                }
            }

            match self.watch_loop()? {
                WatchExit::Menu => {
                    // Stop the watcher before the menu opens so no copy
                    // runs while the user decides
                    self.stop_watching();
                    match self.show_menu() {
                        Some(MenuChoice::ChangeFolder) => continue,
                        Some(MenuChoice::Quit) | None => break,
                    }
                }
                WatchExit::Quit => break,
            }
        }

        self.stop_watching();
        println!();
        println!("[{}] Monitoring stopped", Local::now().format("%I:%M:%S %p"));
        Ok(())
    }

    /// Validate a subfolder name and start watching it, replacing any
    /// previously active watcher.
    fn select_folder(&mut self, name: &str) -> crate::error::Result<()> {
        let path = folder::resolve_subfolder(&self.settings.base_source_dir, name)?;

        self.stop_watching();
        let watcher = FolderWatcher::new(&path, self.settings.watcher.debounce_duration())?;
        self.announce_watching(&path);

        self.current_folder = Some(name.to_string());
        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop_watching(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            tracing::info!("stopped watching {}", watcher.path().display());
        }
    }

    fn announce_watching(&self, path: &Path) {
        println!();
        println!("[{}] Monitoring started:", Local::now().format("%I:%M:%S %p"));
        println!("Source:      {}", path.display());
        println!("Destination: {}", self.copier.destination_dir().display());
        println!("Press ESC to open the menu");
        println!();
        tracing::info!("watching {}", path.display());
    }

    /// Prompt for folder names until one resolves and its watch starts.
    /// Returns false when the user is done (EOF or quit signal).
    fn prompt_and_start(&mut self) -> bool {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return false;
            }

            let name = match prompt_line("Enter the folder name (e.g. 01-04): ") {
                Some(name) => name,
                None => return false,
            };

            match self.select_folder(&name) {
                Ok(()) => return true,
                Err(err) => println!("Error: {err}"),
            }
        }
    }

    /// Pump watcher events into the copier while polling the keyboard,
    /// with the terminal in raw mode for key-press detection.
    fn watch_loop(&self) -> Result<WatchExit> {
        enable_raw_mode()?;
        let exit = self.pump_events();
        disable_raw_mode()?;
        exit
    }

    fn pump_events(&self) -> Result<WatchExit> {
        let watcher = match self.watcher.as_ref() {
            Some(watcher) => watcher,
            None => return Ok(WatchExit::Menu),
        };

        loop {
            if !self.running.load(Ordering::SeqCst) {
                return Ok(WatchExit::Quit);
            }

            // Keyboard first: the menu key must win over a busy event stream
            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Esc => return Ok(WatchExit::Menu),
                            KeyCode::Char('c')
                                if key.modifiers.contains(KeyModifiers::CONTROL) =>
                            {
                                return Ok(WatchExit::Quit);
                            }
                            _ => {}
                        }
                    }
                }
            }

            match watcher.recv_timeout(POLL_INTERVAL) {
                Ok(file_event) => self.copier.handle_event(&file_event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::error!("watch channel closed unexpectedly");
                    return Ok(WatchExit::Menu);
                }
            }
        }
    }

    /// Present the menu until a recognized choice is made. None means
    /// the user is gone (EOF) or a quit signal arrived.
    fn show_menu(&self) -> Option<MenuChoice> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return None;
            }

            println!();
            println!("{}", "=".repeat(50));
            if let Some(name) = self.current_folder() {
                println!("Watching paused (was: {name})");
            }
            println!("Select an option:");
            println!("1. Change source folder");
            println!("2. Quit");
            println!("{}", "=".repeat(50));

            let line = prompt_line("Enter your choice (1 or 2): ")?;
            match MenuChoice::parse(&line) {
                Some(choice) => return Some(choice),
                None => println!("Error: unrecognized choice '{line}'"),
            }
        }
    }
}

/// Print a prompt and read one trimmed line from stdin. None on EOF.
fn prompt_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::{HotfolderError, Result};
use crate::events::FileEvent;

/// Result of a single copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// File was copied to the returned destination path.
    Copied(PathBuf),
    /// Source was still growing when checked; a later event will retry.
    StillWriting,
}

/// Copies changed files into the destination directory, overwriting any
/// existing file of the same name.
pub struct Copier {
    destination_dir: PathBuf,
    settle_delay: Duration,
}

impl Copier {
    pub fn new<P: AsRef<Path>>(destination_dir: P) -> Self {
        Self {
            destination_dir: destination_dir.as_ref().to_path_buf(),
            settle_delay: Duration::ZERO,
        }
    }

    /// Wait this long and re-check the source size before copying, so that
    /// files still being written are skipped until their next event.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Copy one file into the destination directory. Last writer wins:
    /// an existing file of the same name is overwritten unconditionally.
    pub fn copy_file(&self, source: &Path) -> Result<CopyOutcome> {
        let metadata = fs::metadata(source)
            .map_err(|_| HotfolderError::SourceVanished(source.to_path_buf()))?;

        if !self.destination_dir.is_dir() {
            return Err(HotfolderError::DestinationMissing(
                self.destination_dir.clone(),
            ));
        }

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
            match fs::metadata(source) {
                Ok(current) if current.len() != metadata.len() => {
                    return Ok(CopyOutcome::StillWriting);
                }
                Ok(_) => {}
                Err(_) => return Err(HotfolderError::SourceVanished(source.to_path_buf())),
            }
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| HotfolderError::InvalidPath(source.to_path_buf()))?;
        let destination = self.destination_dir.join(file_name);

        fs::copy(source, &destination).map_err(|io_err| HotfolderError::CopyIo {
            path: source.to_path_buf(),
            source: io_err,
        })?;

        Ok(CopyOutcome::Copied(destination))
    }

    /// Copy the file behind an event and log the outcome. Per-event
    /// failures are logged and swallowed: a failed copy never stops the
    /// watch loop.
    pub fn handle_event(&self, event: &FileEvent) {
        match self.copy_file(&event.path) {
            Ok(CopyOutcome::Copied(destination)) => {
                tracing::info!(
                    "copied {} -> {}",
                    event.path.display(),
                    destination.display()
                );
            }
            Ok(CopyOutcome::StillWriting) => {
                tracing::debug!("{} is still being written, skipping", event.path.display());
            }
            Err(err @ HotfolderError::SourceVanished(_)) => {
                tracing::warn!("{err}");
            }
            Err(err) => {
                tracing::error!("copy failed: {err}");
            }
        }
    }
}

//! Error types for the watch-and-copy pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for hotfolder operations.
pub type Result<T> = std::result::Result<T, HotfolderError>;

/// Errors that can occur while selecting folders, watching, or copying.
#[derive(Error, Debug)]
pub enum HotfolderError {
    /// A referenced directory does not exist.
    #[error("directory does not exist: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Subfolder name does not match the two-group numeric pattern.
    #[error("folder name must be in format XX-XX (e.g. 01-04), got '{0}'")]
    InvalidFolderFormat(String),

    /// The filesystem notification subscription could not be established.
    #[error("failed to start watching {}: {source}", .path.display())]
    WatchInit {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Source file disappeared between the event and the copy.
    #[error("source file vanished before copy: {}", .0.display())]
    SourceVanished(PathBuf),

    /// Destination directory was absent at copy time.
    #[error("destination directory missing: {}", .0.display())]
    DestinationMissing(PathBuf),

    /// Copy failed for ordinary I/O reasons (permissions, disk, locks).
    #[error("failed to copy {}: {source}", .path.display())]
    CopyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file could not be read.
    #[error("failed to read settings file {}: {source}", .path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON or misses required fields.
    #[error("invalid settings file {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

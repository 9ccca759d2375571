pub mod cli;
pub mod config;
pub mod copier;
pub mod error;
pub mod events;
pub mod folder;
pub mod monitor;
pub mod watcher;

pub use config::*;
pub use copier::*;
pub use error::*;
pub use events::*;
pub use monitor::*;
pub use watcher::*;

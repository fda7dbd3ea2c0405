pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{launcher::ProcessLauncher, terminal::ConsoleScreen};
pub use crate::config::toml_config::ReaderSettings;
pub use crate::core::{dump::dump_book, epub::EpubArchive, keymap::Keymap, viewer::Viewer};
pub use crate::utils::error::{ReaderError, Result};

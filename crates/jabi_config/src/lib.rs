//! Parsing and validation of `jabi.toml`.
//!
//! The file is optional: every section has defaults, so a driver invoked with
//! flags alone uses [`JabiConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytsource Store
//!
//! Configuration file model and JSON persistence.
//!
//! ## Usage
//!
//! ```ignore
//! use ytsource_store::SourceConfig;
//!
//! let config = SourceConfig::load().await?;
//! let manager = YoutubeSourceManager::builder()
//!     .options(config.source_options())
//!     .transport(config.transport_config())
//!     .build()?;
//! ```

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{DEFAULT_CLIENTS, HttpConfig, OAuthConfig, SourceConfig};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_config_path, load_json, load_json_or_default, save_json,
};


#[cfg(test)]
mod persistence_tests;

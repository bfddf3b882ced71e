// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytsource Manager
//!
//! Identifier routing and the YouTube source manager.
//!
//! - [`router::IdentifierRouter`] - classifies identifiers into routes
//! - [`manager::YoutubeSourceManager`] - resolves identifiers through the clients
//!
//! ## Example
//!
//! ```ignore
//! use ytsource_manager::{SourceOptions, YoutubeSourceManager};
//!
//! let manager = YoutubeSourceManager::builder()
//!     .options(SourceOptions::default())
//!     .client(Arc::new(MusicClient::new()))
//!     .client(Arc::new(WebClient::new()))
//!     .build()?;
//!
//! let item = manager.load_item("https://youtu.be/dQw4w9WgXcQ").await?;
//! ```

pub mod error;
pub mod manager;
pub mod options;
pub mod router;
pub mod url_tools;

#[cfg(test)]
mod router_edge_tests;

pub use error::{CANNOT_BE_LOADED, LoadError, WATCH_VIDEOS_FAILED};
pub use manager::{LoadReport, SOURCE_NAME, YoutubeSourceManager, YoutubeSourceManagerBuilder};
pub use options::SourceOptions;
pub use router::{
    Classification, IdentifierRouter, MAX_REROUTES, MUSIC_SEARCH_PREFIX, Route, SEARCH_PREFIX,
    WATCH_VIDEOS_URL,
};
pub use url_tools::UrlInfo;

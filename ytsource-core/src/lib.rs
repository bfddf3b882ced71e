// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ytsource` Core
//!
//! Core types and models shared by every `ytsource` crate.
//!
//! This crate has no I/O. It provides:
//!
//! - Loadable item models (tracks, playlists, the "no track" sentinel)
//! - Failure severity levels used by user-facing errors
//! - The core error type
//!
//! ## Key Types
//!
//! - [`AudioItem`] - What a successful load produces
//! - [`TrackInfo`] - Metadata for a single playable track
//! - [`AudioPlaylist`] - An ordered list of tracks (playlist, mix or search result)
//! - [`LoadRequest`] - A routed load operation and its arguments
//! - [`Severity`] - How serious a user-facing failure is

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{AudioItem, AudioPlaylist, ItemKind, LoadRequest, Severity, TrackInfo};

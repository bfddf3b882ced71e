//! Domain models for `ytsource`.
//!
//! ## Submodules
//!
//! - [`track`] - Track and playlist metadata
//! - [`item`] - Load results and failure severity
//! - [`request`] - Load requests produced by identifier routing

mod item;
mod request;
mod track;

pub use item::{AudioItem, ItemKind, Severity};
pub use request::LoadRequest;
pub use track::{AudioPlaylist, TrackInfo};

#[cfg(test)]
mod serde_tests;

//! Load results and failure severity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::track::{AudioPlaylist, TrackInfo};

// ============================================================================
// Audio Item
// ============================================================================

/// The result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AudioItem {
    /// A single track.
    Track(TrackInfo),
    /// A playlist, mix or search result.
    Playlist(AudioPlaylist),
    /// The identifier was understood but deliberately resolves to nothing.
    NoTrack,
}

impl AudioItem {
    /// Returns true for the "no track" sentinel.
    pub fn is_no_track(&self) -> bool {
        matches!(self, Self::NoTrack)
    }

    /// Returns the kind of this item.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Track(_) => ItemKind::Track,
            Self::Playlist(p) if p.is_search_result => ItemKind::SearchResult,
            Self::Playlist(_) => ItemKind::Playlist,
            Self::NoTrack => ItemKind::NoTrack,
        }
    }

    /// Returns the track, if this item is a track.
    pub fn as_track(&self) -> Option<&TrackInfo> {
        match self {
            Self::Track(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the playlist, if this item is a playlist.
    pub fn as_playlist(&self) -> Option<&AudioPlaylist> {
        match self {
            Self::Playlist(p) => Some(p),
            _ => None,
        }
    }
}

impl From<TrackInfo> for AudioItem {
    fn from(track: TrackInfo) -> Self {
        Self::Track(track)
    }
}

impl From<AudioPlaylist> for AudioItem {
    fn from(playlist: AudioPlaylist) -> Self {
        Self::Playlist(playlist)
    }
}

/// Coarse classification of an [`AudioItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A single track.
    Track,
    /// A playlist or mix.
    Playlist,
    /// A search result set.
    SearchResult,
    /// The "no track" sentinel.
    NoTrack,
}

impl ItemKind {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Track => "Track",
            Self::Playlist => "Playlist",
            Self::SearchResult => "Search Result",
            Self::NoTrack => "No Track",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Severity
// ============================================================================

/// How serious a user-facing failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected failure with a clear cause (private video, region lock).
    Common,
    /// Unexpected failure that may indicate an upstream change.
    Suspicious,
    /// Failure caused by a local bug or broken environment.
    Fault,
}

impl Severity {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Suspicious => "suspicious",
            Self::Fault => "fault",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

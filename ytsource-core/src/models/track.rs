//! Track and playlist metadata.
//!
//! - [`TrackInfo`] - A single playable track
//! - [`AudioPlaylist`] - An ordered collection of tracks

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Length of a canonical video identifier.
const VIDEO_ID_LENGTH: usize = 11;

// ============================================================================
// Track Info
// ============================================================================

/// Metadata describing a single playable track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Track title.
    pub title: String,
    /// Channel or artist name.
    pub author: String,
    /// Length in milliseconds. Live streams report `u64::MAX`.
    pub length_ms: u64,
    /// Video identifier.
    pub identifier: String,
    /// Whether the track is a live stream.
    pub is_stream: bool,
    /// Canonical watch URL.
    pub uri: Option<String>,
    /// Thumbnail URL.
    pub artwork_url: Option<String>,
    /// International Standard Recording Code, when known.
    pub isrc: Option<String>,
}

impl TrackInfo {
    /// Creates track info for a video with the canonical watch URL.
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        length_ms: u64,
    ) -> Self {
        let identifier = identifier.into();
        let uri = Some(format!("https://www.youtube.com/watch?v={identifier}"));

        Self {
            title: title.into(),
            author: author.into(),
            length_ms,
            identifier,
            is_stream: false,
            uri,
            artwork_url: None,
            isrc: None,
        }
    }

    /// Creates track info for a live stream.
    pub fn stream(
        identifier: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let mut info = Self::new(identifier, title, author, u64::MAX);
        info.is_stream = true;
        info
    }

    /// Sets the artwork URL.
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Sets the ISRC.
    #[must_use]
    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }

    /// Validates the track info.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is not a video identifier, or if a
    /// live stream reports a finite length.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.identifier.len() != VIDEO_ID_LENGTH {
            return Err(CoreError::InvalidData(format!(
                "identifier must be {VIDEO_ID_LENGTH} characters, got {:?}",
                self.identifier
            )));
        }

        if self.is_stream && self.length_ms != u64::MAX {
            return Err(CoreError::InvalidData(
                "live streams have no finite length".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Audio Playlist
// ============================================================================

/// An ordered list of tracks.
///
/// Used for regular playlists, mixes and search results alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlaylist {
    /// Playlist name.
    pub name: String,
    /// Tracks in playlist order.
    pub tracks: Vec<TrackInfo>,
    /// Index of the track the playlist link pointed at.
    pub selected_track: Option<usize>,
    /// Whether this playlist is a search result.
    pub is_search_result: bool,
}

impl AudioPlaylist {
    /// Creates a playlist.
    pub fn new(name: impl Into<String>, tracks: Vec<TrackInfo>) -> Self {
        Self {
            name: name.into(),
            tracks,
            selected_track: None,
            is_search_result: false,
        }
    }

    /// Creates a search result for the given query.
    pub fn search_result(query: &str, tracks: Vec<TrackInfo>) -> Self {
        Self {
            name: format!("Search results for: {query}"),
            tracks,
            selected_track: None,
            is_search_result: true,
        }
    }

    /// Marks the track with the given video identifier as selected.
    ///
    /// Leaves the selection untouched if no track matches.
    #[must_use]
    pub fn with_selected_video(mut self, video_id: &str) -> Self {
        if let Some(index) = self.tracks.iter().position(|t| t.identifier == video_id) {
            self.selected_track = Some(index);
        }
        self
    }

    /// Returns the selected track, if any.
    pub fn selected(&self) -> Option<&TrackInfo> {
        self.selected_track.and_then(|i| self.tracks.get(i))
    }

    /// Returns the number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns true if the playlist has no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

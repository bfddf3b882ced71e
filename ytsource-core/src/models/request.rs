//! Load requests produced by identifier routing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete load to attempt against each client.
///
/// Carries the operation kind and the arguments extracted from the
/// identifier, but nothing about which client will serve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadRequest {
    /// Load a single video.
    Video {
        /// 11-character video identifier.
        video_id: String,
    },
    /// Load a playlist, optionally positioned at a video.
    Playlist {
        /// Playlist identifier.
        playlist_id: String,
        /// Video the link pointed at within the playlist.
        #[serde(skip_serializing_if = "Option::is_none")]
        selected_video_id: Option<String>,
    },
    /// Load a mix seeded by a video.
    Mix {
        /// Mix playlist identifier (with its `RD` prefix).
        mix_id: String,
        /// Seed video identifier.
        video_id: String,
    },
    /// Regular search.
    Search {
        /// Trimmed, non-empty query text.
        query: String,
    },
    /// Music search.
    MusicSearch {
        /// Trimmed, non-empty query text.
        query: String,
    },
}

impl LoadRequest {
    /// Creates a video request.
    pub fn video(video_id: impl Into<String>) -> Self {
        Self::Video {
            video_id: video_id.into(),
        }
    }

    /// Creates a playlist request.
    pub fn playlist(playlist_id: impl Into<String>, selected_video_id: Option<String>) -> Self {
        Self::Playlist {
            playlist_id: playlist_id.into(),
            selected_video_id,
        }
    }

    /// Creates a mix request.
    pub fn mix(mix_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self::Mix {
            mix_id: mix_id.into(),
            video_id: video_id.into(),
        }
    }

    /// Returns a short name for the operation.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Video { .. } => "video",
            Self::Playlist { .. } => "playlist",
            Self::Mix { .. } => "mix",
            Self::Search { .. } => "search",
            Self::MusicSearch { .. } => "music_search",
        }
    }
}

impl fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video { video_id } => write!(f, "video {video_id}"),
            Self::Playlist {
                playlist_id,
                selected_video_id: Some(video_id),
            } => write!(f, "playlist {playlist_id} at {video_id}"),
            Self::Playlist { playlist_id, .. } => write!(f, "playlist {playlist_id}"),
            Self::Mix { mix_id, video_id } => write!(f, "mix {mix_id} seeded by {video_id}"),
            Self::Search { query } => write!(f, "search {query:?}"),
            Self::MusicSearch { query } => write!(f, "music search {query:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(LoadRequest::video("dQw4w9WgXcQ").to_string(), "video dQw4w9WgXcQ");
        assert_eq!(
            LoadRequest::playlist("PLabc", Some("dQw4w9WgXcQ".to_string())).to_string(),
            "playlist PLabc at dQw4w9WgXcQ"
        );
        assert_eq!(
            LoadRequest::Search { query: "lofi beats".to_string() }.to_string(),
            r#"search "lofi beats""#
        );
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(LoadRequest::mix("RDdQw4w9WgXcQ", "dQw4w9WgXcQ")).unwrap();
        assert_eq!(json["kind"], "mix");
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");

        let json = serde_json::to_value(LoadRequest::playlist("PLabc", None)).unwrap();
        assert!(json.get("selected_video_id").is_none());
    }
}

//! Source manager options.

use serde::{Deserialize, Serialize};

/// Toggles that control which identifier shapes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceOptions {
    /// Accept `ytsearch:` and `ytmsearch:` prefixes.
    pub allow_search: bool,
    /// Accept bare 11-character video ids.
    pub allow_direct_video_ids: bool,
    /// Accept bare `PL`/`UU` playlist ids.
    pub allow_direct_playlist_ids: bool,
}

impl SourceOptions {
    /// Creates options with everything allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether searches are allowed.
    #[must_use]
    pub fn with_allow_search(mut self, allow: bool) -> Self {
        self.allow_search = allow;
        self
    }

    /// Sets whether bare video ids are allowed.
    #[must_use]
    pub fn with_allow_direct_video_ids(mut self, allow: bool) -> Self {
        self.allow_direct_video_ids = allow;
        self
    }

    /// Sets whether bare playlist ids are allowed.
    #[must_use]
    pub fn with_allow_direct_playlist_ids(mut self, allow: bool) -> Self {
        self.allow_direct_playlist_ids = allow;
        self
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            allow_search: true,
            allow_direct_video_ids: true,
            allow_direct_playlist_ids: true,
        }
    }
}

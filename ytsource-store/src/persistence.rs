//! On-disk JSON files.
//!
//! A config file may hold a proxy password and an OAuth refresh token. Writes
//! go through a sibling temp file that is renamed into place, and on Unix the
//! file is readable by the owner only.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Directory name under the platform config dir.
const APP_DIR: &str = "ytsource";

/// Config file name.
const CONFIG_FILE: &str = "config.json";

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

// ============================================================================
// Paths
// ============================================================================

/// Returns the directory holding ytsource files.
///
/// - Linux: `~/.config/ytsource`
/// - macOS: `~/Library/Application Support/ytsource`
/// - Windows: `%APPDATA%\ytsource`
///
/// Falls back to `./ytsource` when the platform has no config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the path of the config file.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE)
}

// ============================================================================
// Owner-only Permissions
// ============================================================================

#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    debug!(path = %path.display(), mode = format_args!("{mode:o}"), "Restricted permissions");
    Ok(())
}

#[cfg(unix)]
async fn restrict_file(path: &Path) -> Result<(), StoreError> {
    restrict(path, FILE_MODE).await
}

#[cfg(unix)]
async fn restrict_dir(path: &Path) -> Result<(), StoreError> {
    restrict(path, DIR_MODE).await
}

#[cfg(not(unix))]
async fn restrict_file(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_dir(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// Read / Write
// ============================================================================

/// Creates the missing parent directory of `path` with owner-only access.
///
/// An existing directory is left as it is.
async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if tokio::fs::try_exists(parent).await? {
        return Ok(());
    }

    tokio::fs::create_dir_all(parent).await?;
    restrict_dir(parent).await
}

/// Serializes `data` as pretty JSON and replaces `path` with it.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(data)?;

    ensure_parent(path).await?;

    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, &body).await?;
    restrict_file(&staging).await?;
    tokio::fs::rename(&staging, path).await?;

    debug!(path = %path.display(), bytes = body.len(), "Wrote JSON file");
    Ok(())
}

/// Reads and parses the JSON file at `path`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read (check
/// [`StoreError::is_not_found`]) or [`StoreError::Serialization`] if it is
/// not valid JSON for `T`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let body = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = body.len(), "Read JSON file");
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`load_json`], but yields `T::default()` for a missing or broken file.
///
/// Only a broken file is logged.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    load_json(path).await.unwrap_or_else(|e: StoreError| {
        if !e.is_not_found() {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable file");
        }
        T::default()
    })
}

// ============================================================================
// Tests
// ============================================================================

//! Config persistence round-trip and edge case tests.

use tempfile::TempDir;
use url::Url;

use crate::config::SourceConfig;
use crate::error::StoreError;

#[tokio::test]
async fn test_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = SourceConfig::load_from(&temp_dir.path().join("config.json"))
        .await
        .unwrap();

    assert_eq!(config, SourceConfig::default());
}

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ytsource").join("config.json");

    let mut config = SourceConfig::default();
    config.allow_direct_playlist_ids = false;
    config.clients = vec!["TV".into(), "WEB".into()];
    config.proxy = Some(Url::parse("http://127.0.0.1:3128").unwrap());
    config.oauth.enabled = true;
    config.oauth.refresh_token = Some("1//token".into());

    config.save_to(&path).await.unwrap();
    let loaded = SourceConfig::load_from(&path).await.unwrap();

    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_saved_keys_are_camel_case() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    SourceConfig::default().save_to(&path).await.unwrap();
    let raw = tokio::fs::read_to_string(&path).await.unwrap();

    assert!(raw.contains("\"allowDirectVideoIds\""));
    assert!(raw.contains("\"playlistPageCount\": 6"));
    assert!(!raw.contains("\"proxy\""));
}

#[tokio::test]
async fn test_invalid_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, r#"{"playlistPageCount": 0}"#).await.unwrap();

    let result = SourceConfig::load_from(&path).await;
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[tokio::test]
async fn test_malformed_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, "{ clients: [").await.unwrap();

    let result = SourceConfig::load_from(&path).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

#[tokio::test]
async fn test_save_refuses_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = SourceConfig::default();
    config.clients = vec![String::new()];

    assert!(config.save_to(&path).await.is_err());
    assert!(!path.exists());
}

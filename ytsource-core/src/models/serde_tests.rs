//! Serde tests for core types.
//!
//! These pin the JSON shape other tools rely on, not every field permutation.

use serde_json::json;

use crate::{AudioItem, AudioPlaylist, ItemKind, Severity, TrackInfo};

#[test]
fn test_track_uses_camel_case_fields() {
    let track = TrackInfo::new("dQw4w9WgXcQ", "Never Gonna Give You Up", "Rick Astley", 213_000);
    let value = serde_json::to_value(&track).unwrap();

    assert_eq!(value["lengthMs"], json!(213_000));
    assert_eq!(value["isStream"], json!(false));
    assert_eq!(
        value["uri"],
        json!("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert!(value["artworkUrl"].is_null());
}

#[test]
fn test_audio_item_is_tagged() {
    let value = serde_json::to_value(AudioItem::NoTrack).unwrap();
    assert_eq!(value, json!({ "type": "no_track" }));

    let playlist = AudioPlaylist::search_result("lofi", vec![]);
    let value = serde_json::to_value(AudioItem::Playlist(playlist)).unwrap();
    assert_eq!(value["type"], json!("playlist"));
    assert_eq!(value["data"]["isSearchResult"], json!(true));
}

#[test]
fn test_audio_item_deserialize() {
    let json = r#"{"type":"track","data":{"title":"t","author":"a","lengthMs":1,"identifier":"abcdefghijk","isStream":false,"uri":null,"artworkUrl":null,"isrc":null}}"#;
    let item: AudioItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.kind(), ItemKind::Track);
    assert_eq!(item.as_track().unwrap().identifier, "abcdefghijk");
}

#[test]
fn test_severity_lowercase() {
    assert_eq!(serde_json::to_string(&Severity::Suspicious).unwrap(), r#""suspicious""#);
    let parsed: Severity = serde_json::from_str(r#""fault""#).unwrap();
    assert_eq!(parsed, Severity::Fault);
}

#[test]
fn test_invalid_item_tag_rejected() {
    let result: Result<AudioItem, _> = serde_json::from_str(r#"{"type":"album"}"#);
    assert!(result.is_err());
}

//! Router edge case tests.
//!
//! These tests cover odd but real-world identifier shapes.

use ytsource_core::LoadRequest;

use crate::options::SourceOptions;
use crate::router::{Classification, IdentifierRouter, Route};

fn classify(identifier: &str) -> Route {
    match IdentifierRouter::new(SourceOptions::default())
        .classify(identifier)
        .unwrap()
    {
        Classification::Route(route) => route,
        Classification::FollowRedirect { url } => panic!("unexpected redirect to {url}"),
    }
}

// ========================================================================
// Watch URLs
// ========================================================================

#[test]
fn test_watch_without_v_falls_through() {
    assert_eq!(classify("https://www.youtube.com/watch?list=PLabc"), Route::Unroutable);
}

#[test]
fn test_long_video_id_truncated() {
    assert_eq!(
        classify("https://www.youtube.com/watch?v=dQw4w9WgXcQextra"),
        LoadRequest::video("dQw4w9WgXcQ").into()
    );
}

#[test]
fn test_invalid_video_id_ignores_list() {
    assert_eq!(
        classify("https://www.youtube.com/watch?v=short&list=PLabc"),
        Route::Empty
    );
}

#[test]
fn test_extra_parameters_ignored() {
    assert_eq!(
        classify("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=1m30s&index=4&list=PLq"),
        LoadRequest::playlist("PLq", Some("dQw4w9WgXcQ".into())).into()
    );
}

#[test]
fn test_duplicate_v_first_wins() {
    assert_eq!(
        classify("https://www.youtube.com/watch?v=aaaaaaaaaaa&v=bbbbbbbbbbb"),
        LoadRequest::video("aaaaaaaaaaa").into()
    );
}

#[test]
fn test_music_watch_with_mix() {
    assert_eq!(
        classify("https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=RDAMVMdQw4w9WgXcQ"),
        LoadRequest::mix("RDAMVMdQw4w9WgXcQ", "dQw4w9WgXcQ").into()
    );
}

#[test]
fn test_other_list_prefixes_promote() {
    // Only LL, WL and LM stay plain videos.
    assert_eq!(
        classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=OLAK5uy_abc"),
        LoadRequest::playlist("OLAK5uy_abc", Some("dQw4w9WgXcQ".into())).into()
    );
}

// ========================================================================
// Playlist URLs
// ========================================================================

#[test]
fn test_playlist_without_list_falls_through() {
    assert_eq!(classify("https://www.youtube.com/playlist"), Route::Unroutable);
}

#[test]
fn test_playlist_url_accepts_any_prefix() {
    assert_eq!(
        classify("youtube.com/playlist?list=OLAK5uy_abc"),
        LoadRequest::playlist("OLAK5uy_abc", None).into()
    );
}

#[test]
fn test_watch_videos_without_ids_falls_through() {
    assert_eq!(classify("https://www.youtube.com/watch_videos"), Route::Unroutable);
}

// ========================================================================
// Bare IDs and Short-hand
// ========================================================================

#[test]
fn test_bare_id_wrong_length() {
    assert_eq!(classify("dQw4w9WgXc"), Route::Unroutable);
    assert_eq!(classify("dQw4w9WgXcQQ"), Route::Unroutable);
}

#[test]
fn test_bare_playlist_lowercase_prefix() {
    assert_eq!(classify("plabcdef"), Route::Unroutable);
}

#[test]
fn test_short_hand_trailing_path() {
    assert_eq!(
        classify("https://youtu.be/dQw4w9WgXcQ/extra"),
        LoadRequest::video("dQw4w9WgXcQ").into()
    );
}

#[test]
fn test_short_hand_empty_id() {
    assert_eq!(classify("https://youtu.be/"), Route::Empty);
}

#[test]
fn test_unknown_subdomain() {
    assert_eq!(classify("https://gaming.youtube.com/watch?v=dQw4w9WgXcQ"), Route::Unroutable);
}

#[test]
fn test_search_prefix_case_sensitive() {
    assert_eq!(classify("YTSEARCH:foo"), Route::Unroutable);
}

#[test]
fn test_route_json() {
    let json = serde_json::to_value(classify("ytsearch:foo")).unwrap();
    assert_eq!(json["route"], "load");
    assert_eq!(json["request"]["kind"], "search");
    assert_eq!(json["request"]["query"], "foo");

    let json = serde_json::to_value(Route::Unroutable).unwrap();
    assert_eq!(json["route"], "unroutable");
}

//! Validation and naming behavior for captured media handles.

use pulse_gate_core::{CoreError, MediaHandle, MediaKind};

#[test]
fn media_handle_tests_rejects_blank_location() {
    let result = MediaHandle::new("   ", None, MediaKind::Image);

    assert!(matches!(result, Err(CoreError::BlankMediaLocation)));
}

#[test]
fn media_handle_tests_rejects_location_without_file_name() {
    let result = MediaHandle::new("file:///captures/", None, MediaKind::Video);

    assert!(matches!(result, Err(CoreError::UnnameableMedia(_))));
}

#[test]
fn media_handle_tests_file_name_is_last_path_segment() {
    let handle = MediaHandle::new("file:///captures/session-9/clip.mp4", None, MediaKind::Video)
        .expect("handle with a trailing segment should validate");

    assert_eq!(handle.file_name(), "clip.mp4");
}

#[test]
fn media_handle_tests_file_name_for_bare_name_is_whole_location() {
    let handle = MediaHandle::new("portrait.jpg", None, MediaKind::Image)
        .expect("bare file name should validate");

    assert_eq!(handle.file_name(), "portrait.jpg");
}

#[test]
fn media_handle_tests_effective_mime_prefers_carried_type() {
    let handle = MediaHandle::new(
        "file:///captures/portrait.png",
        Some("image/png".to_owned()),
        MediaKind::Image,
    )
    .expect("handle with explicit mime should validate");

    assert_eq!(handle.effective_mime(), "image/png");
}

#[test]
fn media_handle_tests_effective_mime_falls_back_to_kind_default() {
    let image = MediaHandle::new("file:///captures/portrait.jpg", None, MediaKind::Image)
        .expect("image handle should validate");
    let video = MediaHandle::new("file:///captures/clip.mp4", None, MediaKind::Video)
        .expect("video handle should validate");

    assert_eq!(image.effective_mime(), "image/jpeg");
    assert_eq!(video.effective_mime(), "video/mp4");
}

#[test]
fn media_handle_tests_effective_mime_ignores_blank_carried_type() {
    let handle = MediaHandle::new(
        "file:///captures/clip.mp4",
        Some("  ".to_owned()),
        MediaKind::Video,
    )
    .expect("handle with blank mime should validate");

    assert_eq!(handle.effective_mime(), "video/mp4");
}

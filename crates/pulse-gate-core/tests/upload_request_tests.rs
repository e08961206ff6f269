//! Field assembly and ordering behavior for multipart upload requests.

use pulse_gate_core::{CoreError, FormValue, MediaHandle, MediaKind, UploadRequest};

fn sample_clip() -> MediaHandle {
    MediaHandle::new("file:///captures/clip.mp4", None, MediaKind::Video)
        .expect("sample clip handle should validate")
}

#[test]
fn upload_request_tests_rejects_path_without_leading_slash() {
    let result = UploadRequest::new("get_heart_rate");

    assert!(matches!(result, Err(CoreError::InvalidPath(_))));
}

#[test]
fn upload_request_tests_rejects_bare_separator_path() {
    let result = UploadRequest::new("/");

    assert!(matches!(result, Err(CoreError::InvalidPath(_))));
}

#[test]
fn upload_request_tests_preserves_field_insertion_order() {
    let mut request = UploadRequest::new("/login").expect("login path should validate");
    request
        .push_text("username", "tanjiro")
        .expect("text field should append");
    request
        .push_text("heart_rate", "72")
        .expect("text field should append");
    request
        .push_media("image", sample_clip())
        .expect("media field should append");

    let names: Vec<&str> = request
        .fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(names, ["username", "heart_rate", "image"]);
}

#[test]
fn upload_request_tests_rejects_blank_field_name() {
    let mut request = UploadRequest::new("/login").expect("login path should validate");

    let result = request.push_text(" ", "value");

    assert!(matches!(result, Err(CoreError::EmptyFieldName)));
    assert!(request.fields().is_empty());
}

#[test]
fn upload_request_tests_media_handles_skips_text_fields() {
    let mut request = UploadRequest::new("/get_heart_rate").expect("path should validate");
    request
        .push_text("note", "session-9")
        .expect("text field should append");
    request
        .push_media("video", sample_clip())
        .expect("media field should append");

    let handles: Vec<_> = request.media_handles().collect();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].file_name(), "clip.mp4");
}

#[test]
fn upload_request_tests_text_field_round_trips_value() {
    let mut request = UploadRequest::new("/register").expect("path should validate");
    request
        .push_text("username", "nezuko")
        .expect("text field should append");

    match &request.fields()[0].value {
        FormValue::Text(value) => assert_eq!(value, "nezuko"),
        FormValue::Media(_) => panic!("expected a text field"),
    }
}

#![warn(missing_docs)]
//! # pulse-gate-core
//!
//! ## Purpose
//! Defines the pure data model used across the `pulse-gate` workspace.
//!
//! ## Responsibilities
//! - Represent captured media assets as validated [`MediaHandle`] references.
//! - Model multipart submissions as ordered [`UploadRequest`] field lists.
//! - Carry upload outcomes as [`UploadResult`] values.
//!
//! ## Data flow
//! Capture code produces [`MediaHandle`] values. Submission steps assemble
//! them with text fields into an [`UploadRequest`]; the upload client turns a
//! successful response into an [`UploadResult`].
//!
//! ## Ownership and lifetimes
//! Handles, requests, and results own their string/byte data so capture,
//! submission, and projection stages never borrow from each other.
//!
//! ## Error model
//! Validation failures (blank locations, unnameable assets, malformed paths,
//! empty field names) return [`CoreError`] variants with caller-actionable
//! categorization.
//!
//! ## Security and privacy notes
//! This crate never reads or logs media bytes. Location URIs may embed device
//! file paths; display code should prefer [`MediaHandle::file_name`] over the
//! full location.
//!
//! ## Example
//! ```rust
//! use pulse_gate_core::{MediaHandle, MediaKind, UploadRequest};
//!
//! let clip = MediaHandle::new("file:///captures/clip-1.mp4", None, MediaKind::Video).unwrap();
//! let mut request = UploadRequest::new("/get_heart_rate").unwrap();
//! request.push_media("video", clip).unwrap();
//! assert_eq!(request.fields().len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default content type applied to image handles that carry none.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Default content type applied to video handles that carry none.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Kind of captured asset a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image taken by the picker.
    Image,
    /// Recorded video clip.
    Video,
}

impl MediaKind {
    /// Returns the content type assumed when a handle carries none.
    pub fn default_mime(&self) -> &'static str {
        match self {
            MediaKind::Image => DEFAULT_IMAGE_MIME,
            MediaKind::Video => DEFAULT_VIDEO_MIME,
        }
    }
}

/// Reference to one captured asset on the device.
///
/// A handle never owns the asset bytes; it records where the capture layer
/// finalized the asset and how to label it in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    /// Location URI reported by the capture layer.
    pub location: String,
    /// Content type reported by the capture layer, when known.
    pub mime_type: Option<String>,
    /// Asset kind.
    pub kind: MediaKind,
}

impl MediaHandle {
    /// Constructs a validated media handle.
    ///
    /// # Errors
    /// Returns [`CoreError::BlankMediaLocation`] when the location is blank.
    /// Returns [`CoreError::UnnameableMedia`] when the location's last path
    /// segment is empty, since the multipart part name is derived from it.
    pub fn new(
        location: impl Into<String>,
        mime_type: Option<String>,
        kind: MediaKind,
    ) -> Result<Self, CoreError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(CoreError::BlankMediaLocation);
        }

        let handle = Self {
            location,
            mime_type,
            kind,
        };
        if handle.file_name().is_empty() {
            return Err(CoreError::UnnameableMedia(handle.location));
        }

        Ok(handle)
    }

    /// Returns the last path segment of the location URI.
    ///
    /// This is the file name attached to the asset's multipart part.
    pub fn file_name(&self) -> &str {
        self.location
            .rsplit('/')
            .next()
            .unwrap_or(self.location.as_str())
    }

    /// Returns the carried content type, or the kind default when absent.
    pub fn effective_mime(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or_else(|| self.kind.default_mime())
    }

    /// Returns a log-safe label: kind plus file name, no directory path.
    pub fn log_label(&self) -> String {
        let kind = match self.kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        format!("{kind}:{}", self.file_name())
    }
}

/// One value in a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormValue {
    /// Scalar field serialized as a UTF-8 text part.
    Text(String),
    /// Captured asset serialized as a named binary part.
    Media(MediaHandle),
}

/// One named field in a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Part name used in the `Content-Disposition` header.
    pub name: String,
    /// Part value.
    pub value: FormValue,
}

/// Multipart submission addressed to one backend path.
///
/// Requests are assembled field by field and treated as immutable once handed
/// to the upload client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    path: String,
    fields: Vec<FormField>,
}

impl UploadRequest {
    /// Creates an empty request for one endpoint path suffix.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPath`] when the suffix does not start with
    /// `/` or is only the separator.
    pub fn new(path: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();
        if !path.starts_with('/') || path.len() == 1 {
            return Err(CoreError::InvalidPath(path));
        }

        Ok(Self {
            path,
            fields: Vec::new(),
        })
    }

    /// Appends a scalar text field.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFieldName`] when the name is blank.
    pub fn push_text(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let name = validated_field_name(name)?;
        self.fields.push(FormField {
            name,
            value: FormValue::Text(value.into()),
        });
        Ok(())
    }

    /// Appends a captured asset field.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFieldName`] when the name is blank.
    pub fn push_media(
        &mut self,
        name: impl Into<String>,
        media: MediaHandle,
    ) -> Result<(), CoreError> {
        let name = validated_field_name(name)?;
        self.fields.push(FormField {
            name,
            value: FormValue::Media(media),
        });
        Ok(())
    }

    /// Returns the endpoint path suffix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the ordered field list.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns the media handles attached to this request.
    pub fn media_handles(&self) -> impl Iterator<Item = &MediaHandle> {
        self.fields.iter().filter_map(|field| match &field.value {
            FormValue::Media(handle) => Some(handle),
            FormValue::Text(_) => None,
        })
    }
}

/// Outcome of one successful (2xx) upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// HTTP status returned by the backend.
    pub status: u16,
    /// Raw response body as received.
    pub raw_response: String,
    /// Numeric metric extracted from the response by a derivation step.
    pub derived_metric: Option<f64>,
}

impl UploadResult {
    /// Creates a result with no derived metric.
    pub fn new(status: u16, raw_response: impl Into<String>) -> Self {
        Self {
            status,
            raw_response: raw_response.into(),
            derived_metric: None,
        }
    }

    /// Returns the result with the derived metric filled in.
    pub fn with_metric(mut self, metric: f64) -> Self {
        self.derived_metric = Some(metric);
        self
    }
}

fn validated_field_name(name: impl Into<String>) -> Result<String, CoreError> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(CoreError::EmptyFieldName);
    }
    Ok(name)
}

/// Error type for core domain validation failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Media location cannot be blank.
    #[error("media location is blank")]
    BlankMediaLocation,
    /// Media location has no usable last path segment.
    #[error("media location has no file name segment: {0}")]
    UnnameableMedia(String),
    /// Endpoint path suffix is malformed.
    #[error("invalid endpoint path suffix: {0:?}")]
    InvalidPath(String),
    /// Multipart field names cannot be blank.
    #[error("form field name is empty")]
    EmptyFieldName,
}

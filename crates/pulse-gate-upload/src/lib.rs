#![warn(missing_docs)]
//! # pulse-gate-upload
//!
//! ## Purpose
//! Implements the multipart upload client used for every backend submission.
//!
//! ## Responsibilities
//! - Validate upload endpoint policy (HTTPS base URL).
//! - Encode `multipart/form-data` bodies from text and media fields.
//! - Resolve media bytes through an injectable source abstraction.
//! - Guarantee at most one in-flight submission per media handle.
//!
//! ## Data flow
//! Workflow steps assemble a [`pulse_gate_core::UploadRequest`] ->
//! [`UploadClient::submit`] reserves media fingerprints, encodes the body,
//! and sends one [`UploadEnvelope`] through [`UploadTransport`] -> a 2xx
//! response becomes a [`pulse_gate_core::UploadResult`].
//!
//! ## Ownership and lifetimes
//! Encoded envelopes own their bytes. The in-flight ledger lives inside the
//! client and releases reservations when `submit` returns, success or not.
//!
//! ## Error model
//! Endpoint violations, unreadable media, transport failures, and non-2xx
//! statuses are surfaced as [`UploadError`]. [`classify_upload_error`] maps
//! errors to a retriable/permanent split for status-line projection; nothing
//! in this crate retries.
//!
//! ## Security and privacy notes
//! Media bytes pass through encoding only; they are never logged or cached.
//! Fingerprints are SHA-256 digests of handle metadata, not content.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use pulse_gate_core::{FormValue, MediaHandle, MediaKind, UploadRequest, UploadResult};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Length of the random boundary token suffix.
const BOUNDARY_TOKEN_LEN: usize = 24;

/// Abstract resolver from media handles to asset bytes.
pub trait MediaSource: Send + Sync {
    /// Reads the full asset referenced by `handle`.
    ///
    /// # Errors
    /// Returns [`UploadError::UnreadableMedia`] when the location cannot be
    /// resolved or read.
    fn read_media(&self, handle: &MediaHandle) -> Result<Vec<u8>, UploadError>;
}

/// Media source that reads `file://` locations from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsMediaSource;

impl FsMediaSource {
    /// Creates a filesystem media source.
    pub fn new() -> Self {
        Self
    }
}

impl MediaSource for FsMediaSource {
    fn read_media(&self, handle: &MediaHandle) -> Result<Vec<u8>, UploadError> {
        let parsed = Url::parse(&handle.location).map_err(|error| {
            UploadError::UnreadableMedia(format!("invalid media location: {error}"))
        })?;

        if parsed.scheme() != "file" {
            return Err(UploadError::UnreadableMedia(format!(
                "unsupported media scheme: {}",
                parsed.scheme()
            )));
        }

        let path = parsed.to_file_path().map_err(|_| {
            UploadError::UnreadableMedia("media location is not a local file path".to_string())
        })?;

        std::fs::read(&path).map_err(|error| {
            UploadError::UnreadableMedia(format!("{}: {error}", path.display()))
        })
    }
}

/// In-memory media source for tests and deterministic pipelines.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaSource {
    assets: std::collections::HashMap<String, Vec<u8>>,
}

impl InMemoryMediaSource {
    /// Creates an empty in-memory source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the source with one asset registered under `location`.
    pub fn with_asset(mut self, location: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.insert(location.into(), bytes);
        self
    }
}

impl MediaSource for InMemoryMediaSource {
    fn read_media(&self, handle: &MediaHandle) -> Result<Vec<u8>, UploadError> {
        self.assets
            .get(&handle.location)
            .cloned()
            .ok_or_else(|| {
                UploadError::UnreadableMedia(format!("no asset at {}", handle.location))
            })
    }
}

/// Encoded request ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Absolute request URL.
    pub url: String,
    /// `multipart/form-data` content type carrying the boundary.
    pub content_type: String,
    /// Encoded body bytes.
    pub body: Vec<u8>,
}

/// Raw response handed back by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as received.
    pub body: String,
}

/// Abstract HTTP transport used by the upload client.
///
/// Implementations block until the backend responds; timeout policy belongs
/// to the transport, never to the client.
pub trait UploadTransport: Send + Sync {
    /// Sends one encoded envelope.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] or [`UploadError::Timeout`] for
    /// delivery failures; HTTP statuses are reported in the response, not as
    /// errors.
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError>;
}

/// Computes the in-flight fingerprint for one media handle.
///
/// The digest covers handle metadata (kind and location), never asset bytes,
/// so two handles to the same asset collide as intended.
pub fn media_fingerprint(handle: &MediaHandle) -> String {
    let kind_tag = match handle.kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    };

    let mut hasher = Sha256::new();
    hasher.update(kind_tag.as_bytes());
    hasher.update(b":");
    hasher.update(handle.location.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random multipart boundary token.
pub fn generate_boundary() -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("pulse-gate-{token}")
}

/// Encodes a request into a `multipart/form-data` body.
///
/// Text fields become UTF-8 parts; media fields become binary parts whose
/// file name is the handle's last location segment and whose content type is
/// [`MediaHandle::effective_mime`]. Field order is preserved.
///
/// # Errors
/// Returns [`UploadError::UnreadableMedia`] when `source` cannot resolve a
/// media field.
pub fn encode_multipart(
    request: &UploadRequest,
    source: &dyn MediaSource,
    boundary: &str,
) -> Result<Vec<u8>, UploadError> {
    let mut body = Vec::new();

    for field in request.fields() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match &field.value {
            FormValue::Text(text) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        field.name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(text.as_bytes());
            }
            FormValue::Media(handle) => {
                let bytes = source.read_media(handle)?;
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        field.name,
                        handle.file_name()
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(
                    format!("Content-Type: {}\r\n\r\n", handle.effective_mime()).as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Ok(body)
}

/// Fingerprint set shared across concurrent `submit` calls.
#[derive(Debug, Default)]
struct InFlightLedger {
    reserved: Mutex<BTreeSet<String>>,
}

impl InFlightLedger {
    /// Reserves every fingerprint or rejects the whole set.
    fn reserve(&self, fingerprints: Vec<String>) -> Result<ReservationGuard<'_>, UploadError> {
        let mut reserved = self
            .reserved
            .lock()
            .map_err(|_| UploadError::Transport("in-flight ledger lock poisoned".to_string()))?;

        for fingerprint in &fingerprints {
            if reserved.contains(fingerprint) {
                return Err(UploadError::MediaInFlight(fingerprint.clone()));
            }
        }
        for fingerprint in &fingerprints {
            reserved.insert(fingerprint.clone());
        }

        Ok(ReservationGuard {
            ledger: self,
            fingerprints,
        })
    }
}

/// Releases reserved fingerprints when a submission completes.
struct ReservationGuard<'a> {
    ledger: &'a InFlightLedger,
    fingerprints: Vec<String>,
}

impl Drop for ReservationGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut reserved) = self.ledger.reserved.lock() {
            for fingerprint in &self.fingerprints {
                reserved.remove(fingerprint);
            }
        }
    }
}

/// Upload client that validates endpoint policy and performs one attempt per
/// call.
#[derive(Clone)]
pub struct UploadClient {
    base_url: String,
    transport: Arc<dyn UploadTransport>,
    source: Arc<dyn MediaSource>,
    ledger: Arc<InFlightLedger>,
}

impl UploadClient {
    /// Creates a validated upload client.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the base URL is not
    /// HTTPS or has no host.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn UploadTransport>,
        source: Arc<dyn MediaSource>,
    ) -> Result<Self, UploadError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            source,
            ledger: Arc::new(InFlightLedger::default()),
        })
    }

    /// Returns the configured base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits one request: encode, send once, classify the status.
    ///
    /// Every media field's fingerprint is reserved for the duration of the
    /// call; an overlapping submission of the same handle is rejected instead
    /// of duplicated. No retry, no client-side timeout.
    ///
    /// # Errors
    /// Returns [`UploadError::MediaInFlight`] for overlapping media,
    /// [`UploadError::UnreadableMedia`] when bytes cannot be resolved,
    /// transport errors as reported, [`UploadError::Client`] for 4xx, and
    /// [`UploadError::Server`] for any other non-2xx status.
    pub fn submit(&self, request: &UploadRequest) -> Result<UploadResult, UploadError> {
        let fingerprints: Vec<String> =
            request.media_handles().map(media_fingerprint).collect();
        let _reservation = self.ledger.reserve(fingerprints)?;

        let boundary = generate_boundary();
        let body = encode_multipart(request, self.source.as_ref(), &boundary)?;
        let envelope = UploadEnvelope {
            url: format!("{}{}", self.base_url, request.path()),
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body,
        };

        let response = self.transport.send(&envelope)?;
        match response.status {
            200..=299 => Ok(UploadResult::new(response.status, response.body)),
            400..=499 => Err(UploadError::Client(response.status)),
            status => Err(UploadError::Server(status)),
        }
    }
}

/// Validates upload base URL constraints.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] for non-HTTPS or host-less URLs.
pub fn validate_base_url(base_url: &str) -> Result<(), UploadError> {
    let parsed = Url::parse(base_url)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid base url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(UploadError::InvalidEndpoint(
            "upload base url must use https".to_string(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(UploadError::InvalidEndpoint(
            "upload base url must include a host".to_string(),
        ));
    }

    Ok(())
}

/// Coarse failure class used for status-line projection.
///
/// Classification never drives automatic retries; the user re-invokes the
/// action manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Retrying the same action by hand may succeed.
    Retriable,
    /// The same action will keep failing until its inputs change.
    Permanent,
}

/// Maps an upload error to its failure class.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::Transport(_)
        | UploadError::Timeout
        | UploadError::Server(_)
        | UploadError::MediaInFlight(_) => FailureClass::Retriable,
        UploadError::InvalidEndpoint(_)
        | UploadError::UnreadableMedia(_)
        | UploadError::Client(_) => FailureClass::Permanent,
    }
}

/// Errors produced by the upload client.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Base URL violates endpoint policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// A media field's bytes could not be resolved.
    #[error("unreadable media: {0}")]
    UnreadableMedia(String),
    /// Request could not be delivered.
    #[error("upload transport failure: {0}")]
    Transport(String),
    /// Transport-reported timeout.
    #[error("upload timed out")]
    Timeout,
    /// Backend rejected the request (4xx).
    #[error("client error status {0}")]
    Client(u16),
    /// Backend failed to process the request (non-2xx, non-4xx).
    #[error("server error status {0}")]
    Server(u16),
    /// The same media handle is already part of an in-flight submission.
    #[error("media already in flight: {0}")]
    MediaInFlight(String),
}

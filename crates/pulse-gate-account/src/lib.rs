#![warn(missing_docs)]
//! # pulse-gate-account
//!
//! ## Purpose
//! Implements the login and registration submission steps.
//!
//! ## Responsibilities
//! - Validate credential inputs before any network activity.
//! - Assemble login/registration multipart requests in backend field order.
//! - Convert a successful login into an opaque session handle.
//!
//! ## Data flow
//! Screen collects a username and optional still ->
//! [`AccountClient::login`]/[`AccountClient::register`] assemble an
//! [`pulse_gate_core::UploadRequest`] -> [`pulse_gate_upload::UploadClient`]
//! submits it -> a 2xx response yields [`SessionHandle`].
//!
//! ## Ownership and lifetimes
//! Submissions own their values; an attached still handle is consumed by the
//! request so it cannot be resubmitted while in flight.
//!
//! ## Error model
//! Blank usernames fail as [`AccountError::EmptyUsername`] before any upload.
//! Upload failures propagate unchanged for the screen's status line.
//!
//! ## Security and privacy notes
//! This crate does not log usernames or media locations. The session handle
//! carries no secret; it is the backend-echoed username only.

use pulse_gate_core::{CoreError, MediaHandle, UploadRequest};
use pulse_gate_upload::{UploadClient, UploadError};
use thiserror::Error;

/// Backend path for login submissions.
pub const LOGIN_PATH: &str = "/login";

/// Backend path for registration submissions.
pub const REGISTER_PATH: &str = "/register";

/// Multipart field carrying the account name.
pub const USERNAME_FIELD: &str = "username";

/// Multipart field carrying the integer heart-rate reading.
pub const HEART_RATE_FIELD: &str = "heart_rate";

/// Multipart field carrying the optional still image.
pub const IMAGE_FIELD: &str = "image";

/// Inputs for one login attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSubmission {
    /// Account name as typed.
    pub username: String,
    /// Integer heart-rate reading; zero when never derived.
    pub heart_rate: i64,
    /// Optional still image captured on the login screen.
    pub image: Option<MediaHandle>,
}

/// Inputs for one registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterSubmission {
    /// Account name as typed.
    pub username: String,
    /// Optional still image captured on the registration screen.
    pub image: Option<MediaHandle>,
}

/// Opaque login result handed to downstream screens.
///
/// The backend echoes no token; the handle is the submitted username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Username the session was opened for.
    pub username: String,
}

/// Client for account submissions over the shared upload client.
#[derive(Clone)]
pub struct AccountClient {
    upload: UploadClient,
}

impl AccountClient {
    /// Creates an account client over an already-validated upload client.
    pub fn new(upload: UploadClient) -> Self {
        Self { upload }
    }

    /// Submits a login request and yields the session handle.
    ///
    /// # Errors
    /// Returns [`AccountError::EmptyUsername`] for a blank username before
    /// any upload starts. Upload failures propagate as
    /// [`AccountError::Upload`].
    pub fn login(&self, submission: &LoginSubmission) -> Result<SessionHandle, AccountError> {
        if submission.username.trim().is_empty() {
            return Err(AccountError::EmptyUsername);
        }

        let mut request = UploadRequest::new(LOGIN_PATH)?;
        request.push_text(USERNAME_FIELD, submission.username.clone())?;
        request.push_text(HEART_RATE_FIELD, submission.heart_rate.to_string())?;
        if let Some(image) = &submission.image {
            request.push_media(IMAGE_FIELD, image.clone())?;
        }

        self.upload.submit(&request)?;

        Ok(SessionHandle {
            username: submission.username.clone(),
        })
    }

    /// Submits a registration request.
    ///
    /// # Errors
    /// Returns [`AccountError::EmptyUsername`] for a blank username before
    /// any upload starts. Upload failures propagate as
    /// [`AccountError::Upload`].
    pub fn register(&self, submission: &RegisterSubmission) -> Result<(), AccountError> {
        if submission.username.trim().is_empty() {
            return Err(AccountError::EmptyUsername);
        }

        let mut request = UploadRequest::new(REGISTER_PATH)?;
        request.push_text(USERNAME_FIELD, submission.username.clone())?;
        if let Some(image) = &submission.image {
            request.push_media(IMAGE_FIELD, image.clone())?;
        }

        self.upload.submit(&request)?;
        Ok(())
    }
}

/// Errors produced by account submission steps.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Username is blank after trimming.
    #[error("username must be non-empty")]
    EmptyUsername,
    /// Request assembly failure.
    #[error("request assembly failure: {0}")]
    Request(#[from] CoreError),
    /// Upload client failure.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

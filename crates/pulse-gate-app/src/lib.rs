#![warn(missing_docs)]
//! # pulse-gate-app
//!
//! ## Purpose
//! Orchestrates permissions, capture, upload, heart-rate derivation, and
//! account submission for `pulse-gate`.
//!
//! ## Responsibilities
//! - Enforce the permission gate before any capture control is exposed.
//! - Drive camera effects around recording state transitions, torch included.
//! - Run the derive and login steps over the shared upload client.
//! - Project workflow state into screen-facing structs.
//! - Provide environment configuration and kill-switch behavior.
//!
//! ## Data flow
//! Permission grants -> recording session -> media handle -> heart-rate
//! derivation -> login submission -> dashboard snapshot.
//!
//! ## Ownership and lifetimes
//! [`LoginWorkflow`] owns all session state. Collaborators are shared
//! `Arc<dyn Trait>` handles; every workflow action takes `&mut self`, so one
//! controller never interleaves two user actions.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`], recorded on the status
//! line, and never retried automatically. A failed action clears its busy
//! stage so the screen stays interactive.
//!
//! ## Security and privacy notes
//! - Capture is blocked unless camera consent is granted.
//! - Kill-switch env var can stop capture at runtime.
//! - Logs carry media labels and usernames' lengths, never asset bytes.

use std::sync::Arc;

use pulse_gate_account::{
    AccountClient, AccountError, LoginSubmission, RegisterSubmission, SessionHandle,
};
use pulse_gate_capture::{
    CameraBackend, CaptureError, RecordingLimits, RecordingSession, RecordingStatus,
    StillCaptureOptions,
};
use pulse_gate_core::{CoreError, MediaHandle, UploadRequest, UploadResult};
use pulse_gate_permissions::{PermissionGateway, PermissionGrants, PermissionPrompter};
use pulse_gate_ui::{
    DashboardSnapshot, LoginScreenState, StageStatus, dashboard_snapshot, heart_rate_display,
};
use pulse_gate_upload::{FailureClass, UploadClient, UploadError, classify_upload_error};
use pulse_gate_vitals_contract::{
    HeartRateReading, VitalsContractError, parse_heart_rate_response,
};
use thiserror::Error;
use tracing::{info, warn};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PULSE_GATE_VERSION");

/// Backend path for heart-rate derivation submissions.
pub const HEART_RATE_PATH: &str = "/get_heart_rate";

/// Multipart field carrying the recorded clip.
pub const VIDEO_FIELD: &str = "video";

/// Blocking message shown when camera consent was denied.
pub const CAMERA_BLOCKED_MESSAGE: &str = "Camera access is required to sign in.";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Reads the backend base URL from the process environment.
///
/// # Errors
/// Returns [`AppError::ConfigMissing`] when `PULSE_GATE_BASE_URL` is unset or
/// blank.
pub fn base_url_from_env() -> Result<String, AppError> {
    match std::env::var("PULSE_GATE_BASE_URL") {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::ConfigMissing("PULSE_GATE_BASE_URL")),
    }
}

/// Checks the runtime capture kill-switch env var.
///
/// Semantics:
/// - Unset => capture enabled.
/// - `0`, `false`, `off` (case-insensitive) => capture disabled.
/// - Any other value => capture enabled.
pub fn capture_enabled_from_env() -> bool {
    match std::env::var("PULSE_GATE_CAPTURE_ENABLED") {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        Err(_) => true,
    }
}

/// Extracts the upload failure class from a workflow error, when one applies.
///
/// Used by render layers to phrase the status line; never used to retry.
pub fn failure_class(error: &AppError) -> Option<FailureClass> {
    match error {
        AppError::Upload(upload) => Some(classify_upload_error(upload)),
        AppError::Account(AccountError::Upload(upload)) => Some(classify_upload_error(upload)),
        _ => None,
    }
}

/// Controller owning one login screen's capture-and-submit workflow.
///
/// Actions take `&mut self`: a second user action cannot begin while one is
/// executing, which together with the upload client's in-flight ledger keeps
/// every media handle in at most one submission at a time.
pub struct LoginWorkflow {
    gateway: PermissionGateway,
    camera: Arc<dyn CameraBackend>,
    upload: UploadClient,
    account: AccountClient,
    session: RecordingSession,
    still: Option<MediaHandle>,
    heart_rate: Option<HeartRateReading>,
    last_derivation: Option<UploadResult>,
    session_handle: Option<SessionHandle>,
    derivation: StageStatus,
    submission: StageStatus,
    status_line: Option<String>,
}

impl LoginWorkflow {
    /// Creates a workflow over injected device and transport collaborators.
    ///
    /// The account client shares the upload client's in-flight ledger, so a
    /// handle attached to a login submission is protected from concurrent
    /// derivation submissions and vice versa.
    pub fn new(
        prompter: Arc<dyn PermissionPrompter>,
        camera: Arc<dyn CameraBackend>,
        upload: UploadClient,
    ) -> Self {
        let account = AccountClient::new(upload.clone());
        Self {
            gateway: PermissionGateway::new(prompter),
            camera,
            upload,
            account,
            session: RecordingSession::new(),
            still: None,
            heart_rate: None,
            last_derivation: None,
            session_handle: None,
            derivation: StageStatus::Idle,
            submission: StageStatus::Idle,
            status_line: None,
        }
    }

    /// Resolves camera and microphone consent, prompting at most once.
    ///
    /// # Errors
    /// Returns [`AppError::Permission`] when a prompt could not be delivered.
    /// A denial is not an error; it resolves the session to a blocked state.
    pub fn acquire_permissions(&mut self) -> Result<PermissionGrants, AppError> {
        match self.gateway.acquire() {
            Ok(grants) => {
                info!(
                    camera = ?grants.camera,
                    microphone = ?grants.microphone,
                    "permissions resolved"
                );
                if !grants.capture_allowed() {
                    self.status_line = Some(CAMERA_BLOCKED_MESSAGE.to_string());
                }
                Ok(grants)
            }
            Err(error) => {
                warn!(error = %error, "permission prompt failed");
                self.status_line = Some(error.to_string());
                Err(AppError::Permission(error))
            }
        }
    }

    /// Starts a clip: admits the transition, then drives camera and torch.
    ///
    /// Device effects roll back on failure so the session never reports
    /// `Recording` without the camera actually rolling.
    ///
    /// # Errors
    /// Returns [`AppError::CaptureDisabled`] when the kill-switch is off,
    /// and [`AppError::Capture`] for permission, transition, or backend
    /// failures.
    pub fn start_recording(&mut self, now_ms: u64) -> Result<(), AppError> {
        if !capture_enabled_from_env() {
            self.status_line = Some(AppError::CaptureDisabled.to_string());
            return Err(AppError::CaptureDisabled);
        }

        self.status_line = None;
        if let Err(error) = self.session.start(self.gateway.grants().camera, now_ms) {
            self.status_line = Some(error.to_string());
            return Err(AppError::Capture(error));
        }

        let limits = RecordingLimits::pulse_clip();
        if let Err(error) = self.camera.begin_video(&limits) {
            self.session.reset();
            self.status_line = Some(error.to_string());
            return Err(AppError::Capture(error));
        }
        if let Err(error) = self.camera.set_torch(true) {
            // The clip is already rolling; abandon it before unwinding.
            let _ = self.camera.end_video();
            self.session.reset();
            self.status_line = Some(error.to_string());
            return Err(AppError::Capture(error));
        }

        info!(started_at_ms = now_ms, "recording started");
        Ok(())
    }

    /// Stops the clip, disables the torch, and commits the outcome.
    ///
    /// The torch goes off on every path. A device that produces no asset
    /// returns the session to `Idle`.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] for an illegal transition, a backend
    /// failure, or a clip-less outcome.
    pub fn stop_recording(&mut self) -> Result<(), AppError> {
        if self.session.status() != RecordingStatus::Recording {
            return Err(AppError::Capture(CaptureError::InvalidTransition {
                from: self.session.status(),
                action: "stop",
            }));
        }

        let outcome = self.camera.end_video();
        if let Err(error) = self.camera.set_torch(false) {
            warn!(error = %error, "torch did not disengage after recording");
        }

        match outcome {
            Ok(maybe_handle) => match self.session.stop(maybe_handle) {
                Ok(clip) => {
                    info!(clip = %clip.log_label(), "recording stopped");
                    Ok(())
                }
                Err(error) => {
                    self.status_line = Some(error.to_string());
                    Err(AppError::Capture(error))
                }
            },
            Err(error) => {
                // Finalization failed outright; the machine must not stay in
                // Recording. The stop(None) error is superseded by the
                // backend's own report.
                let _ = self.session.stop(None);
                self.status_line = Some(error.to_string());
                Err(AppError::Capture(error))
            }
        }
    }

    /// Captures a still through the device picker.
    ///
    /// Returns `Ok(true)` when a new still is attached and `Ok(false)` when
    /// the user cancelled; a cancel keeps the previously captured still.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] when camera consent is missing or the
    /// picker fails outright.
    pub fn capture_still(&mut self, options: &StillCaptureOptions) -> Result<bool, AppError> {
        if !self.gateway.grants().capture_allowed() {
            return Err(AppError::Capture(CaptureError::PermissionDenied));
        }

        match self.camera.take_still(options) {
            Ok(Some(handle)) => {
                info!(still = %handle.log_label(), "still captured");
                self.still = Some(handle);
                Ok(true)
            }
            Ok(None) => {
                info!("still capture cancelled; keeping previous image");
                Ok(false)
            }
            Err(error) => {
                self.status_line = Some(error.to_string());
                Err(AppError::Capture(error))
            }
        }
    }

    /// Submits the recorded clip for heart-rate derivation.
    ///
    /// On success the reading is stored, the upload result carries the
    /// derived metric, and the clip is released from the session. On failure
    /// the previously derived reading and the clip are both retained so the
    /// user can re-invoke the action.
    ///
    /// # Errors
    /// Returns [`AppError::MissingClip`] without a finalized clip, upload
    /// failures as [`AppError::Upload`], and contract violations as
    /// [`AppError::Vitals`].
    pub fn derive_heart_rate(&mut self) -> Result<HeartRateReading, AppError> {
        self.derivation = StageStatus::Running;
        self.status_line = None;

        match self.try_derive_heart_rate() {
            Ok(reading) => {
                self.derivation = StageStatus::Healthy;
                Ok(reading)
            }
            Err(error) => {
                self.derivation = StageStatus::Degraded;
                self.status_line = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn try_derive_heart_rate(&mut self) -> Result<HeartRateReading, AppError> {
        let clip = self.session.media().cloned().ok_or(AppError::MissingClip)?;
        let clip_label = clip.log_label();

        let mut request = UploadRequest::new(HEART_RATE_PATH)?;
        request.push_media(VIDEO_FIELD, clip)?;

        let result = self.upload.submit(&request)?;
        let reading = parse_heart_rate_response(&result.raw_response)?;

        self.heart_rate = Some(reading);
        self.last_derivation = Some(result.with_metric(reading.bpm));
        self.session.release_media();
        info!(bpm = reading.bpm, clip = %clip_label, "heart rate derived");
        Ok(reading)
    }

    /// Submits the login request with the derived reading and optional still.
    ///
    /// The heart-rate field is integer-truncated and defaults to zero when no
    /// reading was ever derived. A successful login consumes the attached
    /// still and yields the session handle for the dashboard.
    ///
    /// # Errors
    /// Returns [`AppError::Account`] for validation and upload failures.
    pub fn login(&mut self, username: &str) -> Result<SessionHandle, AppError> {
        self.submission = StageStatus::Running;
        self.status_line = None;

        let submission = LoginSubmission {
            username: username.to_string(),
            heart_rate: self.heart_rate.map_or(0, |reading| reading.form_value()),
            image: self.still.clone(),
        };

        match self.account.login(&submission) {
            Ok(handle) => {
                self.submission = StageStatus::Healthy;
                self.still = None;
                info!(username_len = handle.username.len(), "login succeeded");
                self.session_handle = Some(handle.clone());
                Ok(handle)
            }
            Err(error) => {
                self.submission = StageStatus::Degraded;
                self.status_line = Some(error.to_string());
                warn!(error = %error, "login failed");
                Err(AppError::Account(error))
            }
        }
    }

    /// Submits a registration request with the optional still.
    ///
    /// # Errors
    /// Returns [`AppError::Account`] for validation and upload failures.
    pub fn register(&mut self, username: &str) -> Result<(), AppError> {
        self.submission = StageStatus::Running;
        self.status_line = None;

        let submission = RegisterSubmission {
            username: username.to_string(),
            image: self.still.clone(),
        };

        match self.account.register(&submission) {
            Ok(()) => {
                self.submission = StageStatus::Healthy;
                self.still = None;
                info!(username_len = submission.username.len(), "registration succeeded");
                Ok(())
            }
            Err(error) => {
                self.submission = StageStatus::Degraded;
                self.status_line = Some(error.to_string());
                warn!(error = %error, "registration failed");
                Err(AppError::Account(error))
            }
        }
    }

    /// Returns the recording session to `Idle`, discarding any held clip.
    pub fn reset_capture(&mut self) {
        self.session.reset();
        info!("recording session reset");
    }

    /// Returns the current permission grants snapshot.
    pub fn grants(&self) -> PermissionGrants {
        self.gateway.grants()
    }

    /// Returns the recording session's lifecycle state.
    pub fn recording_status(&self) -> RecordingStatus {
        self.session.status()
    }

    /// Returns the finalized clip held by the session, if any.
    pub fn clip(&self) -> Option<&MediaHandle> {
        self.session.media()
    }

    /// Returns the currently attached still, if any.
    pub fn still(&self) -> Option<&MediaHandle> {
        self.still.as_ref()
    }

    /// Returns the last derived reading, if any.
    pub fn heart_rate(&self) -> Option<HeartRateReading> {
        self.heart_rate
    }

    /// Returns the derivation upload result with the metric filled in.
    pub fn last_derivation(&self) -> Option<&UploadResult> {
        self.last_derivation.as_ref()
    }

    /// Returns the session handle from the last successful login.
    pub fn session_handle(&self) -> Option<&SessionHandle> {
        self.session_handle.as_ref()
    }

    /// Projects workflow state into the login screen struct.
    pub fn project(&self) -> LoginScreenState {
        let grants = self.gateway.grants();
        let blocked = self.gateway.is_resolved() && !grants.capture_allowed();

        LoginScreenState {
            version: APP_VERSION.to_string(),
            blocked_message: blocked.then(|| CAMERA_BLOCKED_MESSAGE.to_string()),
            show_capture_controls: grants.capture_allowed(),
            recording_active: self.session.status() == RecordingStatus::Recording,
            clip_label: self.session.media().map(MediaHandle::log_label),
            still_label: self.still.as_ref().map(MediaHandle::log_label),
            heart_rate_display: heart_rate_display(self.heart_rate.as_ref()),
            derivation: self.derivation,
            submission: self.submission,
            status_line: self.status_line.clone(),
        }
    }

    /// Builds the dashboard snapshot once a login succeeded.
    pub fn dashboard(&self) -> Option<DashboardSnapshot> {
        self.session_handle
            .as_ref()
            .map(|handle| dashboard_snapshot(Some(handle.username.as_str())))
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Permission gateway error.
    #[error("permission error: {0}")]
    Permission(#[from] pulse_gate_permissions::PermissionError),
    /// Capture subsystem error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Core model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Upload client error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Heart-rate contract error.
    #[error("heart-rate error: {0}")]
    Vitals(#[from] VitalsContractError),
    /// Account submission error.
    #[error("account error: {0}")]
    Account(#[from] AccountError),
    /// Heart-rate derivation was requested without a finalized clip.
    #[error("no recorded clip is available for heart-rate derivation")]
    MissingClip,
    /// Capture kill-switch is engaged.
    #[error("capture is disabled by the PULSE_GATE_CAPTURE_ENABLED kill-switch")]
    CaptureDisabled,
    /// Required environment configuration is absent.
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),
}

#![warn(missing_docs)]
//! # pulse-gate-capture
//!
//! ## Purpose
//! Provides the recording state machine and camera backend abstractions.
//!
//! ## Responsibilities
//! - Define a backend-agnostic camera trait for video, still, and torch
//!   control.
//! - Model legal recording transitions independently of device effects.
//! - Expose deterministic synthetic capture for CI and unit tests.
//!
//! ## Data flow
//! Controller checks grants -> [`RecordingSession::start`] admits the
//! transition -> controller drives [`CameraBackend`] effects ->
//! [`RecordingSession::stop`] commits the produced
//! [`pulse_gate_core::MediaHandle`].
//!
//! ## Ownership and lifetimes
//! The session owns its media handle until the controller releases it after a
//! successful upload; backends never retain handles they return.
//!
//! ## Error model
//! Illegal transitions, missing camera consent, and backend failures are
//! reported as [`CaptureError`] values.
//!
//! ## Security and privacy notes
//! This crate handles asset locations only, never asset bytes. Backends must
//! keep captured assets device-local until the upload layer reads them.

use std::sync::Mutex;

use pulse_gate_core::{MediaHandle, MediaKind};
use pulse_gate_permissions::PermissionState;
use thiserror::Error;

/// Longest clip the capture layer will record, in seconds.
pub const MAX_CLIP_SECONDS: u32 = 10;

/// Video resolution requested from the capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoQuality {
    /// 1280x720.
    Hd720,
    /// 1920x1080.
    Hd1080,
    /// 3840x2160.
    Uhd2160,
}

/// Limits applied by the capture layer to one video recording.
///
/// The capture layer enforces the duration cap itself; the state machine
/// never watches the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingLimits {
    /// Hard duration cap in seconds.
    pub max_duration_seconds: u32,
    /// Requested resolution.
    pub quality: VideoQuality,
}

impl RecordingLimits {
    /// Creates validated recording limits.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidLimits`] when the duration cap is zero.
    pub fn new(max_duration_seconds: u32, quality: VideoQuality) -> Result<Self, CaptureError> {
        if max_duration_seconds == 0 {
            return Err(CaptureError::InvalidLimits(
                "duration cap must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            max_duration_seconds,
            quality,
        })
    }

    /// Returns the limits used for pulse clips: 10 seconds at 1080p.
    pub fn pulse_clip() -> Self {
        Self {
            max_duration_seconds: MAX_CLIP_SECONDS,
            quality: VideoQuality::Hd1080,
        }
    }
}

/// Options for one still-image capture through the device picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StillCaptureOptions {
    /// Whether the picker offers an edit/crop step before returning.
    pub allows_editing: bool,
    /// Crop aspect ratio as width:height.
    pub aspect: (u32, u32),
    /// Compression quality in `(0.0, 1.0]`.
    pub quality: f32,
}

impl StillCaptureOptions {
    /// Creates validated still-capture options.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidLimits`] when quality is outside
    /// `(0.0, 1.0]` or either aspect component is zero.
    pub fn new(
        allows_editing: bool,
        aspect: (u32, u32),
        quality: f32,
    ) -> Result<Self, CaptureError> {
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(CaptureError::InvalidLimits(format!(
                "still quality must be in (0.0, 1.0], got {quality}"
            )));
        }
        if aspect.0 == 0 || aspect.1 == 0 {
            return Err(CaptureError::InvalidLimits(
                "aspect components must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            allows_editing,
            aspect,
            quality,
        })
    }
}

/// Trait implemented by concrete camera providers.
///
/// Calls block until the device completes the operation or the user dismisses
/// the relevant picker.
pub trait CameraBackend: Send + Sync {
    /// Starts writing a video clip under the given limits.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when the device refuses to record.
    fn begin_video(&self, limits: &RecordingLimits) -> Result<(), CaptureError>;

    /// Finalizes the current clip.
    ///
    /// Returns `Ok(None)` when the device produced no asset, which callers
    /// must treat as a failed recording.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when finalization fails outright.
    fn end_video(&self) -> Result<Option<MediaHandle>, CaptureError>;

    /// Switches the torch on or off.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when the torch cannot be driven.
    fn set_torch(&self, enabled: bool) -> Result<(), CaptureError>;

    /// Captures one still image through the device picker.
    ///
    /// Returns `Ok(None)` when the user cancelled the picker.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when capture fails outright.
    fn take_still(
        &self,
        options: &StillCaptureOptions,
    ) -> Result<Option<MediaHandle>, CaptureError>;
}

/// Lifecycle state of one recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStatus {
    /// No recording has started, or the session was reset.
    Idle,
    /// A clip is being written by the capture layer.
    Recording,
    /// A clip was finalized and its handle is held by the session.
    Stopped,
}

/// Pure state machine for one screen's recording lifecycle.
///
/// The machine admits or rejects transitions; the owning controller performs
/// the matching [`CameraBackend`] effects and feeds outcomes back in.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    status: RecordingStatus,
    started_at_ms: Option<u64>,
    media: Option<MediaHandle>,
}

impl RecordingSession {
    /// Creates a session in `Idle` with no held media.
    pub fn new() -> Self {
        Self {
            status: RecordingStatus::Idle,
            started_at_ms: None,
            media: None,
        }
    }

    /// Returns the current lifecycle state.
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    /// Returns the epoch-millis start of the clip being recorded, if any.
    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Returns the held media handle, if a clip was finalized.
    pub fn media(&self) -> Option<&MediaHandle> {
        self.media.as_ref()
    }

    /// Admits the start transition.
    ///
    /// # Errors
    /// Returns [`CaptureError::PermissionDenied`] unless camera consent is
    /// granted, and [`CaptureError::InvalidTransition`] unless the session is
    /// `Idle`.
    pub fn start(&mut self, camera: PermissionState, now_ms: u64) -> Result<(), CaptureError> {
        if self.status != RecordingStatus::Idle {
            return Err(CaptureError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        if !matches!(camera, PermissionState::Granted) {
            return Err(CaptureError::PermissionDenied);
        }

        self.status = RecordingStatus::Recording;
        self.started_at_ms = Some(now_ms);
        Ok(())
    }

    /// Commits the stop transition with the capture layer's outcome.
    ///
    /// `Some(handle)` moves the session to `Stopped` holding the handle.
    /// `None` means the device produced no asset: the session returns to
    /// `Idle` so it never sits in `Stopped` without media.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidTransition`] unless the session is
    /// `Recording`, and [`CaptureError::CaptureFailed`] for the no-asset
    /// outcome.
    pub fn stop(&mut self, outcome: Option<MediaHandle>) -> Result<&MediaHandle, CaptureError> {
        if self.status != RecordingStatus::Recording {
            return Err(CaptureError::InvalidTransition {
                from: self.status,
                action: "stop",
            });
        }

        match outcome {
            Some(handle) => {
                if handle.kind != MediaKind::Video {
                    self.status = RecordingStatus::Idle;
                    self.started_at_ms = None;
                    return Err(CaptureError::CaptureFailed(format!(
                        "recording finalized a non-video asset: {}",
                        handle.file_name()
                    )));
                }
                self.status = RecordingStatus::Stopped;
                self.started_at_ms = None;
                // Invariant: Stopped always holds media; release_media is the
                // only way it leaves the session without reset.
                Ok(self.media.insert(handle))
            }
            None => {
                self.status = RecordingStatus::Idle;
                self.started_at_ms = None;
                Err(CaptureError::CaptureFailed(
                    "recording ended without a media asset".to_string(),
                ))
            }
        }
    }

    /// Returns the session to `Idle`, discarding any held media.
    pub fn reset(&mut self) {
        self.status = RecordingStatus::Idle;
        self.started_at_ms = None;
        self.media = None;
    }

    /// Hands the held media to the caller after a successful upload.
    ///
    /// The session stays `Stopped`; capture controls remain hidden until a
    /// `reset`.
    pub fn release_media(&mut self) -> Option<MediaHandle> {
        self.media.take()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic synthetic camera for test and CI usage.
///
/// Produces sequenced `file:///captures/clip-N.mp4` handles and tracks torch
/// state so tests can assert effect ordering.
#[derive(Debug)]
pub struct SyntheticCameraBackend {
    state: Mutex<SyntheticCameraState>,
}

#[derive(Debug)]
struct SyntheticCameraState {
    recording: bool,
    torch_on: bool,
    clip_sequence: u64,
    still_sequence: u64,
}

impl SyntheticCameraBackend {
    /// Creates a synthetic camera with no clip in progress.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SyntheticCameraState {
                recording: false,
                torch_on: false,
                clip_sequence: 0,
                still_sequence: 0,
            }),
        }
    }

    /// Returns `true` while the synthetic torch is on.
    pub fn torch_on(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.torch_on)
            .unwrap_or(false)
    }
}

impl Default for SyntheticCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn begin_video(&self, _limits: &RecordingLimits) -> Result<(), CaptureError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic camera lock poisoned".to_string()))?;
        if state.recording {
            return Err(CaptureError::Backend(
                "synthetic camera is already recording".to_string(),
            ));
        }
        state.recording = true;
        Ok(())
    }

    fn end_video(&self) -> Result<Option<MediaHandle>, CaptureError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic camera lock poisoned".to_string()))?;
        if !state.recording {
            return Err(CaptureError::Backend(
                "synthetic camera has no clip in progress".to_string(),
            ));
        }
        state.recording = false;
        state.clip_sequence += 1;

        let handle = MediaHandle::new(
            format!("file:///captures/clip-{}.mp4", state.clip_sequence),
            Some("video/mp4".to_string()),
            MediaKind::Video,
        )
        .map_err(|error| CaptureError::Backend(error.to_string()))?;
        Ok(Some(handle))
    }

    fn set_torch(&self, enabled: bool) -> Result<(), CaptureError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic camera lock poisoned".to_string()))?;
        state.torch_on = enabled;
        Ok(())
    }

    fn take_still(
        &self,
        _options: &StillCaptureOptions,
    ) -> Result<Option<MediaHandle>, CaptureError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic camera lock poisoned".to_string()))?;
        state.still_sequence += 1;

        let handle = MediaHandle::new(
            format!("file:///captures/still-{}.jpg", state.still_sequence),
            Some("image/jpeg".to_string()),
            MediaKind::Image,
        )
        .map_err(|error| CaptureError::Backend(error.to_string()))?;
        Ok(Some(handle))
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Camera consent was not granted.
    #[error("camera permission is not granted")]
    PermissionDenied,
    /// Requested transition is illegal from the current state.
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        /// State the session was in when the call arrived.
        from: RecordingStatus,
        /// Rejected action name.
        action: &'static str,
    },
    /// Capture layer failed to produce a usable asset.
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    /// Recording or still options are out of range.
    #[error("invalid capture limits: {0}")]
    InvalidLimits(String),
    /// Backend runtime failure.
    #[error("camera backend failure: {0}")]
    Backend(String),
}

//! Shared fixtures for app integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pulse_gate_app::LoginWorkflow;
use pulse_gate_capture::{CameraBackend, CaptureError, RecordingLimits, StillCaptureOptions};
use pulse_gate_core::{MediaHandle, MediaKind};
use pulse_gate_permissions::{PermissionError, PermissionKind, PermissionPrompter, PromptVerdict};
use pulse_gate_upload::{
    InMemoryMediaSource, TransportResponse, UploadClient, UploadEnvelope, UploadError,
    UploadTransport,
};

/// Location the scripted camera reports for finalized clips.
#[allow(dead_code)]
pub const CLIP_LOCATION: &str = "file:///captures/clip-1.mp4";

/// Location the scripted camera reports for captured stills.
#[allow(dead_code)]
pub const STILL_LOCATION: &str = "file:///captures/still-1.jpg";

/// Builds the clip handle matching [`CLIP_LOCATION`].
#[allow(dead_code)]
pub fn fixture_clip() -> MediaHandle {
    MediaHandle::new(CLIP_LOCATION, None, MediaKind::Video).expect("clip fixture should be valid")
}

/// Builds the still handle matching [`STILL_LOCATION`].
#[allow(dead_code)]
pub fn fixture_still() -> MediaHandle {
    MediaHandle::new(STILL_LOCATION, None, MediaKind::Image).expect("still fixture should be valid")
}

/// Prompter answering with a fixed verdict per capability.
#[allow(dead_code)]
pub struct FixedPrompter {
    camera: PromptVerdict,
    microphone: PromptVerdict,
}

#[allow(dead_code)]
impl FixedPrompter {
    /// Grants both capabilities.
    pub fn granting() -> Self {
        Self {
            camera: PromptVerdict::Granted,
            microphone: PromptVerdict::Granted,
        }
    }

    /// Denies the camera and grants the microphone.
    pub fn camera_denied() -> Self {
        Self {
            camera: PromptVerdict::Denied,
            microphone: PromptVerdict::Granted,
        }
    }

    /// Grants the camera and denies the microphone.
    pub fn microphone_denied() -> Self {
        Self {
            camera: PromptVerdict::Granted,
            microphone: PromptVerdict::Denied,
        }
    }
}

impl PermissionPrompter for FixedPrompter {
    fn request(&self, kind: PermissionKind) -> Result<PromptVerdict, PermissionError> {
        Ok(match kind {
            PermissionKind::Camera => self.camera,
            PermissionKind::Microphone => self.microphone,
        })
    }
}

/// Camera with scripted outcomes and torch call recording.
#[allow(dead_code)]
pub struct ScriptedCamera {
    produce_clip: bool,
    produce_still: bool,
    still_script: Mutex<Vec<bool>>,
    torch_states: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl ScriptedCamera {
    /// Creates a camera that yields the fixture clip and still.
    pub fn new() -> Self {
        Self::with_outcomes(true, true)
    }

    /// Creates a camera with explicit clip/still outcomes; `false` means the
    /// device yields no asset (failed recording or cancelled picker).
    pub fn with_outcomes(produce_clip: bool, produce_still: bool) -> Self {
        Self {
            produce_clip,
            produce_still,
            still_script: Mutex::new(Vec::new()),
            torch_states: Mutex::new(Vec::new()),
        }
    }

    /// Creates a clip-producing camera whose picker follows `script` call by
    /// call (`true` picks the fixture still, `false` cancels), then falls
    /// back to picking.
    pub fn with_still_script(script: Vec<bool>) -> Self {
        Self {
            produce_clip: true,
            produce_still: true,
            still_script: Mutex::new(script),
            torch_states: Mutex::new(Vec::new()),
        }
    }

    /// Torch states in call order.
    pub fn torch_states(&self) -> Vec<bool> {
        self.torch_states.lock().expect("torch lock should hold").clone()
    }
}

impl CameraBackend for ScriptedCamera {
    fn begin_video(&self, _limits: &RecordingLimits) -> Result<(), CaptureError> {
        Ok(())
    }

    fn end_video(&self) -> Result<Option<MediaHandle>, CaptureError> {
        Ok(self.produce_clip.then(fixture_clip))
    }

    fn set_torch(&self, enabled: bool) -> Result<(), CaptureError> {
        self.torch_states
            .lock()
            .expect("torch lock should hold")
            .push(enabled);
        Ok(())
    }

    fn take_still(
        &self,
        _options: &StillCaptureOptions,
    ) -> Result<Option<MediaHandle>, CaptureError> {
        let mut script = self.still_script.lock().expect("script lock should hold");
        let produce = if script.is_empty() {
            self.produce_still
        } else {
            script.remove(0)
        };
        Ok(produce.then(fixture_still))
    }
}

/// Transport answering per path suffix and recording every envelope.
#[allow(dead_code)]
pub struct ScriptedTransport {
    responses: HashMap<String, (u16, String)>,
    envelopes: Mutex<Vec<UploadEnvelope>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Creates a transport answering `200 {}` for every path.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            envelopes: Mutex::new(Vec::new()),
        }
    }

    /// Registers a scripted response for requests ending with `path`.
    pub fn with_response(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Envelopes sent so far, in order.
    pub fn envelopes(&self) -> Vec<UploadEnvelope> {
        self.envelopes.lock().expect("envelope lock should hold").clone()
    }

    /// Number of requests that reached the transport.
    pub fn request_count(&self) -> usize {
        self.envelopes.lock().expect("envelope lock should hold").len()
    }
}

impl UploadTransport for ScriptedTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        self.envelopes
            .lock()
            .expect("envelope lock should hold")
            .push(envelope.clone());

        for (path, (status, body)) in &self.responses {
            if envelope.url.ends_with(path) {
                return Ok(TransportResponse {
                    status: *status,
                    body: body.clone(),
                });
            }
        }

        Ok(TransportResponse {
            status: 200,
            body: "{}".to_string(),
        })
    }
}

/// Builds an upload client over the given transport with fixture assets.
#[allow(dead_code)]
pub fn fixture_upload(transport: Arc<dyn UploadTransport>) -> UploadClient {
    let source = Arc::new(
        InMemoryMediaSource::new()
            .with_asset(CLIP_LOCATION, b"clip bytes".to_vec())
            .with_asset(STILL_LOCATION, b"still bytes".to_vec()),
    );
    UploadClient::new("https://bank.example", transport, source)
        .expect("fixture base url should validate")
}

/// Builds a workflow over explicit collaborators.
#[allow(dead_code)]
pub fn workflow_with(
    prompter: Arc<dyn PermissionPrompter>,
    camera: Arc<dyn CameraBackend>,
    transport: Arc<dyn UploadTransport>,
) -> LoginWorkflow {
    LoginWorkflow::new(prompter, camera, fixture_upload(transport))
}

/// Builds a workflow with both permissions already granted.
#[allow(dead_code)]
pub fn granted_workflow(transport: Arc<dyn UploadTransport>) -> LoginWorkflow {
    let mut workflow = workflow_with(
        Arc::new(FixedPrompter::granting()),
        Arc::new(ScriptedCamera::new()),
        transport,
    );
    workflow
        .acquire_permissions()
        .expect("fixture prompt should resolve");
    workflow
}

/// Builds a granted workflow holding one finalized clip.
#[allow(dead_code)]
pub fn recorded_workflow(transport: Arc<dyn UploadTransport>) -> LoginWorkflow {
    let mut workflow = granted_workflow(transport);
    workflow
        .start_recording(1_000)
        .expect("fixture recording should start");
    workflow
        .stop_recording()
        .expect("fixture recording should stop");
    workflow
}

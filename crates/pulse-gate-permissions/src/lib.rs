#![warn(missing_docs)]
//! # pulse-gate-permissions
//!
//! ## Purpose
//! Implements the device permission gateway that gates all capture features
//! in `pulse-gate`.
//!
//! ## Responsibilities
//! - Request camera and microphone consent through an injectable prompt
//!   abstraction.
//! - Resolve the session's grant state exactly once and cache the verdicts.
//! - Expose a capture-allowed predicate for controller and screen logic.
//!
//! ## Data flow
//! Controller start -> [`PermissionGateway::acquire`] prompts through
//! [`PermissionPrompter`] for camera then microphone -> resolved
//! [`PermissionGrants`] are cached and returned on every later call.
//!
//! ## Ownership and lifetimes
//! Grant state is owned by the gateway; callers receive copies so screen
//! projections never hold borrows into the gateway.
//!
//! ## Error model
//! Prompt delivery failures surface as [`PermissionError::PromptFailed`] and
//! leave the gateway unresolved. A denial is not an error: it resolves the
//! session to a terminal blocked state exposed via [`PermissionGrants`].
//!
//! ## Security and privacy notes
//! The gateway records verdicts only, never the prompt interaction itself.
//! No user-identifying data passes through this crate.
//!
//! ## Example
//! ```rust
//! use pulse_gate_permissions::{PermissionGrants, PermissionState};
//!
//! let grants = PermissionGrants::unresolved();
//! assert!(matches!(grants.camera, PermissionState::Unknown));
//! assert!(!grants.capture_allowed());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolution state of one device capability grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// Consent has not been requested yet.
    Unknown,
    /// User granted access.
    Granted,
    /// User denied access; terminal for the session.
    Denied,
}

/// Device capability a consent prompt asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    /// Camera access for still and video capture.
    Camera,
    /// Microphone access for video audio tracks.
    Microphone,
}

/// User's answer to one consent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVerdict {
    /// User accepted the prompt.
    Granted,
    /// User rejected the prompt or platform policy refused it.
    Denied,
}

impl From<PromptVerdict> for PermissionState {
    fn from(verdict: PromptVerdict) -> Self {
        match verdict {
            PromptVerdict::Granted => PermissionState::Granted,
            PromptVerdict::Denied => PermissionState::Denied,
        }
    }
}

/// Resolved grant states for the capture-relevant capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrants {
    /// Camera grant state.
    pub camera: PermissionState,
    /// Microphone grant state.
    pub microphone: PermissionState,
}

impl PermissionGrants {
    /// Returns the pre-prompt state with both capabilities unknown.
    pub fn unresolved() -> Self {
        Self {
            camera: PermissionState::Unknown,
            microphone: PermissionState::Unknown,
        }
    }

    /// Returns `true` when capture controls may be shown.
    ///
    /// Camera consent alone gates capture; a denied microphone still allows
    /// silent capture paths.
    pub fn capture_allowed(&self) -> bool {
        matches!(self.camera, PermissionState::Granted)
    }
}

/// Abstract OS consent prompt used by the gateway.
///
/// Implementations block until the user responds or platform policy times the
/// prompt out.
pub trait PermissionPrompter: Send + Sync {
    /// Presents the consent prompt for one capability.
    ///
    /// # Errors
    /// Returns [`PermissionError::PromptFailed`] when the prompt could not be
    /// delivered at all, as opposed to being answered with a denial.
    fn request(&self, kind: PermissionKind) -> Result<PromptVerdict, PermissionError>;
}

/// Gateway that resolves capture permissions once per session.
pub struct PermissionGateway {
    prompter: Arc<dyn PermissionPrompter>,
    grants: PermissionGrants,
    resolved: bool,
}

impl PermissionGateway {
    /// Creates an unresolved gateway over the given prompter.
    pub fn new(prompter: Arc<dyn PermissionPrompter>) -> Self {
        Self {
            prompter,
            grants: PermissionGrants::unresolved(),
            resolved: false,
        }
    }

    /// Resolves camera and microphone grants, prompting at most once.
    ///
    /// The first successful call prompts camera then microphone and caches
    /// both verdicts; later calls return the cached grants without touching
    /// the prompter. Denials resolve the session; they are not retried.
    ///
    /// # Errors
    /// Returns [`PermissionError::PromptFailed`] when either prompt could not
    /// be delivered. The gateway stays unresolved so a later call may prompt
    /// again.
    pub fn acquire(&mut self) -> Result<PermissionGrants, PermissionError> {
        if self.resolved {
            return Ok(self.grants);
        }

        let camera = self.prompter.request(PermissionKind::Camera)?;
        let microphone = self.prompter.request(PermissionKind::Microphone)?;

        self.grants = PermissionGrants {
            camera: camera.into(),
            microphone: microphone.into(),
        };
        self.resolved = true;

        Ok(self.grants)
    }

    /// Returns the current grant snapshot without prompting.
    pub fn grants(&self) -> PermissionGrants {
        self.grants
    }

    /// Returns `true` once a prompt pass has resolved the session.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Errors produced by the permission gateway.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// Consent prompt could not be shown or its outcome was lost.
    #[error("permission prompt failed: {0}")]
    PromptFailed(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for one-shot grant resolution.

    use std::sync::Mutex;

    use super::*;

    struct ScriptedPrompter {
        verdicts: Mutex<Vec<Result<PromptVerdict, PermissionError>>>,
        prompts_seen: Mutex<Vec<PermissionKind>>,
    }

    impl ScriptedPrompter {
        fn new(verdicts: Vec<Result<PromptVerdict, PermissionError>>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts),
                prompts_seen: Mutex::new(Vec::new()),
            }
        }

        fn prompt_count(&self) -> usize {
            self.prompts_seen.lock().expect("lock should hold").len()
        }
    }

    impl PermissionPrompter for ScriptedPrompter {
        fn request(&self, kind: PermissionKind) -> Result<PromptVerdict, PermissionError> {
            self.prompts_seen
                .lock()
                .expect("lock should hold")
                .push(kind);
            self.verdicts
                .lock()
                .expect("lock should hold")
                .remove(0)
        }
    }

    #[test]
    fn acquire_prompts_camera_then_microphone_once() {
        let prompter = Arc::new(ScriptedPrompter::new(vec![
            Ok(PromptVerdict::Granted),
            Ok(PromptVerdict::Granted),
        ]));
        let mut gateway = PermissionGateway::new(prompter.clone());

        let first = gateway.acquire().expect("first acquire should resolve");
        let second = gateway.acquire().expect("second acquire should reuse cache");

        assert_eq!(first, second);
        assert_eq!(prompter.prompt_count(), 2);
        assert!(first.capture_allowed());
    }

    #[test]
    fn acquire_caches_denial_without_reprompting() {
        let prompter = Arc::new(ScriptedPrompter::new(vec![
            Ok(PromptVerdict::Denied),
            Ok(PromptVerdict::Granted),
        ]));
        let mut gateway = PermissionGateway::new(prompter.clone());

        let grants = gateway.acquire().expect("acquire should resolve");
        let again = gateway.acquire().expect("cached acquire should succeed");

        assert!(matches!(grants.camera, PermissionState::Denied));
        assert!(!grants.capture_allowed());
        assert_eq!(again, grants);
        assert_eq!(prompter.prompt_count(), 2);
    }

    #[test]
    fn prompt_failure_leaves_gateway_unresolved() {
        let prompter = Arc::new(ScriptedPrompter::new(vec![
            Err(PermissionError::PromptFailed("prompt surface gone".to_string())),
            Ok(PromptVerdict::Granted),
            Ok(PromptVerdict::Granted),
        ]));
        let mut gateway = PermissionGateway::new(prompter.clone());

        let failed = gateway.acquire();
        assert!(failed.is_err());
        assert!(!gateway.is_resolved());

        let grants = gateway.acquire().expect("retry after failure should prompt again");
        assert!(grants.capture_allowed());
        assert_eq!(prompter.prompt_count(), 3);
    }
}

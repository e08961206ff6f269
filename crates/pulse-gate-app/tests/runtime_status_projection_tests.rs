//! Integration tests for workflow-to-screen projection.

mod common;

use std::sync::Arc;

use pulse_gate_ui::StageStatus;

#[test]
fn runtime_status_projection_tests_baseline_before_permissions() {
    let transport = Arc::new(common::ScriptedTransport::new());
    let workflow = common::workflow_with(
        Arc::new(common::FixedPrompter::granting()),
        Arc::new(common::ScriptedCamera::new()),
        transport,
    );

    let screen = workflow.project();
    assert!(!screen.show_capture_controls);
    assert!(!screen.recording_active);
    assert!(screen.clip_label.is_none());
    assert!(screen.still_label.is_none());
    assert_eq!(screen.heart_rate_display, "0");
    assert_eq!(screen.derivation, StageStatus::Idle);
    assert_eq!(screen.submission, StageStatus::Idle);
    assert!(screen.status_line.is_none());
    assert!(screen.submit_enabled());
    assert!(!screen.derive_enabled());
}

#[test]
fn runtime_status_projection_tests_recording_disables_derivation() {
    let transport = Arc::new(common::ScriptedTransport::new());
    let mut workflow = common::granted_workflow(transport);

    workflow
        .start_recording(1_000)
        .expect("start should be admitted");

    let screen = workflow.project();
    assert!(screen.recording_active);
    assert!(screen.clip_label.is_none());
    assert!(!screen.derive_enabled());
}

#[test]
fn runtime_status_projection_tests_failed_stage_stays_interactive() {
    let transport = Arc::new(common::ScriptedTransport::new());
    let mut workflow = common::recorded_workflow(transport);

    let _ = workflow
        .derive_heart_rate()
        .expect_err("empty response should fail derivation");

    let screen = workflow.project();
    assert_eq!(screen.derivation, StageStatus::Degraded);
    // Degraded is a resting state; the user may immediately retry.
    assert!(screen.submit_enabled());
    assert!(screen.derive_enabled());
}

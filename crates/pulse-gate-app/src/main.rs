#![warn(missing_docs)]
//! # pulse-gate-app binary
//!
//! Console demo driver for the pulse-gate capture-and-submit workflow. Device
//! and network collaborators are demo stand-ins wired here; the workflow crate
//! stays host-agnostic.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use pulse_gate_app::{
    AppError, HEART_RATE_PATH, LoginWorkflow, app_version, base_url_from_env,
    capture_enabled_from_env,
};
use pulse_gate_capture::{StillCaptureOptions, SyntheticCameraBackend};
use pulse_gate_permissions::{PermissionError, PermissionKind, PermissionPrompter, PromptVerdict};
use pulse_gate_ui::BANK_NAME;
use pulse_gate_upload::{
    InMemoryMediaSource, TransportResponse, UploadClient, UploadEnvelope, UploadError,
    UploadTransport,
};
use tracing_subscriber::EnvFilter;

/// Demo prompter that grants every permission request.
#[derive(Default)]
struct GrantingPrompter;

impl PermissionPrompter for GrantingPrompter {
    fn request(&self, _kind: PermissionKind) -> Result<PromptVerdict, PermissionError> {
        Ok(PromptVerdict::Granted)
    }
}

/// Demo transport that answers derivation requests with a fixed reading.
#[derive(Default)]
struct DemoBackendTransport;

impl UploadTransport for DemoBackendTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        let body = if envelope.url.ends_with(HEART_RATE_PATH) {
            r#"{"heart_rate": 72}"#.to_string()
        } else {
            "{}".to_string()
        };

        Ok(TransportResponse { status: 200, body })
    }
}

/// CLI entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url = match base_url_from_env() {
        Ok(base_url) => base_url,
        Err(error) => {
            eprintln!("pulse-gate-app startup failed: {error}");
            std::process::exit(1);
        }
    };

    println!("pulse-gate-app {}", app_version());
    println!(
        "capture_enabled={} (PULSE_GATE_CAPTURE_ENABLED)",
        capture_enabled_from_env()
    );

    if let Err(error) = run_demo(&base_url) {
        eprintln!("pulse-gate-app demo failed: {error}");
        std::process::exit(1);
    }
}

/// Runs one scripted capture-and-submit pass against demo collaborators.
fn run_demo(base_url: &str) -> Result<(), AppError> {
    let source = Arc::new(
        InMemoryMediaSource::new()
            .with_asset("file:///captures/clip-1.mp4", b"demo clip".to_vec())
            .with_asset("file:///captures/still-1.jpg", b"demo still".to_vec()),
    );
    let upload = UploadClient::new(base_url, Arc::new(DemoBackendTransport), source)?;

    let mut workflow = LoginWorkflow::new(
        Arc::new(GrantingPrompter),
        Arc::new(SyntheticCameraBackend::new()),
        upload,
    );

    let grants = workflow.acquire_permissions()?;
    println!("camera={:?} microphone={:?}", grants.camera, grants.microphone);

    workflow.start_recording(unix_timestamp_millis())?;
    workflow.stop_recording()?;
    let reading = workflow.derive_heart_rate()?;
    println!("derived heart rate: {} bpm", reading.form_value());

    workflow.capture_still(&StillCaptureOptions::new(true, (4, 3), 1.0)?)?;
    workflow.login("tanjiro")?;

    let screen = workflow.project();
    println!("heart rate field: {}", screen.heart_rate_display);

    if let Some(dashboard) = workflow.dashboard() {
        println!("{BANK_NAME}");
        println!("{}", dashboard.greeting);
        println!("total balance: {}", dashboard.total_balance);
        println!("savings balance: {}", dashboard.savings_balance);
        for transaction in &dashboard.transactions {
            println!("{} {}", transaction.summary(), transaction.amount);
        }
    }

    Ok(())
}

fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}

#![warn(missing_docs)]
//! # pulse-gate-ui
//!
//! ## Purpose
//! Defines the screen-facing state projections for `pulse-gate`.
//!
//! ## Responsibilities
//! - Represent login screen state: permission blocks, capture controls,
//!   per-stage statuses, and the status line.
//! - Render the heart-rate display value.
//! - Build the static dashboard snapshot shown after login.
//!
//! ## Data flow
//! The workflow controller projects its state into [`LoginScreenState`] after
//! every action; a successful login feeds [`dashboard_snapshot`].
//!
//! ## Ownership and lifetimes
//! Projections own all their strings so render layers never borrow workflow
//! state across actions.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Impossible
//! control combinations are prevented by guard methods.
//!
//! ## Security and privacy notes
//! Projections carry media labels (kind plus file name), never locations or
//! bytes, and no credential material.

use pulse_gate_vitals_contract::HeartRateReading;

/// Greeting fallback when no username reached the dashboard.
pub const FALLBACK_USERNAME: &str = "User";

/// Bank title rendered on the dashboard.
pub const BANK_NAME: &str = "Muzan Bank";

/// Generic stage status used for derivation and submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage has not started.
    Idle,
    /// Stage is currently running.
    Running,
    /// Stage completed successfully.
    Healthy,
    /// Stage encountered a non-fatal error.
    Degraded,
}

/// Login screen projection built by the workflow controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginScreenState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Blocking message shown when camera consent was denied.
    pub blocked_message: Option<String>,
    /// Whether capture controls may be rendered at all.
    pub show_capture_controls: bool,
    /// Whether a clip is being recorded right now.
    pub recording_active: bool,
    /// Log-safe label of the held clip, when one was finalized.
    pub clip_label: Option<String>,
    /// Log-safe label of the captured still, when one is attached.
    pub still_label: Option<String>,
    /// Heart-rate field text; `"0"` until a reading is derived.
    pub heart_rate_display: String,
    /// Heart-rate derivation stage status.
    pub derivation: StageStatus,
    /// Login submission stage status.
    pub submission: StageStatus,
    /// Last failure or progress message, if any.
    pub status_line: Option<String>,
}

impl LoginScreenState {
    /// Creates the pre-permission baseline projection.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            blocked_message: None,
            show_capture_controls: false,
            recording_active: false,
            clip_label: None,
            still_label: None,
            heart_rate_display: "0".to_string(),
            derivation: StageStatus::Idle,
            submission: StageStatus::Idle,
            status_line: None,
        }
    }

    /// Returns `true` while no stage is running.
    pub fn submit_enabled(&self) -> bool {
        self.derivation != StageStatus::Running && self.submission != StageStatus::Running
    }

    /// Returns `true` when the derive action may be offered.
    pub fn derive_enabled(&self) -> bool {
        self.clip_label.is_some() && self.submit_enabled()
    }
}

/// Renders the heart-rate field text for a possibly-absent reading.
pub fn heart_rate_display(reading: Option<&HeartRateReading>) -> String {
    match reading {
        Some(reading) => reading.form_value().to_string(),
        None => "0".to_string(),
    }
}

/// One line of the dashboard's recent-transactions card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Stable row identifier.
    pub id: u32,
    /// Transaction type label.
    pub label: String,
    /// Formatted amount.
    pub amount: String,
    /// ISO date of the transaction.
    pub date: String,
}

impl TransactionRecord {
    /// Returns the rendered row summary, date first.
    pub fn summary(&self) -> String {
        format!("{} - {}", self.date, self.label)
    }
}

/// Static dashboard projection built after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Personal greeting line.
    pub greeting: String,
    /// Formatted total balance.
    pub total_balance: String,
    /// Formatted savings balance.
    pub savings_balance: String,
    /// Recent transactions, newest first.
    pub transactions: Vec<TransactionRecord>,
}

/// Builds the dashboard snapshot for a username.
///
/// Balances and transactions are fixed demonstration values; only the
/// greeting varies. A blank or absent username falls back to
/// [`FALLBACK_USERNAME`].
pub fn dashboard_snapshot(username: Option<&str>) -> DashboardSnapshot {
    let raw = username
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_USERNAME);

    DashboardSnapshot {
        greeting: format!("Hey {}", capitalize_first(raw)),
        total_balance: "$15,734,907.45".to_string(),
        savings_balance: "$10,450,654.29".to_string(),
        transactions: vec![
            TransactionRecord {
                id: 1,
                label: "Deposit".to_string(),
                amount: "$5,000".to_string(),
                date: "2023-05-20".to_string(),
            },
            TransactionRecord {
                id: 2,
                label: "Withdrawal".to_string(),
                amount: "$2,500".to_string(),
                date: "2023-05-19".to_string(),
            },
            TransactionRecord {
                id: 3,
                label: "Transfer".to_string(),
                amount: "$1,200".to_string(),
                date: "2023-05-18".to_string(),
            },
        ],
    }
}

fn capitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

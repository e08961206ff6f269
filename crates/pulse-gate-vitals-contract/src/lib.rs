#![warn(missing_docs)]
//! # pulse-gate-vitals-contract
//!
//! ## Purpose
//! Defines the heart-rate derivation response schema and client-side parsing
//! helpers.
//!
//! ## Responsibilities
//! - Parse `/get_heart_rate` response payloads.
//! - Validate the derived reading before it reaches workflow state.
//! - Provide the integer form value submitted with login requests.
//!
//! ## Data flow
//! Raw JSON response -> [`parse_heart_rate_response`] -> validated
//! [`HeartRateReading`] -> workflow state and login form field.
//!
//! ## Ownership and lifetimes
//! Readings are small owned values copied freely between workflow and
//! projection layers.
//!
//! ## Error model
//! Invalid JSON returns [`VitalsContractError::Decode`]; a missing or
//! unusable `heart_rate` field returns
//! [`VitalsContractError::MetricUnavailable`].
//!
//! ## Security and privacy notes
//! Readings are health-adjacent data; callers log the numeric value only at
//! the workflow boundary and never persist it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON field carrying the derived reading.
pub const HEART_RATE_FIELD: &str = "heart_rate";

#[derive(Debug, Deserialize)]
struct HeartRateResponse {
    #[serde(default)]
    heart_rate: Option<serde_json::Value>,
}

/// Validated heart-rate reading in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateReading {
    /// Beats per minute as reported by the derivation backend.
    pub bpm: f64,
}

impl HeartRateReading {
    /// Creates a validated reading.
    ///
    /// The backend's value is taken as reported; only non-finite numbers
    /// are rejected.
    ///
    /// # Errors
    /// Returns [`VitalsContractError::MetricUnavailable`] when `bpm` is not
    /// finite.
    pub fn new(bpm: f64) -> Result<Self, VitalsContractError> {
        if !bpm.is_finite() {
            return Err(VitalsContractError::MetricUnavailable(
                "heart_rate is not a finite number".to_string(),
            ));
        }
        Ok(Self { bpm })
    }

    /// Returns the integer-truncated value submitted in login forms.
    pub fn form_value(&self) -> i64 {
        self.bpm.trunc() as i64
    }
}

/// Parses raw JSON into a validated heart-rate reading.
///
/// # Errors
/// Returns [`VitalsContractError::Decode`] for invalid JSON.
/// Returns [`VitalsContractError::MetricUnavailable`] when the `heart_rate`
/// field is absent, non-numeric, or non-finite.
pub fn parse_heart_rate_response(raw: &str) -> Result<HeartRateReading, VitalsContractError> {
    let parsed: HeartRateResponse =
        serde_json::from_str(raw).map_err(VitalsContractError::Decode)?;

    let value = parsed.heart_rate.ok_or_else(|| {
        VitalsContractError::MetricUnavailable(format!("{HEART_RATE_FIELD} field is absent"))
    })?;

    let bpm = value.as_f64().ok_or_else(|| {
        VitalsContractError::MetricUnavailable(format!(
            "{HEART_RATE_FIELD} is not numeric: {value}"
        ))
    })?;

    HeartRateReading::new(bpm)
}

/// Heart-rate contract errors.
#[derive(Debug, Error)]
pub enum VitalsContractError {
    /// JSON decode failure.
    #[error("heart-rate decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response carried no usable reading.
    #[error("heart rate unavailable: {0}")]
    MetricUnavailable(String),
}

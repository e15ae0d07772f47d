//! The stable parent/child JSON contract for isolated execution.
//!
//! The parent writes a [`LaunchPayload`] to a scratch file and passes its
//! path to the launcher child; the child prints exactly one [`LaunchReport`]
//! line to stdout and exits non-zero on internal failure. This shape is a
//! stable internal protocol: isolated execution can be reused independently
//! as long as both halves agree on it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fabrica_contract::{ExecutionContext, JsonMap, Outcome, OutcomeStatus};

/// Version of the launcher protocol. Bump on any incompatible change to
/// [`LaunchPayload`] or [`LaunchReport`].
pub const LAUNCH_PROTOCOL_VERSION: u32 = 1;

/// Input handed to the launcher child.
///
/// The execution context is serialized alongside the input instead of being
/// dropped at the process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPayload {
    /// Raw module input.
    pub input: JsonMap,
    /// Caller metadata, passed through verbatim.
    #[serde(default)]
    pub context: Option<ExecutionContext>,
}

/// The single JSON line the launcher child prints to stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// True only when the handler reported a success status.
    pub success: bool,
    /// Handler payload, or null on failure.
    #[serde(default)]
    pub data: Value,
    /// Handler or failure message.
    #[serde(default)]
    pub message: String,
    /// Wall-clock duration of the handler run, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    /// Failure detail, present only on the internal-failure line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl LaunchReport {
    /// Builds the report for a handler that ran to completion.
    ///
    /// A warning status flattens to `success: false`, matching the original
    /// protocol, and the message still carries the handler's wording.
    pub fn from_outcome(outcome: Outcome, elapsed_secs: f64) -> Self {
        Self {
            success: outcome.status == OutcomeStatus::Success,
            data: outcome.data,
            message: outcome.message,
            execution_time: Some(outcome.execution_time.unwrap_or(elapsed_secs)),
            traceback: None,
        }
    }

    /// Builds the internal-failure report.
    pub fn failure(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: message.into(),
            execution_time: None,
            traceback: Some(traceback.into()),
        }
    }
}

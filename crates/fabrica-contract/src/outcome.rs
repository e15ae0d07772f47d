//! Normalized execution results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overall status of one handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The handler completed and produced its payload.
    Success,
    /// The handler or the engine failed.
    Error,
    /// The handler completed with reservations.
    Warning,
}

impl OutcomeStatus {
    /// Returns the wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error => "error",
            OutcomeStatus::Warning => "warning",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable failure classification carried by error outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Requested module id is not registered.
    ModuleNotFound,
    /// Module resolved but its owning plugin unit is gone. This indicates an
    /// internal consistency fault, not a caller mistake.
    PluginNotFound,
    /// Isolated child exited cleanly but its stdout was not the expected
    /// single-line JSON report.
    OutputParseError,
    /// Isolated child exited non-zero.
    ExecutionError,
    /// Isolated child exceeded the configured wall-clock timeout.
    TimeoutError,
    /// Engine-side fault (scratch file write, spawn failure, and the like).
    UnknownError,
    /// Handler-internal business-logic failure. Raised by handler
    /// implementations themselves, never by the engine.
    ProcessingError,
}

impl ErrorCode {
    /// Returns the wire string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ModuleNotFound => "MODULE_NOT_FOUND",
            ErrorCode::PluginNotFound => "PLUGIN_NOT_FOUND",
            ErrorCode::OutputParseError => "OUTPUT_PARSE_ERROR",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one handler invocation.
///
/// A non-success status usually means `data` is null, but this is not
/// enforced; callers must not assume absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Overall status.
    pub status: OutcomeStatus,
    /// Arbitrary structured payload.
    #[serde(default)]
    pub data: Value,
    /// Human-readable summary.
    #[serde(default)]
    pub message: String,
    /// Failure classification, present on engine-produced errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Wall-clock duration of the handler run, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
}

impl Outcome {
    /// A success outcome carrying a payload.
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            data,
            message: message.into(),
            error_code: None,
            execution_time: None,
        }
    }

    /// An error outcome with no classification code.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            data: Value::Null,
            message: message.into(),
            error_code: None,
            execution_time: None,
        }
    }

    /// An error outcome with a classification code.
    pub fn error_with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code),
            ..Self::error(message)
        }
    }

    /// A warning outcome carrying a payload.
    pub fn warning(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Warning,
            data,
            message: message.into(),
            error_code: None,
            execution_time: None,
        }
    }

    /// Returns true if the status is success.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Sets the execution time, returning self.
    pub fn with_execution_time(mut self, seconds: f64) -> Self {
        self.execution_time = Some(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::Warning).unwrap(),
            "\"warning\""
        );
    }

    #[test]
    fn test_error_code_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ModuleNotFound).unwrap(),
            "\"MODULE_NOT_FOUND\""
        );
        assert_eq!(ErrorCode::TimeoutError.to_string(), "TIMEOUT_ERROR");
        let parsed: ErrorCode = serde_json::from_str("\"OUTPUT_PARSE_ERROR\"").unwrap();
        assert_eq!(parsed, ErrorCode::OutputParseError);
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = Outcome::success(json!({"x": 1}), "done");
        assert!(ok.is_success());
        assert_eq!(ok.data, json!({"x": 1}));
        assert_eq!(ok.error_code, None);

        let err = Outcome::error_with_code(ErrorCode::ProcessingError, "bad input");
        assert_eq!(err.status, OutcomeStatus::Error);
        assert_eq!(err.data, Value::Null);
        assert_eq!(err.error_code, Some(ErrorCode::ProcessingError));
    }

    #[test]
    fn test_outcome_serialization_omits_absent_fields() {
        let ok = Outcome::success(json!([1, 2]), "ok");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            json!({"status": "success", "data": [1, 2], "message": "ok"})
        );

        let err = Outcome::error_with_code(ErrorCode::TimeoutError, "too slow")
            .with_execution_time(30.0);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error_code"], json!("TIMEOUT_ERROR"));
        assert_eq!(json["execution_time"], json!(30.0));
    }
}

//! Caller metadata passed through to handlers.

use serde::{Deserialize, Serialize};

/// Optional caller metadata for one execution.
///
/// The engine never reads or mutates this; it is carried to the handler
/// verbatim, including across the isolated-execution process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Identity of the requesting user, if known.
    pub user_id: Option<String>,
    /// Session the request belongs to.
    pub session_id: Option<String>,
    /// Correlation id for the request.
    pub request_id: Option<String>,
    /// Remote address of the caller.
    pub client_ip: Option<String>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.session_id.is_none()
            && self.request_id.is_none()
            && self.client_ip.is_none()
    }
}

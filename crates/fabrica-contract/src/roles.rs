//! The two capability roles a plugin unit implements.

use thiserror::Error;

use crate::context::ExecutionContext;
use crate::module::Module;
use crate::outcome::Outcome;

/// JSON object input handed to a handler.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Constructor a module carries for building its handler on demand.
///
/// Both execution paths go through this: the direct path calls it in the host
/// process, the isolated path calls it inside the launcher child.
pub type HandlerCtor = fn() -> Box<dyn Handler>;

/// Error returned by a registrar that fails to produce its module.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RegisterError(String);

impl RegisterError {
    /// Creates a registration error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Role that produces a module descriptor.
///
/// `register` is called exactly once per discovered registrar during a scan
/// and must be side-effect-free beyond constructing the descriptor. A failure
/// is logged by the registry and skipped; it never aborts the scan.
pub trait Registrar {
    /// Stable registrar name, used to derive the module id as
    /// `{unit_name}_{registrar_name}`.
    fn name(&self) -> &'static str;

    /// Builds the module this registrar contributes.
    fn register(&self) -> Result<Module, RegisterError>;
}

/// Role that executes a module's business logic.
///
/// Handlers report business failures through the returned [`Outcome`]
/// (conventionally with [`crate::ErrorCode::ProcessingError`]) rather than by
/// panicking. In the isolated path a panic is still contained by the launcher
/// and converted into an error outcome; in the direct path it propagates to
/// the caller, who owns the failure boundary.
pub trait Handler: Send {
    /// Runs the business logic for one request.
    fn handle(&self, input: &JsonMap, context: Option<&ExecutionContext>) -> Outcome;
}

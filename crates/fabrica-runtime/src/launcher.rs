//! Child-side entrypoint for isolated execution.
//!
//! The host binary exposes this as a hidden subcommand. Given a unit path, a
//! handler name, and a payload file, it re-resolves the unit through its own
//! catalog, runs the handler with panics contained, and prints exactly one
//! protocol line to stdout. Internal failures additionally land on stderr
//! and exit non-zero, so the parent's decode step sees them either way.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use fabrica_contract::Outcome;

use crate::catalog::{UnitCatalog, UnitManifest};
use crate::error::RuntimeError;
use crate::protocol::LaunchReport;

/// Arguments of one launch invocation.
#[derive(Debug, Clone)]
pub struct LaunchArgs {
    /// Plugin unit directory.
    pub unit: PathBuf,
    /// Handler name to resolve within the unit.
    pub handler: String,
    /// Path of the payload file written by the parent.
    pub payload: PathBuf,
}

/// Runs one isolated execution and returns the process exit code.
///
/// Prints the protocol line in both cases; a non-zero return means an
/// internal failure (unknown handler, unreadable payload, handler panic),
/// not a handler-reported business error.
pub fn run(catalog: &UnitCatalog, args: &LaunchArgs) -> i32 {
    let started = Instant::now();
    match execute_handler(catalog, args) {
        Ok(outcome) => {
            let report = LaunchReport::from_outcome(outcome, started.elapsed().as_secs_f64());
            emit(&report, 0)
        }
        Err(err) => {
            eprintln!("{err}");
            let report = LaunchReport::failure(err.to_string(), format!("{err:?}"));
            emit(&report, 1)
        }
    }
}

fn emit(report: &LaunchReport, code: i32) -> i32 {
    match serde_json::to_string(report) {
        Ok(line) => {
            println!("{line}");
            code
        }
        Err(e) => {
            eprintln!("failed to encode launch report: {e}");
            1
        }
    }
}

/// Resolves the handler and runs it with panics contained.
pub(crate) fn execute_handler(
    catalog: &UnitCatalog,
    args: &LaunchArgs,
) -> Result<Outcome, RuntimeError> {
    let manifest = UnitManifest::load(&args.unit)?;
    let unit_name = manifest.name.clone();

    let entry = catalog
        .get(&manifest.entry)
        .ok_or_else(|| RuntimeError::UnknownEntry {
            entry: manifest.entry.clone(),
            unit: unit_name.clone(),
        })?;

    let module = entry()
        .into_iter()
        .filter_map(|registrar| registrar.register().ok())
        .find(|module| module.handler_name == args.handler)
        .ok_or_else(|| RuntimeError::HandlerNotFound {
            handler: args.handler.clone(),
            unit: unit_name,
        })?;

    let payload_text =
        std::fs::read_to_string(&args.payload).map_err(|source| RuntimeError::PayloadRead {
            path: args.payload.clone(),
            source,
        })?;
    let payload: crate::protocol::LaunchPayload =
        serde_json::from_str(&payload_text).map_err(RuntimeError::PayloadParse)?;

    let handler = (module.handler)();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        handler.handle(&payload.input, payload.context.as_ref())
    }));

    result.map_err(|cause| RuntimeError::HandlerPanicked {
        message: panic_message(cause.as_ref()),
    })
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Fabrica Plugin Runtime
//!
//! This crate hosts the two halves of the Fabrica core: the **registry**,
//! which discovers plugin units on disk and indexes the modules they
//! register, and the **isolation engine**, which executes a module's handler
//! either in-process or inside a bounded child process.
//!
//! # Discovery
//!
//! A plugin unit is a directory containing a `plugin.json` manifest whose
//! `entry` field names a registration entry point in the host's
//! [`UnitCatalog`]. Discovery enumerates the immediate subdirectories of a
//! root, loads each candidate, invokes its registrars, and indexes every
//! module under the id `{unit_name}_{registrar_name}`. A failure in one
//! unit is logged and never prevents the remaining units from loading.
//!
//! # Isolated execution
//!
//! The isolated path re-invokes a fixed launcher program (normally the host
//! binary's hidden `launch` subcommand) with the unit path, the handler
//! name, and a payload file as explicit arguments. The child prints exactly
//! one JSON line shaped by [`protocol::LaunchReport`]; the engine enforces a
//! wall-clock timeout, kills overruns, and decodes every failure mode into a
//! normalized [`fabrica_contract::Outcome`]. No fault crosses the public
//! execution boundary as a panic or error.
//!
//! # Modules
//!
//! - [`catalog`]: Explicit entry-point table and the on-disk unit manifest
//! - [`unit`]: Loaded plugin unit records
//! - [`registry`]: Discovery, lookup, and the execution front door
//! - [`isolator`]: Subprocess runner with timeout enforcement
//! - [`launcher`]: Child-side entrypoint for isolated execution
//! - [`protocol`]: The stable parent/child JSON contract
//! - [`error`]: Runtime error types

pub mod catalog;
pub mod error;
pub mod isolator;
pub mod launcher;
pub mod protocol;
pub mod registry;
pub mod unit;

pub use catalog::{UnitCatalog, UnitEntryFn, UnitManifest, UNIT_MANIFEST_FILE};
pub use error::RuntimeError;
pub use isolator::{Isolator, IsolatorConfig, DEFAULT_TIMEOUT_SECS};
pub use launcher::LaunchArgs;
pub use protocol::{LaunchPayload, LaunchReport, LAUNCH_PROTOCOL_VERSION};
pub use registry::{ExecutionMode, Registry};
pub use unit::PluginUnit;

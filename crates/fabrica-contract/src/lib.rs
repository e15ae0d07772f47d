//! Fabrica Capability Contract Library
//!
//! This crate provides the types shared between the Fabrica host and its
//! plugin units: the form schema a module declares, the two capability roles
//! (`Registrar` and `Handler`), and the normalized execution outcome.
//!
//! # Overview
//!
//! A plugin unit contributes one or more **modules**. Each module is produced
//! by a [`Registrar`] and describes a business capability: the form fields it
//! accepts ([`Widget`]s with validation rules) and the [`Handler`] that
//! executes it. Callers only ever see the serialization-ready
//! [`ModuleDescriptor`] projection and the normalized [`Outcome`] of a run.
//!
//! # Example
//!
//! ```
//! use fabrica_contract::{Module, Widget, WidgetType, ValidationRule};
//! use fabrica_contract::{Handler, JsonMap, Outcome, ExecutionContext};
//!
//! struct EchoHandler;
//!
//! impl Handler for EchoHandler {
//!     fn handle(&self, input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
//!         Outcome::success(input.clone().into(), "echoed input")
//!     }
//! }
//!
//! let module = Module::builder("EchoHandler", || Box::new(EchoHandler))
//!     .group_name("demo")
//!     .module_name("Echo")
//!     .description("Returns its input unchanged")
//!     .widget(
//!         Widget::new("text", "Text", WidgetType::Input)
//!             .placeholder("anything")
//!             .validation(ValidationRule {
//!                 required: true,
//!                 ..ValidationRule::default()
//!             }),
//!     )
//!     .build();
//!
//! assert_eq!(module.widgets.len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`widget`]: Form schema types (widget, select option, validation rule)
//! - [`module`]: Module descriptor types and builder
//! - [`context`]: Caller metadata passed through to handlers
//! - [`outcome`]: Normalized execution result, status, and error codes
//! - [`roles`]: The `Registrar` and `Handler` traits
//! - [`validation`]: Module-level consistency checks

pub mod context;
pub mod module;
pub mod outcome;
pub mod roles;
pub mod validation;
pub mod widget;

pub use context::ExecutionContext;
pub use module::{Module, ModuleBuilder, ModuleDescriptor};
pub use outcome::{ErrorCode, Outcome, OutcomeStatus};
pub use roles::{Handler, HandlerCtor, JsonMap, RegisterError, Registrar};
pub use validation::{validate_module, ModuleValidationError};
pub use widget::{SelectOption, ValidationRule, Widget, WidgetType};

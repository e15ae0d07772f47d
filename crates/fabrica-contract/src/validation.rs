//! Module-level consistency checks.
//!
//! The registry runs these at registration time. An invalid module is logged
//! and skipped the same way a failing registrar is; it never aborts a scan.

use thiserror::Error;

use crate::module::Module;
use crate::widget::WidgetType;

/// A single consistency violation found in a module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleValidationError {
    /// The handler name is empty, so the module cannot be re-resolved inside
    /// the launcher child.
    #[error("handler name is empty")]
    EmptyHandlerName,

    /// A widget has an empty field key.
    #[error("widget at index {index} has an empty name")]
    EmptyWidgetName { index: usize },

    /// Two widgets share a field key.
    #[error("duplicate widget name: {name}")]
    DuplicateWidgetName { name: String },

    /// A select widget declares no options.
    #[error("select widget '{name}' has no options")]
    SelectWithoutOptions { name: String },

    /// A validation pattern does not compile as a regular expression.
    #[error("widget '{name}' has an invalid pattern: {reason}")]
    InvalidPattern { name: String, reason: String },

    /// min_length exceeds max_length.
    #[error("widget '{name}' has min_length {min} > max_length {max}")]
    LengthRangeInverted { name: String, min: u32, max: u32 },

    /// min_value exceeds max_value.
    #[error("widget '{name}' has min_value {min} > max_value {max}")]
    ValueRangeInverted { name: String, min: f64, max: f64 },

    /// Only one half of the action_space/action_name pair is set.
    #[error("action_space and action_name must be set together or not at all")]
    HalfActionPair,
}

/// Validates a module, collecting every violation rather than stopping at
/// the first.
pub fn validate_module(module: &Module) -> Result<(), Vec<ModuleValidationError>> {
    let mut errors = Vec::new();

    if module.handler_name.is_empty() {
        errors.push(ModuleValidationError::EmptyHandlerName);
    }

    if module.action_space.is_empty() != module.action_name.is_empty() {
        errors.push(ModuleValidationError::HalfActionPair);
    }

    let mut seen = std::collections::HashSet::new();
    for (index, widget) in module.widgets.iter().enumerate() {
        if widget.name.is_empty() {
            errors.push(ModuleValidationError::EmptyWidgetName { index });
            continue;
        }
        if !seen.insert(widget.name.as_str()) {
            errors.push(ModuleValidationError::DuplicateWidgetName {
                name: widget.name.clone(),
            });
        }

        if widget.widget_type == WidgetType::Select && widget.options.is_empty() {
            errors.push(ModuleValidationError::SelectWithoutOptions {
                name: widget.name.clone(),
            });
        }

        let rule = &widget.validation;
        if let Some(pattern) = &rule.pattern {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(ModuleValidationError::InvalidPattern {
                    name: widget.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min > max {
                errors.push(ModuleValidationError::LengthRangeInverted {
                    name: widget.name.clone(),
                    min,
                    max,
                });
            }
        }
        if let (Some(min), Some(max)) = (rule.min_value, rule.max_value) {
            if min > max {
                errors.push(ModuleValidationError::ValueRangeInverted {
                    name: widget.name.clone(),
                    min,
                    max,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::module::Module;
    use crate::outcome::Outcome;
    use crate::roles::{Handler, JsonMap};
    use crate::widget::{SelectOption, ValidationRule, Widget};

    struct NoopHandler;

    impl Handler for NoopHandler {
        fn handle(&self, _input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
            Outcome::success(serde_json::Value::Null, "noop")
        }
    }

    fn base_module() -> crate::module::ModuleBuilder {
        Module::builder("NoopHandler", || Box::new(NoopHandler))
    }

    #[test]
    fn test_valid_module_passes() {
        let module = base_module()
            .action("demo", "run")
            .widget(
                Widget::new("kind", "Kind", WidgetType::Select)
                    .option(SelectOption::new("A", "a")),
            )
            .widget(Widget::new("count", "Count", WidgetType::Number))
            .build();
        assert!(validate_module(&module).is_ok());
    }

    #[test]
    fn test_duplicate_widget_names_rejected() {
        let module = base_module()
            .widget(Widget::new("x", "X1", WidgetType::Input))
            .widget(Widget::new("x", "X2", WidgetType::Input))
            .build();
        let errors = validate_module(&module).unwrap_err();
        assert!(errors.contains(&ModuleValidationError::DuplicateWidgetName {
            name: "x".to_string()
        }));
    }

    #[test]
    fn test_half_action_pair_rejected() {
        let mut module = base_module().build();
        module.action_space = "user".to_string();
        let errors = validate_module(&module).unwrap_err();
        assert_eq!(errors, vec![ModuleValidationError::HalfActionPair]);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let module = base_module()
            .widget(
                Widget::new("email", "Email", WidgetType::Input).validation(ValidationRule {
                    pattern: Some("([unclosed".to_string()),
                    ..ValidationRule::default()
                }),
            )
            .build();
        let errors = validate_module(&module).unwrap_err();
        assert!(matches!(
            errors[0],
            ModuleValidationError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let module = base_module()
            .widget(
                Widget::new("name", "Name", WidgetType::Input).validation(ValidationRule {
                    min_length: Some(10),
                    max_length: Some(2),
                    ..ValidationRule::default()
                }),
            )
            .widget(
                Widget::new("age", "Age", WidgetType::Number).validation(ValidationRule {
                    min_value: Some(150.0),
                    max_value: Some(0.0),
                    ..ValidationRule::default()
                }),
            )
            .build();
        let errors = validate_module(&module).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_handler_name_rejected() {
        let module = Module::builder("", || Box::new(NoopHandler)).build();
        let errors = validate_module(&module).unwrap_err();
        assert_eq!(errors, vec![ModuleValidationError::EmptyHandlerName]);
    }
}

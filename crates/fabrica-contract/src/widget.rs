//! Form schema types: widgets, select options, and validation rules.

use serde::{Deserialize, Serialize};

/// Kind of form control a widget renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    /// Single-line text input.
    Input,
    /// Dropdown selection from a fixed option list.
    Select,
    /// Multi-line text input.
    Textarea,
    /// Numeric input.
    Number,
    /// Date picker.
    Date,
    /// Boolean checkbox.
    Checkbox,
    /// Static descriptive text, no input.
    Paragraph,
}

impl WidgetType {
    /// Returns the wire string for this widget type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Input => "input",
            WidgetType::Select => "select",
            WidgetType::Textarea => "textarea",
            WidgetType::Number => "number",
            WidgetType::Date => "date",
            WidgetType::Checkbox => "checkbox",
            WidgetType::Paragraph => "paragraph",
        }
    }
}

impl std::fmt::Display for WidgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a select widget's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the user.
    pub display_name: String,
    /// Value submitted when this option is chosen.
    pub value: String,
    /// Whether the option is rendered but not selectable.
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    /// Creates an enabled option.
    pub fn new(display_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            value: value.into(),
            disabled: false,
        }
    }
}

/// Declarative constraints on a widget's value.
///
/// All fields absent means the value is unconstrained. `pattern` must be a
/// valid regular expression; this is checked by [`crate::validate_module`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Whether a value must be provided.
    #[serde(default)]
    pub required: bool,
    /// Minimum string length.
    pub min_length: Option<u32>,
    /// Maximum string length.
    pub max_length: Option<u32>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
    /// Minimum numeric value.
    pub min_value: Option<f64>,
    /// Maximum numeric value.
    pub max_value: Option<f64>,
}

impl ValidationRule {
    /// A rule that only requires a value to be present.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Returns true if this rule imposes no constraint at all.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

/// One declared form field of a module.
///
/// `name` is the JSON key the handler receives the value under; it must be
/// unique within a module's widget list. The widget list order is display
/// order and is preserved end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Unique field key within the module.
    pub name: String,
    /// Label shown next to the control.
    pub label: String,
    /// Control kind.
    pub widget_type: WidgetType,
    /// Placeholder text for empty inputs.
    #[serde(default)]
    pub placeholder: String,
    /// Pre-filled value.
    #[serde(default)]
    pub default_value: String,
    /// Help text shown under the control.
    #[serde(default)]
    pub help_text: String,
    /// Option list for select widgets, in display order.
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Value constraints.
    #[serde(default)]
    pub validation: ValidationRule,
}

impl Widget {
    /// Creates a widget with the given key, label, and control kind.
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget_type: WidgetType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            widget_type,
            placeholder: String::new(),
            default_value: String::new(),
            help_text: String::new(),
            options: Vec::new(),
            validation: ValidationRule::default(),
        }
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the pre-filled value.
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Appends one select option.
    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    /// Replaces the option list.
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Sets the validation rule.
    pub fn validation(mut self, validation: ValidationRule) -> Self {
        self.validation = validation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_widget_type_wire_strings() {
        assert_eq!(WidgetType::Input.as_str(), "input");
        assert_eq!(WidgetType::Paragraph.as_str(), "paragraph");
        assert_eq!(
            serde_json::to_string(&WidgetType::Textarea).unwrap(),
            "\"textarea\""
        );
        let parsed: WidgetType = serde_json::from_str("\"checkbox\"").unwrap();
        assert_eq!(parsed, WidgetType::Checkbox);
    }

    #[test]
    fn test_widget_builder() {
        let widget = Widget::new("age", "Age", WidgetType::Number)
            .placeholder("enter an age")
            .default_value("25")
            .help_text("age in years")
            .validation(ValidationRule {
                required: true,
                min_value: Some(0.0),
                max_value: Some(150.0),
                ..ValidationRule::default()
            });

        assert_eq!(widget.name, "age");
        assert_eq!(widget.placeholder, "enter an age");
        assert_eq!(widget.validation.max_value, Some(150.0));
        assert!(widget.options.is_empty());
    }

    #[test]
    fn test_select_widget_preserves_option_order() {
        let widget = Widget::new("gender", "Gender", WidgetType::Select)
            .option(SelectOption::new("Female", "female"))
            .option(SelectOption::new("Male", "male"))
            .option(SelectOption::new("Other", "other"));

        let values: Vec<&str> = widget.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["female", "male", "other"]);
    }

    #[test]
    fn test_validation_rule_defaults() {
        let rule = ValidationRule::default();
        assert!(rule.is_unconstrained());
        assert!(!ValidationRule::required().is_unconstrained());
    }

    #[test]
    fn test_widget_serde_round_trip() {
        let widget = Widget::new("email", "Email", WidgetType::Input)
            .validation(ValidationRule {
                pattern: Some(r"^[^@]+@[^@]+$".to_string()),
                ..ValidationRule::default()
            })
            .option(SelectOption {
                display_name: "n/a".to_string(),
                value: "".to_string(),
                disabled: true,
            });

        let json = serde_json::to_string(&widget).unwrap();
        let parsed: Widget = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, widget);
    }
}

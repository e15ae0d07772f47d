//! Module descriptor types and builder.

use serde::{Deserialize, Serialize};

use crate::roles::HandlerCtor;
use crate::widget::Widget;

/// A registered business capability.
///
/// Immutable once registered; the registry assigns its id at registration
/// time from the owning unit and the registrar name. The handler is carried
/// as a constructor, not an instance, so every execution gets a fresh one.
#[derive(Debug, Clone)]
pub struct Module {
    /// Name of the handler type, used to re-resolve it in the launcher child.
    pub handler_name: String,
    /// Constructor for the handler.
    pub handler: HandlerCtor,
    /// Business group the module belongs to.
    pub group_name: String,
    /// Display name of the module.
    pub module_name: String,
    /// Short description.
    pub description: String,
    /// Declared form fields, in display order.
    pub widgets: Vec<Widget>,
    /// Routing namespace for external invocation. Set together with
    /// `action_name` or not at all.
    pub action_space: String,
    /// Routing action for external invocation.
    pub action_name: String,
    /// Long-form usage help.
    pub help_msg: String,
    /// Module author.
    pub author: String,
    /// Module version.
    pub version: String,
}

impl Module {
    /// Starts building a module around its handler.
    pub fn builder(handler_name: impl Into<String>, handler: HandlerCtor) -> ModuleBuilder {
        ModuleBuilder {
            module: Module {
                handler_name: handler_name.into(),
                handler,
                group_name: String::new(),
                module_name: String::new(),
                description: String::new(),
                widgets: Vec::new(),
                action_space: String::new(),
                action_name: String::new(),
                help_msg: String::new(),
                author: String::new(),
                version: "1.0.0".to_string(),
            },
        }
    }

    /// Produces the serialization-ready projection of this module under the
    /// id the registry assigned to it.
    pub fn descriptor(&self, id: impl Into<String>) -> ModuleDescriptor {
        ModuleDescriptor {
            id: id.into(),
            group_name: self.group_name.clone(),
            module_name: self.module_name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            version: self.version.clone(),
            widgets: self.widgets.clone(),
        }
    }
}

/// Builder for [`Module`].
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    /// Sets the business group name.
    pub fn group_name(mut self, group_name: impl Into<String>) -> Self {
        self.module.group_name = group_name.into();
        self
    }

    /// Sets the display name.
    pub fn module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module.module_name = module_name.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.module.description = description.into();
        self
    }

    /// Appends one widget.
    pub fn widget(mut self, widget: Widget) -> Self {
        self.module.widgets.push(widget);
        self
    }

    /// Replaces the widget list.
    pub fn widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.module.widgets = widgets;
        self
    }

    /// Sets the external routing key. Both halves must be non-empty.
    pub fn action(mut self, space: impl Into<String>, name: impl Into<String>) -> Self {
        self.module.action_space = space.into();
        self.module.action_name = name.into();
        self
    }

    /// Sets the long-form help.
    pub fn help_msg(mut self, help_msg: impl Into<String>) -> Self {
        self.module.help_msg = help_msg.into();
        self
    }

    /// Sets the author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.module.author = author.into();
        self
    }

    /// Sets the version (defaults to `1.0.0`).
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.module.version = version.into();
        self
    }

    /// Finishes the module.
    pub fn build(self) -> Module {
        self.module
    }
}

/// Read-only, serialization-ready projection of a registered module.
///
/// This is the wire shape any HTTP/JSON boundary built atop the core must
/// expose: identity and metadata plus the full widget list with nested
/// options and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Registry-assigned module id.
    pub id: String,
    /// Business group the module belongs to.
    pub group_name: String,
    /// Display name of the module.
    pub module_name: String,
    /// Short description.
    pub description: String,
    /// Module author.
    pub author: String,
    /// Module version.
    pub version: String,
    /// Declared form fields, in display order.
    pub widgets: Vec<Widget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::outcome::Outcome;
    use crate::roles::{Handler, JsonMap};
    use crate::widget::{SelectOption, ValidationRule, WidgetType};
    use pretty_assertions::assert_eq;

    struct NoopHandler;

    impl Handler for NoopHandler {
        fn handle(&self, _input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
            Outcome::success(serde_json::Value::Null, "noop")
        }
    }

    fn sample_module() -> Module {
        Module::builder("NoopHandler", || Box::new(NoopHandler))
            .group_name("demo")
            .module_name("Noop")
            .description("does nothing")
            .author("fabrica")
            .version("0.2.0")
            .action("demo", "noop")
            .widget(
                Widget::new("mode", "Mode", WidgetType::Select)
                    .option(SelectOption::new("Fast", "fast"))
                    .option(SelectOption {
                        display_name: "Slow".to_string(),
                        value: "slow".to_string(),
                        disabled: true,
                    })
                    .default_value("fast"),
            )
            .widget(
                Widget::new("count", "Count", WidgetType::Number).validation(ValidationRule {
                    required: true,
                    min_value: Some(1.0),
                    max_value: Some(100.0),
                    ..ValidationRule::default()
                }),
            )
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let module = Module::builder("NoopHandler", || Box::new(NoopHandler)).build();
        assert_eq!(module.version, "1.0.0");
        assert!(module.group_name.is_empty());
        assert!(module.widgets.is_empty());
    }

    #[test]
    fn test_descriptor_projection() {
        let module = sample_module();
        let descriptor = module.descriptor("unit_NoopRegistrar");

        assert_eq!(descriptor.id, "unit_NoopRegistrar");
        assert_eq!(descriptor.module_name, "Noop");
        assert_eq!(descriptor.widgets.len(), 2);
        assert_eq!(descriptor.widgets[0].options[1].disabled, true);
    }

    #[test]
    fn test_descriptor_serde_round_trip_is_lossless() {
        let descriptor = sample_module().descriptor("unit_NoopRegistrar");
        let json = serde_json::to_string_pretty(&descriptor).unwrap();
        let parsed: ModuleDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let descriptor = sample_module().descriptor("m1");
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["id"], "m1");
        assert_eq!(json["widgets"][0]["widget_type"], "select");
        assert_eq!(json["widgets"][0]["options"][0]["display_name"], "Fast");
        assert_eq!(json["widgets"][1]["validation"]["required"], true);
        assert_eq!(json["widgets"][1]["validation"]["min_value"], 1.0);
        // Unset constraints serialize as explicit nulls.
        assert!(json["widgets"][1]["validation"]["pattern"].is_null());
    }
}

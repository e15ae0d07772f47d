//! Built-in demo plugin units.
//!
//! These are consumers of the capability contract, not part of the core:
//! two small test-data generators whose entry points are registered into
//! the unit catalog under the names the `demos/plugins/*/plugin.json`
//! manifests refer to.

use rand::Rng;
use serde_json::{json, Value};

use fabrica_contract::{
    ErrorCode, ExecutionContext, Handler, JsonMap, Module, Outcome, RegisterError, Registrar,
    SelectOption, ValidationRule, Widget, WidgetType,
};
use fabrica_runtime::{UnitCatalog, UnitEntryFn};

/// Catalog with every built-in demo entry registered.
pub fn builtin_catalog() -> UnitCatalog {
    let mut catalog = UnitCatalog::new();
    catalog.register("user_demo", user_demo::registrars);
    catalog.register("order_demo", order_demo::registrars);
    catalog
}

/// Reads a field as a string, stringifying bare numbers.
fn str_field(input: &JsonMap, key: &str) -> Option<String> {
    match input.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a field as an integer, accepting numeric strings from form input.
fn i64_field(input: &JsonMap, key: &str) -> Option<i64> {
    match input.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a field as a float, accepting numeric strings from form input.
fn f64_field(input: &JsonMap, key: &str) -> Option<f64> {
    match input.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn processing_error(message: impl Into<String>) -> Outcome {
    Outcome::error_with_code(ErrorCode::ProcessingError, message)
}

mod user_demo {
    use super::*;

    pub fn registrars() -> Vec<Box<dyn Registrar>> {
        vec![Box::new(UserDemoRegistrar)]
    }

    pub struct UserDemoRegistrar;

    impl Registrar for UserDemoRegistrar {
        fn name(&self) -> &'static str {
            "UserDemoRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Ok(
                Module::builder("UserDemoHandler", || Box::new(UserDemoHandler))
                    .group_name("User management")
                    .module_name("User data generator")
                    .description("Generates test user records with custom attributes")
                    .action("user", "generate")
                    .help_msg(
                        "Demo plugin showing how to build a Fabrica data module. \
                         Supports single and batch user generation.",
                    )
                    .author("fabrica")
                    .version("1.0.0")
                    .widget(
                        Widget::new("name", "Name", WidgetType::Input)
                            .placeholder("base user name")
                            .default_value("Jane Doe")
                            .help_text("Base name for generated users")
                            .validation(ValidationRule {
                                required: true,
                                min_length: Some(2),
                                max_length: Some(20),
                                ..ValidationRule::default()
                            }),
                    )
                    .widget(
                        Widget::new("gender", "Gender", WidgetType::Select)
                            .options(vec![
                                SelectOption::new("Female", "female"),
                                SelectOption::new("Male", "male"),
                                SelectOption::new("Other", "other"),
                            ])
                            .default_value("female"),
                    )
                    .widget(
                        Widget::new("age", "Age", WidgetType::Number)
                            .placeholder("base age")
                            .default_value("25")
                            .help_text("Base age in years; generated users vary around it")
                            .validation(ValidationRule {
                                required: true,
                                min_value: Some(0.0),
                                max_value: Some(150.0),
                                ..ValidationRule::default()
                            }),
                    )
                    .widget(
                        Widget::new("email", "Email", WidgetType::Input)
                            .placeholder("base email address")
                            .default_value("jane@example.com")
                            .validation(ValidationRule {
                                pattern: Some(
                                    r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
                                        .to_string(),
                                ),
                                ..ValidationRule::default()
                            }),
                    )
                    .widget(
                        Widget::new("generate_count", "Count", WidgetType::Number)
                            .default_value("1")
                            .help_text("Number of user records to generate")
                            .validation(ValidationRule {
                                required: true,
                                min_value: Some(1.0),
                                max_value: Some(100.0),
                                ..ValidationRule::default()
                            }),
                    )
                    .build(),
            )
        }
    }

    pub struct UserDemoHandler;

    impl Handler for UserDemoHandler {
        fn handle(&self, input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
            let name = match str_field(input, "name") {
                Some(name) if name.len() >= 2 => name,
                _ => return processing_error("name must be at least 2 characters"),
            };
            let age = i64_field(input, "age").unwrap_or(25);
            if !(0..=150).contains(&age) {
                return processing_error("age must be between 0 and 150");
            }
            let count = i64_field(input, "generate_count").unwrap_or(1);
            if !(1..=100).contains(&count) {
                return processing_error("generate_count must be between 1 and 100");
            }
            let gender = str_field(input, "gender").unwrap_or_else(|| "female".to_string());
            let email = str_field(input, "email").unwrap_or_else(|| "jane@example.com".to_string());

            let mut rng = rand::thread_rng();
            let users: Vec<Value> = (0..count)
                .map(|i| {
                    let name = if i == 0 {
                        name.clone()
                    } else {
                        format!("{}_{}", name, i + 1)
                    };
                    let age = (age + rng.gen_range(-5..=5)).clamp(1, 150);
                    let email = if i == 0 {
                        email.clone()
                    } else {
                        match email.split_once('@') {
                            Some((local, domain)) => format!("{local}+{}@{domain}", i + 1),
                            None => email.clone(),
                        }
                    };
                    json!({
                        "id": format!("user_{:05}", rng.gen_range(10_000..100_000)),
                        "name": name,
                        "gender": gender,
                        "age": age,
                        "email": email,
                    })
                })
                .collect();

            if count == 1 {
                let message = format!("generated user record: {name}");
                Outcome::success(users.into_iter().next().unwrap_or(Value::Null), message)
            } else {
                let avg_age = users
                    .iter()
                    .filter_map(|u| u["age"].as_i64())
                    .sum::<i64>() as f64
                    / users.len() as f64;
                let data = json!({
                    "users": users,
                    "total_count": count,
                    "summary": { "avg_age": avg_age },
                });
                Outcome::success(data, format!("generated {count} user records"))
            }
        }
    }
}

mod order_demo {
    use super::*;

    pub fn registrars() -> Vec<Box<dyn Registrar>> {
        vec![Box::new(OrderDemoRegistrar)]
    }

    pub struct OrderDemoRegistrar;

    impl Registrar for OrderDemoRegistrar {
        fn name(&self) -> &'static str {
            "OrderDemoRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Ok(
                Module::builder("OrderDemoHandler", || Box::new(OrderDemoHandler))
                    .group_name("Order management")
                    .module_name("Order data generator")
                    .description("Generates test orders with product lines and amounts")
                    .action("order", "generate")
                    .author("fabrica")
                    .version("1.0.0")
                    .widget(
                        Widget::new("user_id", "User id", WidgetType::Input)
                            .default_value("user_12345")
                            .help_text("Owner of the generated order")
                            .validation(ValidationRule::required()),
                    )
                    .widget(
                        Widget::new("order_type", "Order type", WidgetType::Select)
                            .options(vec![
                                SelectOption::new("Standard", "standard"),
                                SelectOption::new("Presale", "presale"),
                                SelectOption::new("Flash sale", "flash"),
                                SelectOption::new("Group buy", "group"),
                            ])
                            .default_value("standard"),
                    )
                    .widget(
                        Widget::new("product_count", "Product lines", WidgetType::Number)
                            .default_value("3")
                            .validation(ValidationRule {
                                required: true,
                                min_value: Some(1.0),
                                max_value: Some(20.0),
                                ..ValidationRule::default()
                            }),
                    )
                    .widget(
                        Widget::new("min_amount", "Minimum amount", WidgetType::Number)
                            .default_value("50")
                            .validation(ValidationRule {
                                required: true,
                                min_value: Some(0.01),
                                ..ValidationRule::default()
                            }),
                    )
                    .widget(
                        Widget::new("max_amount", "Maximum amount", WidgetType::Number)
                            .default_value("500")
                            .validation(ValidationRule {
                                required: true,
                                min_value: Some(0.01),
                                ..ValidationRule::default()
                            }),
                    )
                    .build(),
            )
        }
    }

    pub struct OrderDemoHandler;

    impl Handler for OrderDemoHandler {
        fn handle(&self, input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
            let Some(user_id) = str_field(input, "user_id") else {
                return processing_error("user_id is required");
            };
            let order_type = str_field(input, "order_type").unwrap_or_else(|| "standard".to_string());
            let product_count = i64_field(input, "product_count").unwrap_or(3);
            if !(1..=20).contains(&product_count) {
                return processing_error("product_count must be between 1 and 20");
            }
            let min_amount = f64_field(input, "min_amount").unwrap_or(50.0);
            let max_amount = f64_field(input, "max_amount").unwrap_or(500.0);
            if min_amount <= 0.0 || min_amount > max_amount {
                return processing_error("amount range is invalid");
            }

            let mut rng = rand::thread_rng();
            let products: Vec<Value> = (0..product_count)
                .map(|i| {
                    let price = rng.gen_range(min_amount..=max_amount) / product_count as f64;
                    json!({
                        "sku": format!("SKU-{:04}", rng.gen_range(0..10_000)),
                        "name": format!("Product {}", i + 1),
                        "quantity": rng.gen_range(1..=5),
                        "price": (price * 100.0).round() / 100.0,
                    })
                })
                .collect();
            let total: f64 = products
                .iter()
                .map(|p| {
                    p["price"].as_f64().unwrap_or(0.0) * p["quantity"].as_i64().unwrap_or(1) as f64
                })
                .sum();

            let order_no = format!("ORD{:010}", rng.gen_range(0u64..10_000_000_000));
            let data = json!({
                "order_no": order_no,
                "user_id": user_id,
                "order_type": order_type,
                "products": products,
                "total_amount": (total * 100.0).round() / 100.0,
                "status": (["pending", "paid", "shipped"][rng.gen_range(0..3)]),
            });
            Outcome::success(data, format!("generated order for {user_id}"))
        }
    }
}

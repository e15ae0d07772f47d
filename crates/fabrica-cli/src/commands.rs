//! Command implementations for the Fabrica CLI.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use fabrica_contract::{ExecutionContext, JsonMap, ModuleDescriptor};
use fabrica_runtime::{ExecutionMode, IsolatorConfig, Registry};

use crate::plugins;

/// Builds a registry over the built-in catalog and scans the plugin root.
fn discover(plugins_dir: &Path, timeout: Option<u64>) -> (Registry, Vec<ModuleDescriptor>) {
    let mut config = IsolatorConfig::default();
    if let Some(secs) = timeout {
        config = config.timeout_secs(secs);
    }
    let mut registry = Registry::with_config(plugins::builtin_catalog(), config);
    let registered = registry.discover(plugins_dir);
    (registry, registered)
}

/// `fabrica scan` - discover and print newly registered modules.
pub fn scan(plugins_dir: &Path, json: bool) -> Result<()> {
    let (_registry, registered) = discover(plugins_dir, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&registered)?);
        return Ok(());
    }

    if registered.is_empty() {
        println!("{} no plugin units found under {}", "!".yellow(), plugins_dir.display());
        return Ok(());
    }

    println!(
        "{} registered {} module(s) from {}",
        "✓".green(),
        registered.len(),
        plugins_dir.display()
    );
    for descriptor in &registered {
        print_descriptor_line(descriptor);
    }
    Ok(())
}

/// `fabrica list` - discover, then print every registered descriptor.
pub fn list(plugins_dir: &Path, json: bool) -> Result<()> {
    let (registry, _) = discover(plugins_dir, None);
    let descriptors = registry.list_modules();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for descriptor in &descriptors {
        print_descriptor_line(descriptor);
    }
    if descriptors.is_empty() {
        println!("{} registry is empty", "!".yellow());
    }
    Ok(())
}

fn print_descriptor_line(descriptor: &ModuleDescriptor) {
    println!(
        "  {} {} {} ({} widget(s), v{})",
        descriptor.id.cyan(),
        descriptor.group_name.dimmed(),
        descriptor.module_name.bold(),
        descriptor.widgets.len(),
        descriptor.version,
    );
}

/// Options for `fabrica execute`.
pub struct ExecuteOptions {
    pub plugins: PathBuf,
    pub module: String,
    pub input: String,
    pub direct: bool,
    pub timeout: Option<u64>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub request_id: Option<String>,
    pub client_ip: Option<String>,
}

/// `fabrica execute` - run one module and print its outcome as JSON.
///
/// Exits zero only when the outcome status is success.
pub fn execute(opts: ExecuteOptions) -> ExitCode {
    match try_execute(opts) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn try_execute(opts: ExecuteOptions) -> Result<ExitCode> {
    let input = parse_input(&opts.input)?;
    let context = ExecutionContext {
        user_id: opts.user_id,
        session_id: opts.session_id,
        request_id: opts.request_id,
        client_ip: opts.client_ip,
    };
    let context = (!context.is_empty()).then_some(context);

    let mode = if opts.direct {
        ExecutionMode::Direct
    } else {
        ExecutionMode::Isolated
    };

    let (registry, _) = discover(&opts.plugins, opts.timeout);
    let outcome = registry.execute(&opts.module, &input, context.as_ref(), mode);

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn parse_input(raw: &str) -> Result<JsonMap> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("input is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("input must be a JSON object"),
    }
}

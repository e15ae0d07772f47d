//! Fabrica CLI - command-line host for self-describing data plugins
//!
//! This binary exposes the registry operations (scan, list, execute) and
//! doubles as the isolated-execution launcher through the hidden `launch`
//! subcommand: the isolation engine re-invokes the current executable with
//! `launch --unit .. --handler .. --payload ..`.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use fabrica_runtime::{launcher, LaunchArgs};

mod commands;
mod plugins;

/// Fabrica - plugin runtime for self-describing data modules
#[derive(Parser)]
#[command(name = "fabrica")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover plugin units and print the modules they register
    Scan {
        /// Plugin root directory to scan
        #[arg(short, long, default_value = "plugins")]
        plugins: PathBuf,

        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List every registered module descriptor
    List {
        /// Plugin root directory to scan
        #[arg(short, long, default_value = "plugins")]
        plugins: PathBuf,

        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Execute a module and print its outcome as JSON
    Execute {
        /// Plugin root directory to scan
        #[arg(short, long, default_value = "plugins")]
        plugins: PathBuf,

        /// Module id, e.g. user_demo_UserDemoRegistrar
        #[arg(short, long)]
        module: String,

        /// Module input as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,

        /// Run in-process instead of in an isolated child process
        #[arg(long)]
        direct: bool,

        /// Wall-clock timeout for isolated execution, in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Caller user id, forwarded to the handler
        #[arg(long)]
        user_id: Option<String>,

        /// Caller session id, forwarded to the handler
        #[arg(long)]
        session_id: Option<String>,

        /// Request correlation id, forwarded to the handler
        #[arg(long)]
        request_id: Option<String>,

        /// Caller address, forwarded to the handler
        #[arg(long)]
        client_ip: Option<String>,
    },

    /// Isolated-execution child entrypoint (used by the engine, not users)
    #[command(hide = true)]
    Launch {
        /// Plugin unit directory
        #[arg(long)]
        unit: PathBuf,

        /// Handler name to resolve within the unit
        #[arg(long)]
        handler: String,

        /// Payload file written by the parent process
        #[arg(long)]
        payload: PathBuf,
    },
}

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout is reserved for command output and,
    // in the launch subcommand, the protocol line.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan { plugins, json } => commands::scan(&plugins, json),
        Commands::List { plugins, json } => commands::list(&plugins, json),
        Commands::Execute {
            plugins,
            module,
            input,
            direct,
            timeout,
            user_id,
            session_id,
            request_id,
            client_ip,
        } => {
            return commands::execute(commands::ExecuteOptions {
                plugins,
                module,
                input,
                direct,
                timeout,
                user_id,
                session_id,
                request_id,
                client_ip,
            });
        }
        Commands::Launch {
            unit,
            handler,
            payload,
        } => {
            let code = launcher::run(
                &plugins::builtin_catalog(),
                &LaunchArgs {
                    unit,
                    handler,
                    payload,
                },
            );
            return ExitCode::from(code.clamp(0, 255) as u8);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

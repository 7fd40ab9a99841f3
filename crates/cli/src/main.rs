//! hapticctl - Haptic Servo CLI
//!
//! Runs the servo loop against the simulated device, printing the stylus
//! position, the rendered force and button changes until Ctrl-C.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

#[cfg(feature = "rt-allocator")]
use mimalloc::MiMalloc;

#[cfg(feature = "rt-allocator")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::RunArgs;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "hapticctl")]
#[command(about = "Haptic Servo CLI - Render a virtual plane on a 3-DOF haptic device")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Servo configuration file (YAML)
    #[arg(long, global = true, env = "HAPTIC_SERVO_CONFIG", hide = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the servo loop until Ctrl-C
    Run(RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error_human(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config.as_deref()),
    }
}

fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("hapticctl={level},haptic_servo={level}")
}

fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .downcast_ref::<CliError>()
        .map_or(1, CliError::exit_code)
}

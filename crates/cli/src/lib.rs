pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dialogbridge",
    about = "Dialogbridge operator CLI",
    long_about = "Inspect configuration, check generation readiness, and run scripted fulfillment conversations.",
    after_help = "Examples:\n  dialogbridge doctor --json\n  dialogbridge doctor --probe\n  dialogbridge config\n  dialogbridge smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the scripted reference conversations against the configured model")]
    Smoke,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, intent registry, and generation credentials")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Send a minimal live completion to the configured provider")]
        probe: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Smoke => commands::smoke::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json, probe } => commands::doctor::run(json, probe),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
